//! Domain logic - pure business rules independent of git, npm and the file system

pub mod commit;
pub mod package;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use commit::{Commit, CommitClassifier, Note, RawCommit};
pub use package::{PackageInfo, RepositoryUrls};
pub use prerelease::PreReleaseType;
pub use tag::{PreviousTag, TagPattern};
pub use version::{BumpLevel, PackageVersionState, ReleaseType, VersionShape};
