//! Decision logic: bump level, next version, release plan

pub mod bump;
pub mod plan;
pub mod resolver;

pub use bump::determine_bump;
pub use plan::{plan_release, ReleasePlan};
pub use resolver::{Resolution, ResolutionInput, VersionResolver};
