//! Git operations abstraction layer
//!
//! The release workflow only talks to the [Repository] trait. Two
//! implementations exist:
//!
//! - [repository::Git2Repository]: a real repository, through the `git2` crate
//! - [mock::MockRepository]: canned answers and recorded writes, for tests
//!
//! ```rust
//! # use plugin_release::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> plugin_release::error::Result<()> {
//! let tags = repo.list_tags()?;
//! let commits = repo.commits_since(tags.last().map(String::as_str))?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::config::LayoutConfig;
use crate::domain::RawCommit;
use crate::error::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Repository access needed by a release.
///
/// Paths reported by [`Repository::changed_files`] are relative to the
/// repository root and `/`-separated. Paths given to
/// [`Repository::stage_paths`] may be relative to the root or absolute.
pub trait Repository {
    /// Name of the checked out branch, `None` on a detached HEAD.
    fn current_branch(&self) -> Result<Option<String>>;

    /// Modified, staged, deleted and untracked files.
    fn changed_files(&self) -> Result<Vec<String>>;

    /// All tag names, unordered.
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Commits reachable from HEAD but not from `since` (a tag name), newest first.
    /// With `since` absent, the whole history.
    fn commits_since(&self, since: Option<&str>) -> Result<Vec<RawCommit>>;

    /// Add `paths` to the index; missing files are removed from it.
    fn stage_paths(&self, paths: &[PathBuf]) -> Result<()>;

    /// Commit the index on top of HEAD.
    fn commit_staged(&self, message: &str) -> Result<()>;

    /// Stage `paths` and commit them with `message`.
    fn commit_paths(&self, paths: &[PathBuf], message: &str) -> Result<()> {
        self.stage_paths(paths)?;
        self.commit_staged(message)
    }

    /// Create a lightweight tag on HEAD.
    fn create_tag(&self, name: &str) -> Result<()>;
}

/// Working tree changes sorted by what they mean for the release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingTreeChanges {
    /// Files of the released package and files outside any package.
    pub to_commit: BTreeSet<String>,
    /// Other packages with changes, as `<dir>/<name>`.
    pub dirty_packages: BTreeSet<String>,
    /// Files under the scripts directory.
    pub ignored: BTreeSet<String>,
}

impl WorkingTreeChanges {
    /// Sort repository-relative `files` for the package `short_name`.
    pub fn classify(files: &[String], short_name: &str, layout: &LayoutConfig) -> Self {
        let mut changes = WorkingTreeChanges::default();

        for file in files {
            let mut parts = file.splitn(3, '/');
            let dir = parts.next().unwrap_or_default();
            let sub_dir = parts.next().unwrap_or_default();

            if dir == layout.plugins_directory || dir == layout.test_apps_directory {
                if sub_dir == short_name {
                    changes.to_commit.insert(file.clone());
                } else {
                    changes.dirty_packages.insert(format!("{}/{}", dir, sub_dir));
                }
            } else if dir == layout.scripts_directory {
                changes.ignored.insert(file.clone());
            } else {
                changes.to_commit.insert(file.clone());
            }
        }

        changes
    }
}
