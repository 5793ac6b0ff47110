use crate::domain::commit::{split_log, DEFAULT_LOG_SEPARATOR};
use crate::domain::RawCommit;
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

/// Mock repository for testing without actual git operations
///
/// Commits are registered newest first, each one optionally followed by the
/// tags pointing at it. Writes are recorded instead of performed.
#[derive(Debug, Default)]
pub struct MockRepository {
    branch: Option<String>,
    changed_files: Vec<String>,
    commits: Vec<RawCommit>,
    /// Tag name -> index in `commits` of the tagged commit.
    tags: HashMap<String, usize>,
    staged: RefCell<Vec<PathBuf>>,
    commits_made: RefCell<Vec<(Vec<PathBuf>, String)>>,
    tags_made: RefCell<Vec<String>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_changed_file(mut self, file: impl Into<String>) -> Self {
        self.changed_files.push(file.into());
        self
    }

    /// Append an older commit.
    pub fn add_commit(&mut self, message: impl Into<String>, hash: impl Into<String>) {
        self.commits.push(RawCommit::new(message, hash));
    }

    /// Append older commits from `git log --format=%B%n-hash-%n%H%n<separator>` text.
    pub fn add_log(&mut self, log: &str) {
        self.commits.extend(split_log(log, DEFAULT_LOG_SEPARATOR));
    }

    /// Tag the most recently appended (oldest) commit.
    pub fn tag_last_commit(&mut self, name: impl Into<String>) {
        let index = self.commits.len().saturating_sub(1);
        self.tags.insert(name.into(), index);
    }

    /// Paths staged since the last commit.
    pub fn staged(&self) -> Vec<PathBuf> {
        self.staged.borrow().clone()
    }

    /// Commits made so far, as (paths, message).
    pub fn commits_made(&self) -> Vec<(Vec<PathBuf>, String)> {
        self.commits_made.borrow().clone()
    }

    pub fn tags_made(&self) -> Vec<String> {
        self.tags_made.borrow().clone()
    }
}

impl Repository for MockRepository {
    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.branch.clone())
    }

    fn changed_files(&self) -> Result<Vec<String>> {
        Ok(self.changed_files.clone())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let mut tags: Vec<String> = self.tags.keys().cloned().collect();
        tags.extend(self.tags_made.borrow().iter().cloned());
        Ok(tags)
    }

    fn commits_since(&self, since: Option<&str>) -> Result<Vec<RawCommit>> {
        let end = match since {
            Some(tag) => *self.tags.get(tag).ok_or_else(|| {
                ReleaseError::Git(git2::Error::from_str(&format!("Tag not found: {}", tag)))
            })?,
            None => self.commits.len(),
        };
        Ok(self.commits[..end].to_vec())
    }

    fn stage_paths(&self, paths: &[PathBuf]) -> Result<()> {
        self.staged.borrow_mut().extend(paths.iter().cloned());
        Ok(())
    }

    fn commit_staged(&self, message: &str) -> Result<()> {
        let paths = self.staged.take();
        self.commits_made
            .borrow_mut()
            .push((paths, message.to_string()));
        Ok(())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        self.tags_made.borrow_mut().push(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_commits_since_tag() {
        let mut repo = MockRepository::new();
        repo.add_commit("fix(foo): newest", "c3");
        repo.add_commit("feat(foo): middle", "c2");
        repo.add_commit("chore(foo): release", "c1");
        repo.tag_last_commit("rollup-plugin-foo-v1.0.0");

        let since = repo.commits_since(Some("rollup-plugin-foo-v1.0.0")).unwrap();
        assert_eq!(
            since.iter().map(|c| c.hash.as_str()).collect::<Vec<_>>(),
            vec!["c3", "c2"]
        );
        assert_eq!(repo.commits_since(None).unwrap().len(), 3);
        assert!(repo.commits_since(Some("missing")).is_err());
    }

    #[test]
    fn test_mock_repository_from_log() {
        let mut repo = MockRepository::new();
        repo.add_log(
            "feat(foo): add option\n-hash-\naaaa\n----- 😎 -----\nfix(foo): typo\n-hash-\nbbbb\n----- 😎 -----\n",
        );
        let commits = repo.commits_since(None).unwrap();
        assert_eq!(commits[0], RawCommit::new("feat(foo): add option", "aaaa"));
        assert_eq!(commits[1], RawCommit::new("fix(foo): typo", "bbbb"));
    }

    #[test]
    fn test_mock_repository_records_writes() {
        let repo = MockRepository::new().with_branch("foo");
        repo.commit_paths(&[PathBuf::from("a")], "msg").unwrap();
        repo.create_tag("t").unwrap();

        assert_eq!(repo.current_branch().unwrap().as_deref(), Some("foo"));
        assert_eq!(repo.commits_made(), vec![(vec![PathBuf::from("a")], "msg".to_string())]);
        assert!(repo.staged().is_empty());
        assert_eq!(repo.tags_made(), vec!["t".to_string()]);
        assert_eq!(repo.list_tags().unwrap(), vec!["t".to_string()]);
    }
}
