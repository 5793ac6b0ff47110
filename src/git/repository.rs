use crate::domain::RawCommit;
use crate::error::Result;
use git2::{Repository as Git2Repo, Sort, Status, StatusOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn workdir(&self) -> Result<&Path> {
        self.repo
            .workdir()
            .ok_or_else(|| git2::Error::from_str("Repository has no working directory").into())
    }

    /// Path relative to the working directory, as the index expects it.
    fn index_path(&self, path: &Path) -> Result<PathBuf> {
        if path.is_relative() {
            return Ok(path.to_path_buf());
        }

        let workdir = self.workdir()?;
        if let Ok(relative) = path.strip_prefix(workdir) {
            return Ok(relative.to_path_buf());
        }

        let workdir = workdir.canonicalize()?;
        let parent = path.parent().unwrap_or(path).canonicalize()?;
        let file_name = path.file_name().map(PathBuf::from).unwrap_or_default();
        parent
            .join(file_name)
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| {
                git2::Error::from_str(&format!(
                    "{} is outside the repository",
                    path.display()
                ))
                .into()
            })
    }
}

impl super::Repository for Git2Repository {
    fn current_branch(&self) -> Result<Option<String>> {
        // Reading HEAD directly also works on an unborn branch.
        let head = self.repo.find_reference("HEAD")?;
        Ok(head
            .symbolic_target()
            .and_then(|target| target.strip_prefix("refs/heads/"))
            .map(str::to_string))
    }

    #[instrument(skip(self))]
    fn changed_files(&self) -> Result<Vec<String>> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        let files: Vec<String> = statuses
            .iter()
            .filter(|entry| entry.status() != Status::CURRENT)
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect();

        debug!("{} changed file(s)", files.len());
        Ok(files)
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    #[instrument(skip(self))]
    fn commits_since(&self, since: Option<&str>) -> Result<Vec<RawCommit>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push_head()?;

        if let Some(tag) = since {
            let tagged = self.repo.revparse_single(tag)?.peel_to_commit()?;
            revwalk.hide(tagged.id())?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            let message = String::from_utf8_lossy(commit.message_bytes()).into_owned();

            commits.push(RawCommit::new(message, oid.to_string()));
        }

        debug!("{} commit(s) since {:?}", commits.len(), since);
        Ok(commits)
    }

    fn stage_paths(&self, paths: &[PathBuf]) -> Result<()> {
        let workdir = self.workdir()?.to_path_buf();
        let mut index = self.repo.index()?;

        for path in paths {
            let relative = self.index_path(path)?;
            if workdir.join(&relative).exists() {
                index.add_path(&relative)?;
            } else {
                index.remove_path(&relative)?;
            }
        }
        index.write()?;

        debug!("{} path(s) staged", paths.len());
        Ok(())
    }

    fn commit_staged(&self, message: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        Ok(())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel(git2::ObjectType::Commit)?;

        self.repo.tag_lightweight(name, &head, false)?;

        Ok(())
    }
}
