use std::path::PathBuf;

/// Links used when rendering changelog entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryUrls {
    /// Repository home, e.g. `https://github.com/owner/repo`
    pub repository: String,
    /// Package sub-directory inside the repository, when declared
    pub directory: Option<String>,
}

impl RepositoryUrls {
    /// Build from a manifest's `repository` url and optional `directory`.
    pub fn new(url: &str, directory: Option<&str>) -> Self {
        let repository = sanitize_url(url);
        let directory = directory
            .map(|dir| dir.trim_start_matches('/'))
            .filter(|dir| !dir.is_empty())
            .map(|dir| format!("{}/{}", repository, dir));

        RepositoryUrls {
            repository,
            directory,
        }
    }
}

/// Strip the `git+` scheme prefix and `.git` suffix npm manifests often carry.
pub fn sanitize_url(url: &str) -> String {
    let url = url.trim();
    let url = url.strip_prefix("git+").unwrap_or(url);
    let url = url.strip_suffix(".git").unwrap_or(url);
    url.trim_end_matches('/').to_string()
}

/// Everything the release needs to know about the target package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Directory name, also the conventional-commit scope and branch name
    pub short_name: String,
    /// Published (namespaced) name from the manifest
    pub name: String,
    /// Current version string from the manifest
    pub version: String,
    pub private: bool,
    pub urls: Option<RepositoryUrls>,
    /// Root of the npm workspace holding the package
    pub workspace_root: PathBuf,
    /// Package path relative to the workspace root, `/`-separated
    pub package_dir: String,
}

impl PackageInfo {
    pub fn package_root(&self) -> PathBuf {
        if self.package_dir.is_empty() {
            self.workspace_root.clone()
        } else {
            self.workspace_root.join(&self.package_dir)
        }
    }
}
