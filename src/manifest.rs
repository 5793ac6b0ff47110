//! Reading and updating `package.json` / `package-lock.json`

use crate::domain::{PackageInfo, RepositoryUrls};
use crate::error::{ReleaseError, Result};
use crate::workspace::{find_workspace_root, PACKAGE_FILE, PACKAGE_LOCK_FILE};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The `package.json` fields a release looks at.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PackageJson {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub repository: Option<RepositoryField>,
}

/// `repository` is either a bare URL or an object.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RepositoryField {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        directory: Option<String>,
    },
}

impl RepositoryField {
    pub fn urls(&self) -> RepositoryUrls {
        match self {
            RepositoryField::Url(url) => RepositoryUrls::new(url, None),
            RepositoryField::Detailed { url, directory } => {
                RepositoryUrls::new(url, directory.as_deref())
            }
        }
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            ReleaseError::manifest(format!("No {} file found in {}.", PACKAGE_FILE, parent_of(path)))
        }
        _ => ReleaseError::manifest(format!("Error reading {}: {}", path.display(), e)),
    })
}

fn parent_of(path: &Path) -> String {
    path.parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

pub fn read_package_json(path: &Path) -> Result<PackageJson> {
    let text = read_text(path)?;
    serde_json::from_str(&text)
        .map_err(|e| ReleaseError::manifest(format!("Error parsing {}: {}", path.display(), e)))
}

/// Read the package rooted at `package_root` and locate its workspace.
pub fn load_package(package_root: &Path) -> Result<PackageInfo> {
    let manifest_path = package_root.join(PACKAGE_FILE);
    debug!("Reading {}", manifest_path.display());
    let manifest = read_package_json(&manifest_path)?;

    let workspace_root = find_workspace_root(package_root)?;
    let package_dir = package_root
        .strip_prefix(&workspace_root)
        .map(|relative| {
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default();

    let short_name = package_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ReleaseError::manifest("Package directory has no name"))?;

    Ok(PackageInfo {
        short_name,
        name: manifest.name,
        version: manifest.version,
        private: manifest.private,
        urls: manifest.repository.as_ref().map(RepositoryField::urls),
        workspace_root,
        package_dir,
    })
}

/// Set the package version in `package.json` and in the workspace lock file.
///
/// Key order and the other fields are kept. Returns the files written.
pub fn write_version(info: &PackageInfo, version: &str) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let manifest_path = info.package_root().join(PACKAGE_FILE);
    let mut manifest = read_json(&manifest_path)?;
    set_version(&mut manifest, version, &manifest_path)?;
    write_json(&manifest_path, &manifest)?;
    written.push(manifest_path);

    let lock_path = info.workspace_root.join(PACKAGE_LOCK_FILE);
    if lock_path.is_file() {
        let mut lock = read_json(&lock_path)?;
        let entry = if info.package_dir.is_empty() {
            Some(&mut lock)
        } else {
            lock.get_mut("packages")
                .and_then(|packages| packages.get_mut(&info.package_dir))
        };

        match entry {
            Some(entry) => {
                set_version(entry, version, &lock_path)?;
                write_json(&lock_path, &lock)?;
                written.push(lock_path);
            }
            None => debug!(
                "No entry for {} in {}",
                info.package_dir,
                lock_path.display()
            ),
        }
    }

    Ok(written)
}

fn read_json(path: &Path) -> Result<Value> {
    let text = read_text(path)?;
    serde_json::from_str(&text)
        .map_err(|e| ReleaseError::manifest(format!("Error parsing {}: {}", path.display(), e)))
}

fn set_version(value: &mut Value, version: &str, path: &Path) -> Result<()> {
    let object = value.as_object_mut().ok_or_else(|| {
        ReleaseError::manifest(format!("{} is not a JSON object", path.display()))
    })?;
    object.insert("version".to_string(), Value::String(version.to_string()));
    Ok(())
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("package.json"),
            r#"{ "name": "root", "private": true, "workspaces": ["plugins/*"] }"#,
        );
        write(
            &dir.path().join("plugins/foo/package.json"),
            r#"{
  "name": "rollup-plugin-foo",
  "version": "1.2.3",
  "description": "Foo",
  "repository": {
    "type": "git",
    "url": "git+https://github.com/owner/repo.git",
    "directory": "plugins/foo"
  }
}
"#,
        );
        dir
    }

    #[test]
    fn test_repository_field_string_or_object() {
        let plain: PackageJson = serde_json::from_str(
            r#"{ "name": "a", "version": "1.0.0", "repository": "https://github.com/o/r.git" }"#,
        )
        .unwrap();
        assert_eq!(
            plain.repository.unwrap().urls().repository,
            "https://github.com/o/r"
        );

        let none: PackageJson =
            serde_json::from_str(r#"{ "name": "a", "version": "1.0.0" }"#).unwrap();
        assert!(none.repository.is_none());
        assert!(!none.private);
    }

    #[test]
    fn test_load_package() {
        let dir = workspace();
        let info = load_package(&dir.path().join("plugins/foo")).unwrap();

        assert_eq!(info.short_name, "foo");
        assert_eq!(info.name, "rollup-plugin-foo");
        assert_eq!(info.version, "1.2.3");
        assert_eq!(info.workspace_root, dir.path().to_path_buf());
        assert_eq!(info.package_dir, "plugins/foo");

        let urls = info.urls.unwrap();
        assert_eq!(urls.repository, "https://github.com/owner/repo");
        assert_eq!(
            urls.directory.as_deref(),
            Some("https://github.com/owner/repo/plugins/foo")
        );
    }

    #[test]
    fn test_load_package_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_package(dir.path()).unwrap_err();
        assert!(matches!(err, ReleaseError::Manifest(_)));
    }

    #[test]
    fn test_write_version_keeps_key_order_and_updates_lock() {
        let dir = workspace();
        write(
            &dir.path().join("package-lock.json"),
            r#"{
  "name": "root",
  "lockfileVersion": 3,
  "packages": {
    "": { "name": "root" },
    "plugins/foo": { "name": "rollup-plugin-foo", "version": "1.2.3" }
  }
}"#,
        );

        let info = load_package(&dir.path().join("plugins/foo")).unwrap();
        let written = write_version(&info, "1.3.0").unwrap();
        assert_eq!(written.len(), 2);

        let manifest = fs::read_to_string(dir.path().join("plugins/foo/package.json")).unwrap();
        assert!(manifest.contains(r#""version": "1.3.0""#));
        let name_at = manifest.find("\"name\"").unwrap();
        let version_at = manifest.find("\"version\"").unwrap();
        let description_at = manifest.find("\"description\"").unwrap();
        assert!(name_at < version_at && version_at < description_at);

        let lock: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("package-lock.json")).unwrap())
                .unwrap();
        assert_eq!(lock["packages"]["plugins/foo"]["version"], "1.3.0");
        assert!(lock["packages"][""].get("version").is_none());
    }

    #[test]
    fn test_write_version_without_lock() {
        let dir = workspace();
        let info = load_package(&dir.path().join("plugins/foo")).unwrap();
        assert_eq!(write_version(&info, "2.0.0").unwrap().len(), 1);
    }
}
