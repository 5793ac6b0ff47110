//! Locating the package to release inside an npm workspace

use crate::config::LayoutConfig;
use crate::error::{ReleaseError, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PACKAGE_FILE: &str = "package.json";
pub const PACKAGE_LOCK_FILE: &str = "package-lock.json";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    is_file: bool,
    is_dir: bool,
}

/// Entries of one directory, read once when the snapshot is taken.
#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    path: PathBuf,
    entries: Vec<Entry>,
}

impl DirectorySnapshot {
    pub fn scan(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut entries = Vec::new();
        for entry in fs::read_dir(&path)? {
            let entry = entry?;
            // follows symlinks
            let metadata = fs::metadata(entry.path()).ok();
            entries.push(Entry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_file: metadata.as_ref().is_some_and(|m| m.is_file()),
                is_dir: metadata.as_ref().is_some_and(|m| m.is_dir()),
            });
        }
        Ok(DirectorySnapshot { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.is_file && e.name == name)
    }

    pub fn has_directory(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.is_dir && e.name == name)
    }
}

/// Walk from `start` towards the filesystem root and return the first
/// directory accepted by `predicate`.
///
/// With `skip_start`, the walk begins at the parent of `start`.
pub fn find_up<F>(start: &Path, skip_start: bool, mut predicate: F) -> Result<Option<PathBuf>>
where
    F: FnMut(&DirectorySnapshot) -> Result<bool>,
{
    let mut current = if skip_start {
        start.parent()
    } else {
        Some(start)
    };

    while let Some(dir) = current {
        let snapshot = DirectorySnapshot::scan(dir)?;
        if predicate(&snapshot)? {
            return Ok(Some(dir.to_path_buf()));
        }
        current = dir.parent();
    }

    Ok(None)
}

/// Find the root of the package to release from any directory inside it.
///
/// Running from `<test-apps>/<name>` targets `<plugins>/<name>`. Any other
/// package outside the plugins directory is rejected.
pub fn locate_package(cwd: &Path, layout: &LayoutConfig) -> Result<PathBuf> {
    let package_root = find_up(cwd, false, |dir| Ok(dir.has_file(PACKAGE_FILE)))?
        .ok_or_else(|| ReleaseError::workspace(format!("Couldn't find a {} file!", PACKAGE_FILE)))?;

    let parent = package_root.parent().ok_or_else(|| not_a_plugin(layout))?;
    let parent_name = parent.file_name().and_then(|n| n.to_str()).unwrap_or_default();

    if parent_name == layout.test_apps_directory {
        let name = package_root.file_name().ok_or_else(|| not_a_plugin(layout))?;
        let sibling = parent
            .parent()
            .ok_or_else(|| not_a_plugin(layout))?
            .join(&layout.plugins_directory)
            .join(name);
        if !sibling.join(PACKAGE_FILE).is_file() {
            return Err(ReleaseError::workspace(format!(
                "No {} found in {}",
                PACKAGE_FILE,
                sibling.display()
            )));
        }
        Ok(sibling)
    } else if parent_name == layout.plugins_directory {
        Ok(package_root)
    } else {
        Err(not_a_plugin(layout))
    }
}

fn not_a_plugin(layout: &LayoutConfig) -> ReleaseError {
    ReleaseError::package(format!(
        "You must run this command from within a plugin package directory, i.e., one inside the {} directory.",
        layout.plugins_directory
    ))
}

/// The nearest ancestor of `package_root` whose manifest declares
/// `workspaces`, or `package_root` itself when there is none.
pub fn find_workspace_root(package_root: &Path) -> Result<PathBuf> {
    let root = find_up(package_root, true, |dir| {
        if !dir.has_file(PACKAGE_FILE) {
            return Ok(false);
        }
        let path = dir.path().join(PACKAGE_FILE);
        let text = fs::read_to_string(&path)?;
        match serde_json::from_str::<Value>(&text) {
            Ok(manifest) => Ok(manifest.get("workspaces").is_some_and(Value::is_array)),
            Err(e) => {
                debug!("Skipping unreadable {}: {}", path.display(), e);
                Ok(false)
            }
        }
    })?;

    Ok(root.unwrap_or_else(|| package_root.to_path_buf()))
}
