//! Published versions of a package, from the npm registry

use crate::error::{ReleaseError, Result};
use serde::Deserialize;
use std::io::ErrorKind;
use std::process::Command;
use tracing::{debug, instrument};

/// What the registry knows about a package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryInfo {
    /// `None` when the package was never published.
    pub latest_version: Option<String>,
}

impl RegistryInfo {
    /// Published versions come oldest first; the last one is the latest.
    pub fn from_versions(versions: Vec<String>) -> Self {
        RegistryInfo {
            latest_version: versions.into_iter().last(),
        }
    }
}

/// Source of published versions.
///
/// `Sync` so the workflow can query it from a scoped thread while it reads
/// the repository.
pub trait Registry: Sync {
    fn info(&self, name: &str) -> Result<RegistryInfo>;
}

/// `npm view <name> versions --json` answers a bare string for one version.
#[derive(Deserialize)]
#[serde(untagged)]
enum Versions {
    One(String),
    Many(Vec<String>),
}

/// Parse the JSON output of `npm view <name> versions --json`.
pub fn parse_versions(stdout: &str) -> Result<RegistryInfo> {
    if stdout.trim().is_empty() {
        return Ok(RegistryInfo::default());
    }

    let versions = match serde_json::from_str::<Versions>(stdout)? {
        Versions::One(version) => vec![version],
        Versions::Many(versions) => versions,
    };
    Ok(RegistryInfo::from_versions(versions))
}

/// Registry queried through the `npm` command line.
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    program: String,
    registry_url: Option<String>,
}

impl NpmRegistry {
    pub fn new(registry_url: Option<String>) -> Self {
        NpmRegistry {
            program: "npm".to_string(),
            registry_url,
        }
    }

    /// Use another executable than `npm`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn args(&self, name: &str) -> Vec<String> {
        let mut args = vec!["view".to_string(), name.to_string(), "versions".to_string()];
        if let Some(url) = &self.registry_url {
            args.push(format!("--registry={}", url));
        }
        // silences "Ignoring workspaces for specified package(s)"
        args.push("--workspaces=false".to_string());
        args.push("--json".to_string());
        args
    }
}

impl Default for NpmRegistry {
    fn default() -> Self {
        NpmRegistry::new(None)
    }
}

impl Registry for NpmRegistry {
    #[instrument(skip(self))]
    fn info(&self, name: &str) -> Result<RegistryInfo> {
        let output = Command::new(&self.program)
            .args(self.args(name))
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    ReleaseError::registry(format!("Could not run {}.", self.program))
                }
                _ => ReleaseError::registry(e.to_string()),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            if stdout.contains("E404") || stderr.contains("E404") {
                debug!("{} is not published", name);
                return Ok(RegistryInfo::default());
            }
            let message = stderr.trim();
            return Err(ReleaseError::registry(if message.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                message.to_string()
            }));
        }

        parse_versions(&stdout)
            .map_err(|e| ReleaseError::registry(format!("Cannot parse npm output: {}", e)))
    }
}
