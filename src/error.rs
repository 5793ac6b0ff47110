use thiserror::Error;

use crate::domain::ReleaseType;

/// Unified error type for plugin-release operations.
///
/// Each variant is one failure kind; its fields are the arguments that the
/// `#[error]` template substitutes when the error is displayed.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Current version {current} is lower than the latest tag version {tag_version} in repository!")]
    BehindLatestTag {
        current: String,
        tag_version: String,
    },

    #[error("Current version {current} is lower than the latest version {registry_version} in registry!")]
    BehindRegistry {
        current: String,
        registry_version: String,
    },

    #[error(
        "Invalid value {value:?} for 'pre' option, must be either unspecified or one of {}",
        enumerate(.allowed, " or ")
    )]
    InvalidPrereleaseSuffix { value: String, allowed: Vec<String> },

    #[error("'--{first}' and '--{second}' arguments are mutually exclusive, please specify one or the other but not both.")]
    ConflictingReleaseTypes {
        first: ReleaseType,
        second: ReleaseType,
    },

    #[error("Invalid version in {source_name}: {version:?}.")]
    InvalidVersion {
        source_name: String,
        version: String,
    },

    #[error("Could not compute next version from {version} using '{release_type}'")]
    CouldNotComputeVersion {
        version: String,
        release_type: String,
        identifier: Option<String>,
    },

    #[error("Package error: {0}")]
    Package(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad classification of a [`ReleaseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The inputs are inconsistent; the user has to fix something first.
    Validation,
    /// The next version could not be derived from otherwise valid inputs.
    Derivation,
    /// Something outside the decision logic failed (files, git, npm, config).
    Environment,
}

/// Convenience type alias for Results in plugin-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a package error with context
    pub fn package(msg: impl Into<String>) -> Self {
        ReleaseError::Package(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        ReleaseError::Manifest(msg.into())
    }

    /// Create a workspace error with context
    pub fn workspace(msg: impl Into<String>) -> Self {
        ReleaseError::Workspace(msg.into())
    }

    /// Create a registry error with context
    pub fn registry(msg: impl Into<String>) -> Self {
        ReleaseError::Registry(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ReleaseError::BehindLatestTag { .. }
            | ReleaseError::BehindRegistry { .. }
            | ReleaseError::InvalidPrereleaseSuffix { .. }
            | ReleaseError::ConflictingReleaseTypes { .. }
            | ReleaseError::InvalidVersion { .. }
            | ReleaseError::Package(_) => ErrorKind::Validation,
            ReleaseError::CouldNotComputeVersion { .. } => ErrorKind::Derivation,
            _ => ErrorKind::Environment,
        }
    }
}

/// Joins items as `a, b and c`, with a caller-chosen last separator.
pub fn enumerate(items: &[String], last_sep: &str) -> String {
    match items.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{}{}{}", rest.join(", "), last_sep, last),
    }
}
