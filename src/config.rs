use crate::domain::commit::DEFAULT_NOTE_KEYWORDS;
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name looked up in the current directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "plugin-release.toml";

/// Represents the complete configuration for plugin-release.
///
/// Every section is optional; a missing section or field takes its default.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub commits: CommitsConfig,

    #[serde(default)]
    pub prerelease: PrereleaseConfig,

    #[serde(default)]
    pub versioning: VersioningConfig,
}

fn default_plugins_directory() -> String {
    "plugins".to_string()
}

fn default_test_apps_directory() -> String {
    "test-apps".to_string()
}

fn default_scripts_directory() -> String {
    "scripts".to_string()
}

fn default_name_prefix() -> String {
    "rollup-plugin-".to_string()
}

/// Monorepo layout: where packages live and how they are named.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LayoutConfig {
    #[serde(default = "default_plugins_directory")]
    pub plugins_directory: String,

    /// Test applications; running from `test-apps/<name>` targets `plugins/<name>`.
    #[serde(default = "default_test_apps_directory")]
    pub test_apps_directory: String,

    /// Changes under this directory never block a release.
    #[serde(default = "default_scripts_directory")]
    pub scripts_directory: String,

    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            plugins_directory: default_plugins_directory(),
            test_apps_directory: default_test_apps_directory(),
            scripts_directory: default_scripts_directory(),
            name_prefix: default_name_prefix(),
        }
    }
}

fn default_tag_format() -> String {
    "{name}-v{version}".to_string()
}

fn default_commit_format() -> String {
    "chore(release): {name} v{version}".to_string()
}

/// Naming of release commits and tags. `{name}` and `{version}` are substituted.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    #[serde(default = "default_commit_format")]
    pub commit_format: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            tag_format: default_tag_format(),
            commit_format: default_commit_format(),
        }
    }
}

fn default_changelog_file() -> String {
    "CHANGELOG.md".to_string()
}

fn default_profile_url() -> String {
    "https://www.github.com".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    /// Changelog file name, relative to the package directory.
    #[serde(default = "default_changelog_file")]
    pub file: String,

    /// Base URL of user profiles for `@name` mentions.
    #[serde(default = "default_profile_url")]
    pub profile_url: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            file: default_changelog_file(),
            profile_url: default_profile_url(),
        }
    }
}

fn default_note_keywords() -> Vec<String> {
    DEFAULT_NOTE_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

/// Configuration for commit message parsing.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitsConfig {
    /// Footer tokens recognised as notes even when they contain spaces.
    #[serde(default = "default_note_keywords")]
    pub note_keywords: Vec<String>,
}

impl Default for CommitsConfig {
    fn default() -> Self {
        CommitsConfig {
            note_keywords: default_note_keywords(),
        }
    }
}

fn default_suffixes() -> Vec<String> {
    vec!["alpha".to_string(), "beta".to_string(), "rc".to_string()]
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PrereleaseConfig {
    /// Accepted values for `--pre`.
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,
}

impl Default for PrereleaseConfig {
    fn default() -> Self {
        PrereleaseConfig {
            suffixes: default_suffixes(),
        }
    }
}

/// What an explicit release type does once the package is at 1.0.0 or above.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StableOverride {
    /// The type is always derived from the commits.
    #[default]
    Ignore,
    /// An explicit type replaces the derived one, as in the other states.
    Honor,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct VersioningConfig {
    #[serde(default)]
    pub stable_override: StableOverride,
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `plugin-release.toml` in current directory
/// 3. `plugin-release.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);

    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if local.exists() {
        fs::read_to_string(local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse configuration text.
pub fn parse_config(text: &str) -> Result<Config> {
    let config: Config = toml::from_str(text)
        .map_err(|e| ReleaseError::config(format!("Invalid configuration: {}", e)))?;

    if !config.git.tag_format.contains("{version}") {
        return Err(ReleaseError::config(
            "git.tag_format must contain the {version} placeholder",
        ));
    }
    if config.prerelease.suffixes.is_empty() {
        return Err(ReleaseError::config(
            "prerelease.suffixes must list at least one suffix",
        ));
    }

    Ok(config)
}
