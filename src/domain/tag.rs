use crate::error::{ReleaseError, Result};
use regex::Regex;
use semver::Version;

/// Semantic version text captured from a tag.
///
/// The prerelease part is captured along with `MAJOR.MINOR.PATCH`, so a
/// `1.0.0-beta.1` package compares equal to its own `-v1.0.0-beta.1` tag.
const VERSION_CAPTURE: &str = r"(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?)";

/// Tag naming pattern (e.g., "{name}-v{version}")
#[derive(Debug, Clone)]
pub struct TagPattern {
    pub pattern: String,
}

/// Latest release tag of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousTag {
    pub name: String,
    /// Version embedded in the tag, when it can be extracted.
    pub version: Option<String>,
}

impl TagPattern {
    /// Create a new tag pattern
    pub fn new(pattern: impl Into<String>) -> Self {
        TagPattern {
            pattern: pattern.into(),
        }
    }

    /// Format a tag for a package version
    /// Example: pattern="{name}-v{version}" -> "rollup-plugin-foo-v1.2.3"
    pub fn format(&self, name: &str, version: &str) -> String {
        self.pattern
            .replace("{name}", name)
            .replace("{version}", version)
    }

    fn regex_for(&self, name: &str, version_capture: &str) -> Result<Regex> {
        if !self.pattern.contains("{version}") {
            return Err(ReleaseError::config(
                "Tag pattern must contain {version} placeholder",
            ));
        }

        let escaped = regex::escape(&self.pattern);
        let regex_pattern = escaped
            .replace(r"\{name\}", &regex::escape(name))
            .replace(r"\{version\}", version_capture);

        Regex::new(&format!("^{}$", regex_pattern))
            .map_err(|e| ReleaseError::config(format!("Invalid tag pattern: {}", e)))
    }

    /// Pick the package's most recent tag, ordered by embedded version.
    ///
    /// Tags of other packages are ignored. A tag whose version part is not
    /// a semantic version sorts below every parsable one and is returned
    /// without a version.
    pub fn latest(&self, name: &str, tags: &[String]) -> Result<Option<PreviousTag>> {
        let loose = self.regex_for(name, "(.+)")?;
        let strict = self.regex_for(name, VERSION_CAPTURE)?;

        let latest = tags
            .iter()
            .filter(|tag| loose.is_match(tag))
            .map(|tag| {
                let text = strict.captures(tag).map(|caps| caps[1].to_string());
                let version = text.as_deref().and_then(|t| Version::parse(t).ok());
                (version, tag, text)
            })
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

        Ok(latest.map(|(version, tag, text)| PreviousTag {
            name: tag.clone(),
            version: version.and(text),
        }))
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern::new("{name}-v{version}")
    }
}
