//! Changelog entry rendering
//!
//! Commits are grouped into four sections (breaking changes, features, fixes
//! and everything else) and rendered as one markdown entry, newest on top.

use crate::domain::{Commit, RepositoryUrls};
use crate::error::Result;
use chrono::{NaiveDate, Utc};
use regex::{Captures, Regex};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

/// Default base URL of user profiles.
pub const DEFAULT_PROFILE_URL: &str = "https://www.github.com";

static LINKABLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(?P<issue>\d+)|@(?P<user>[\w-]+)").expect("Invalid regex"));

const BREAKING_HEADING: &str = "### ⚠️ BREAKING CHANGES";
const FEATURES_HEADING: &str = "### New Features";
const FIXES_HEADING: &str = "### Bug Fixes";
const NOTES_HEADING: &str = "### Other";

/// Rendered changelog lines grouped by category, in commit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogSections {
    pub breaking: Vec<String>,
    pub features: Vec<String>,
    pub fixes: Vec<String>,
    pub notes: Vec<String>,
}

impl ChangelogSections {
    /// Non-empty sections with their headings, in display order.
    fn headed(&self) -> impl Iterator<Item = (&'static str, &Vec<String>)> {
        [
            (BREAKING_HEADING, &self.breaking),
            (FEATURES_HEADING, &self.features),
            (FIXES_HEADING, &self.fixes),
            (NOTES_HEADING, &self.notes),
        ]
        .into_iter()
        .filter(|(_, lines)| !lines.is_empty())
    }
}

/// Renders changelog entries for one package.
#[derive(Debug, Clone)]
pub struct ChangelogRenderer {
    urls: Option<RepositoryUrls>,
    profile_url: String,
}

impl ChangelogRenderer {
    /// Without `urls` the entry carries no links at all.
    pub fn new(urls: Option<RepositoryUrls>) -> Self {
        ChangelogRenderer {
            urls,
            profile_url: DEFAULT_PROFILE_URL.to_string(),
        }
    }

    pub fn with_profile_url(mut self, profile_url: impl Into<String>) -> Self {
        self.profile_url = profile_url.into().trim_end_matches('/').to_string();
        self
    }

    /// One `- subject (hash)` line.
    ///
    /// With known repository urls, `#N` references link to the issue, `@name`
    /// mentions to the user profile, and the short hash to the commit.
    pub fn render_line(&self, commit: &Commit) -> String {
        let short_hash: String = commit.hash.chars().take(7).collect();

        match &self.urls {
            Some(urls) => {
                let subject = LINKABLE_REGEX.replace_all(&commit.subject, |caps: &Captures| {
                    if let Some(issue) = caps.name("issue") {
                        format!(
                            "[#{}]({}/issues/{})",
                            issue.as_str(),
                            urls.repository,
                            issue.as_str()
                        )
                    } else {
                        let user = &caps["user"];
                        format!("[@{}]({}/{})", user, self.profile_url, user)
                    }
                });
                if short_hash.is_empty() {
                    format!("- {}", subject)
                } else {
                    format!(
                        "- {} ([{}]({}/commits/{}))",
                        subject, short_hash, urls.repository, commit.hash
                    )
                }
            }
            None if short_hash.is_empty() => format!("- {}", commit.subject),
            None => format!("- {} ({})", commit.subject, short_hash),
        }
    }

    /// Group rendered lines; each commit lands in exactly one section.
    pub fn sections(&self, commits: &[Commit]) -> ChangelogSections {
        let mut sections = ChangelogSections::default();
        for commit in commits {
            let line = self.render_line(commit);
            if commit.breaking {
                sections.breaking.push(line);
            } else if commit.r#type == "feat" {
                sections.features.push(line);
            } else if commit.r#type == "fix" {
                sections.fixes.push(line);
            } else {
                sections.notes.push(line);
            }
        }
        sections
    }

    /// Render the entry for `name` at `version`, dated today (UTC).
    pub fn render(&self, name: &str, version: &str, commits: &[Commit]) -> String {
        self.render_on(Utc::now().date_naive(), name, version, commits)
    }

    pub fn render_on(&self, date: NaiveDate, name: &str, version: &str, commits: &[Commit]) -> String {
        let sections = self.sections(commits);

        let mut lines = vec![
            format!("## {} v{}", name, version),
            format!("_{}_", date.format("%Y-%m-%d")),
            String::new(),
        ];
        for (heading, section) in sections.headed() {
            lines.push(heading.to_string());
            lines.extend(section.iter().cloned());
            lines.push(String::new());
        }

        lines.join("\n").trim().to_string()
    }
}

/// Write `entry` on top of the changelog at `path`, creating it if needed.
pub fn prepend_to_file(path: &Path, entry: &str) -> Result<()> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let content = if existing.trim().is_empty() {
        format!("{}\n", entry)
    } else {
        format!("{}\n\n{}", entry, existing)
    };
    fs::write(path, content)?;
    Ok(())
}
