//! Pre-release handling for semantic versioning
//!
//! Two concerns live here: validating the prerelease suffix a user asks for
//! (`--pre beta`), and manipulating the dot-separated prerelease component of
//! a version when it is incremented.
//! According to semver.org: https://semver.org/#spec-item-9

use crate::error::{ReleaseError, Result};
use semver::Prerelease;
use std::fmt;

/// Requested pre-release suffix (alpha, beta, rc, or a configured custom one)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreReleaseType {
    /// Alpha pre-release
    Alpha,
    /// Beta pre-release
    Beta,
    /// Release candidate
    ReleaseCandidate,
    /// Custom suffix enabled through configuration
    Custom(String),
}

impl PreReleaseType {
    /// Parse a suffix, accepting only the ones listed in `allowed`.
    ///
    /// # Arguments
    /// * `s` - Suffix given by the user
    /// * `allowed` - Configured suffixes (default: alpha, beta, rc)
    ///
    /// # Returns
    /// * `Ok(PreReleaseType)` - The suffix is allowed
    /// * `Err(ReleaseError::InvalidPrereleaseSuffix)` - Anything else
    pub fn parse_allowed(s: &str, allowed: &[String]) -> Result<Self> {
        if !allowed.iter().any(|a| a == s) {
            return Err(ReleaseError::InvalidPrereleaseSuffix {
                value: s.to_string(),
                allowed: allowed.to_vec(),
            });
        }

        Ok(match s {
            "alpha" => PreReleaseType::Alpha,
            "beta" => PreReleaseType::Beta,
            "rc" => PreReleaseType::ReleaseCandidate,
            other => PreReleaseType::Custom(other.to_string()),
        })
    }
}

impl fmt::Display for PreReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreReleaseType::Alpha => write!(f, "alpha"),
            PreReleaseType::Beta => write!(f, "beta"),
            PreReleaseType::ReleaseCandidate => write!(f, "rc"),
            PreReleaseType::Custom(s) => write!(f, "{}", s),
        }
    }
}

/// One dot-separated prerelease identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Numeric(u64),
    AlphaNumeric(String),
}

impl Identifier {
    fn parse(part: &str) -> Self {
        let canonical_number = !part.is_empty()
            && part.bytes().all(|b| b.is_ascii_digit())
            && (part == "0" || !part.starts_with('0'));
        match part.parse::<u64>() {
            Ok(n) if canonical_number => Identifier::Numeric(n),
            _ => Identifier::AlphaNumeric(part.to_string()),
        }
    }

    /// Identifier comparison used when deciding whether a requested
    /// prerelease id is already in place.
    fn matches(&self, requested: &str) -> bool {
        match self {
            Identifier::Numeric(n) => requested.parse::<u64>() == Ok(*n),
            Identifier::AlphaNumeric(s) => s == requested,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::AlphaNumeric(s) => write!(f, "{}", s),
        }
    }
}

/// Mutable, split view of a version's prerelease component.
///
/// # Examples
/// - "" -> []
/// - "beta.1" -> [AlphaNumeric("beta"), Numeric(1)]
/// - "3" -> [Numeric(3)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrereleaseParts(Vec<Identifier>);

impl PrereleaseParts {
    pub fn from_prerelease(pre: &Prerelease) -> Self {
        if pre.is_empty() {
            return PrereleaseParts::default();
        }
        PrereleaseParts(pre.as_str().split('.').map(Identifier::parse).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// The first identifier when it is not numeric (`beta` in `beta.1`).
    pub fn leading_identifier(&self) -> Option<&str> {
        match self.0.first() {
            Some(Identifier::AlphaNumeric(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Advance the prerelease counter.
    ///
    /// Increments the last numeric identifier, or appends `0` when there is
    /// none. A requested identifier that differs from the current leading one
    /// (or has no counter after it) restarts the sequence at `<id>.0`.
    pub fn bump(&mut self, identifier: Option<&str>) -> Option<()> {
        if self.0.is_empty() {
            self.0.push(Identifier::Numeric(0));
        } else {
            let last_numeric = self.0.iter_mut().rev().find_map(|part| match part {
                Identifier::Numeric(n) => Some(n),
                Identifier::AlphaNumeric(_) => None,
            });
            match last_numeric {
                Some(n) => *n = n.checked_add(1)?,
                None => self.0.push(Identifier::Numeric(0)),
            }
        }

        if let Some(id) = identifier {
            let keep = match self.0.first() {
                Some(first) if first.matches(id) => {
                    matches!(self.0.get(1), Some(Identifier::Numeric(_)))
                }
                _ => false,
            };
            if !keep {
                self.0 = vec![
                    Identifier::AlphaNumeric(id.to_string()),
                    Identifier::Numeric(0),
                ];
            }
        }

        Some(())
    }

    /// Rebuild a `semver::Prerelease`; `None` if the result is not valid.
    pub fn to_prerelease(&self) -> Option<Prerelease> {
        if self.0.is_empty() {
            return Some(Prerelease::EMPTY);
        }
        Prerelease::new(&self.to_string()).ok()
    }
}

impl fmt::Display for PrereleaseParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}
