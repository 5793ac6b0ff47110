use crate::domain::prerelease::PrereleaseParts;
use crate::error::{ReleaseError, Result};
use semver::Version;
use std::fmt;

/// Minimum version impact implied by a set of commits.
///
/// Variants are declared in increasing order so the derived `Ord` gives
/// `None < Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BumpLevel {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl BumpLevel {
    /// Raise to `candidate` if it is higher; never lowers the level.
    pub fn raise(self, candidate: BumpLevel) -> BumpLevel {
        self.max(candidate)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BumpLevel::None => "none",
            BumpLevel::Patch => "patch",
            BumpLevel::Minor => "minor",
            BumpLevel::Major => "major",
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of increment applied to the current version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseType {
    Major,
    Minor,
    Patch,
    PreMajor,
    PreMinor,
    PrePatch,
    PreRelease,
}

impl ReleaseType {
    pub const ALL: [ReleaseType; 7] = [
        ReleaseType::Major,
        ReleaseType::Minor,
        ReleaseType::Patch,
        ReleaseType::PreMajor,
        ReleaseType::PreMinor,
        ReleaseType::PrePatch,
        ReleaseType::PreRelease,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
            ReleaseType::PreMajor => "premajor",
            ReleaseType::PreMinor => "preminor",
            ReleaseType::PrePatch => "prepatch",
            ReleaseType::PreRelease => "prerelease",
        }
    }

    pub fn is_pre(&self) -> bool {
        matches!(
            self,
            ReleaseType::PreMajor
                | ReleaseType::PreMinor
                | ReleaseType::PrePatch
                | ReleaseType::PreRelease
        )
    }

    /// Release type matching a bump level, in its `pre` flavour when a
    /// prerelease is requested. `BumpLevel::None` has no release type.
    pub fn for_bump(level: BumpLevel, prerelease: bool) -> Option<ReleaseType> {
        match (level, prerelease) {
            (BumpLevel::None, _) => None,
            (BumpLevel::Patch, false) => Some(ReleaseType::Patch),
            (BumpLevel::Minor, false) => Some(ReleaseType::Minor),
            (BumpLevel::Major, false) => Some(ReleaseType::Major),
            (BumpLevel::Patch, true) => Some(ReleaseType::PrePatch),
            (BumpLevel::Minor, true) => Some(ReleaseType::PreMinor),
            (BumpLevel::Major, true) => Some(ReleaseType::PreMajor),
        }
    }

    /// Pick the single release type whose flag is set.
    ///
    /// Flags are mutually exclusive: two set flags are reported in the order
    /// they appear in `flags`.
    pub fn from_flags(flags: &[(ReleaseType, bool)]) -> Result<Option<ReleaseType>> {
        let mut selected = flags.iter().filter(|(_, set)| *set).map(|(t, _)| *t);
        let first = selected.next();
        if let (Some(first), Some(second)) = (first, selected.next()) {
            return Err(ReleaseError::ConflictingReleaseTypes { first, second });
        }
        Ok(first)
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the current version, which selects the resolution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionShape {
    /// Exactly `0.0.0`: never released.
    Unreleased,
    /// `0.x.y`: preliminary, breaking changes do not force `1.0.0`.
    ZeroMajor,
    /// `1.0.0` and above.
    Stable,
}

/// Derived view of the package's current version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersionState {
    pub version: Version,
    pub is_unreleased: bool,
    pub is_zero_major: bool,
    /// The version carries a prerelease component (`1.0.0-beta.1`, `1.0.0-3`).
    pub has_prerelease: bool,
    /// Leading non-numeric prerelease component, if any (`beta` in `1.0.0-beta.1`).
    pub prerelease_id: Option<String>,
}

impl PackageVersionState {
    /// Parse the current version; `source_name` names where it came from in errors.
    pub fn parse(raw: &str, source_name: &str) -> Result<Self> {
        let version = Version::parse(raw).map_err(|_| ReleaseError::InvalidVersion {
            source_name: source_name.to_string(),
            version: raw.to_string(),
        })?;

        let parts = PrereleaseParts::from_prerelease(&version.pre);

        Ok(PackageVersionState {
            is_unreleased: raw == "0.0.0",
            is_zero_major: raw.starts_with("0."),
            has_prerelease: !parts.is_empty(),
            prerelease_id: parts.leading_identifier().map(str::to_string),
            version,
        })
    }

    pub fn shape(&self) -> VersionShape {
        if self.is_unreleased {
            VersionShape::Unreleased
        } else if self.is_zero_major {
            VersionShape::ZeroMajor
        } else {
            VersionShape::Stable
        }
    }
}

/// Apply a semantic-version increment.
///
/// Follows the npm `semver.inc` rules with an identifier base of `0`.
/// Returns `None` when the increment is undefined: an invalid prerelease
/// identifier or a numeric overflow.
pub fn increment(
    current: &Version,
    release_type: ReleaseType,
    identifier: Option<&str>,
) -> Option<Version> {
    let identifier = identifier.filter(|id| !id.is_empty());
    if release_type.is_pre() {
        if let Some(id) = identifier {
            semver::Prerelease::new(id).ok()?;
        }
    }

    let mut next = Version::new(current.major, current.minor, current.patch);
    let mut pre = PrereleaseParts::from_prerelease(&current.pre);

    match release_type {
        ReleaseType::PreMajor => {
            pre.clear();
            next.major = next.major.checked_add(1)?;
            next.minor = 0;
            next.patch = 0;
            pre.bump(identifier)?;
        }
        ReleaseType::PreMinor => {
            pre.clear();
            next.minor = next.minor.checked_add(1)?;
            next.patch = 0;
            pre.bump(identifier)?;
        }
        ReleaseType::PrePatch => {
            pre.clear();
            bump_patch(&mut next, &mut pre)?;
            pre.bump(identifier)?;
        }
        ReleaseType::PreRelease => {
            if pre.is_empty() {
                bump_patch(&mut next, &mut pre)?;
            }
            pre.bump(identifier)?;
        }
        ReleaseType::Major => {
            // 1.0.0-beta.2 -> 1.0.0, 1.2.0 -> 2.0.0
            if next.minor != 0 || next.patch != 0 || pre.is_empty() {
                next.major = next.major.checked_add(1)?;
            }
            next.minor = 0;
            next.patch = 0;
            pre.clear();
        }
        ReleaseType::Minor => {
            if next.patch != 0 || pre.is_empty() {
                next.minor = next.minor.checked_add(1)?;
            }
            next.patch = 0;
            pre.clear();
        }
        ReleaseType::Patch => bump_patch(&mut next, &mut pre)?,
    }

    next.pre = pre.to_prerelease()?;
    Some(next)
}

fn bump_patch(version: &mut Version, pre: &mut PrereleaseParts) -> Option<()> {
    if pre.is_empty() {
        version.patch = version.patch.checked_add(1)?;
    }
    pre.clear();
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inc(version: &str, release_type: ReleaseType, id: Option<&str>) -> Option<String> {
        increment(&Version::parse(version).unwrap(), release_type, id).map(|v| v.to_string())
    }

    #[test]
    fn test_bump_level_order() {
        assert!(BumpLevel::None < BumpLevel::Patch);
        assert!(BumpLevel::Patch < BumpLevel::Minor);
        assert!(BumpLevel::Minor < BumpLevel::Major);
    }

    #[test]
    fn test_bump_level_raise_never_lowers() {
        assert_eq!(BumpLevel::Major.raise(BumpLevel::Patch), BumpLevel::Major);
        assert_eq!(BumpLevel::None.raise(BumpLevel::Minor), BumpLevel::Minor);
        assert_eq!(BumpLevel::Minor.raise(BumpLevel::None), BumpLevel::Minor);
    }

    #[test]
    fn test_release_type_for_bump() {
        assert_eq!(ReleaseType::for_bump(BumpLevel::None, false), None);
        assert_eq!(ReleaseType::for_bump(BumpLevel::None, true), None);
        assert_eq!(
            ReleaseType::for_bump(BumpLevel::Patch, false),
            Some(ReleaseType::Patch)
        );
        assert_eq!(
            ReleaseType::for_bump(BumpLevel::Major, true),
            Some(ReleaseType::PreMajor)
        );
    }

    #[test]
    fn test_from_flags_none_or_one() {
        let none = [(ReleaseType::Major, false), (ReleaseType::Minor, false)];
        assert_eq!(ReleaseType::from_flags(&none).unwrap(), None);

        let one = [(ReleaseType::Major, false), (ReleaseType::Minor, true)];
        assert_eq!(
            ReleaseType::from_flags(&one).unwrap(),
            Some(ReleaseType::Minor)
        );
    }

    #[test]
    fn test_from_flags_conflict() {
        let both = [
            (ReleaseType::Major, true),
            (ReleaseType::Minor, false),
            (ReleaseType::Patch, true),
        ];
        match ReleaseType::from_flags(&both) {
            Err(ReleaseError::ConflictingReleaseTypes { first, second }) => {
                assert_eq!(first, ReleaseType::Major);
                assert_eq!(second, ReleaseType::Patch);
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_version_state_shapes() {
        let unreleased = PackageVersionState::parse("0.0.0", "package.json").unwrap();
        assert_eq!(unreleased.shape(), VersionShape::Unreleased);

        let zero = PackageVersionState::parse("0.5.0", "package.json").unwrap();
        assert_eq!(zero.shape(), VersionShape::ZeroMajor);
        assert!(!zero.has_prerelease);

        let stable = PackageVersionState::parse("1.2.3-beta.4", "package.json").unwrap();
        assert_eq!(stable.shape(), VersionShape::Stable);
        assert!(stable.has_prerelease);
        assert_eq!(stable.prerelease_id.as_deref(), Some("beta"));
    }

    #[test]
    fn test_version_state_numeric_prerelease_has_no_id() {
        let state = PackageVersionState::parse("1.0.0-3", "package.json").unwrap();
        assert!(state.has_prerelease);
        assert_eq!(state.prerelease_id, None);
    }

    #[test]
    fn test_version_state_invalid() {
        let err = PackageVersionState::parse("1.2", "package.json").unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidVersion { .. }));
    }

    #[test]
    fn test_increment_plain() {
        assert_eq!(inc("1.2.3", ReleaseType::Patch, None).unwrap(), "1.2.4");
        assert_eq!(inc("1.2.3", ReleaseType::Minor, None).unwrap(), "1.3.0");
        assert_eq!(inc("1.2.3", ReleaseType::Major, None).unwrap(), "2.0.0");
        assert_eq!(inc("0.5.0", ReleaseType::Minor, None).unwrap(), "0.6.0");
        assert_eq!(inc("0.0.0", ReleaseType::Major, None).unwrap(), "1.0.0");
    }

    #[test]
    fn test_increment_graduates_prerelease() {
        assert_eq!(inc("1.0.0-beta.2", ReleaseType::Major, None).unwrap(), "1.0.0");
        assert_eq!(inc("1.1.0-rc.0", ReleaseType::Minor, None).unwrap(), "1.1.0");
        assert_eq!(inc("1.1.1-rc.0", ReleaseType::Patch, None).unwrap(), "1.1.1");
        assert_eq!(inc("1.1.1-rc.0", ReleaseType::Minor, None).unwrap(), "1.2.0");
    }

    #[test]
    fn test_increment_pre_types() {
        assert_eq!(
            inc("0.0.0", ReleaseType::PreMinor, Some("beta")).unwrap(),
            "0.1.0-beta.0"
        );
        assert_eq!(
            inc("1.2.3", ReleaseType::PreMajor, Some("alpha")).unwrap(),
            "2.0.0-alpha.0"
        );
        assert_eq!(
            inc("1.2.3", ReleaseType::PrePatch, Some("rc")).unwrap(),
            "1.2.4-rc.0"
        );
        assert_eq!(inc("1.2.3", ReleaseType::PreMinor, None).unwrap(), "1.3.0-0");
    }

    #[test]
    fn test_increment_prerelease_continues() {
        assert_eq!(
            inc("1.0.0-beta.0", ReleaseType::PreRelease, Some("beta")).unwrap(),
            "1.0.0-beta.1"
        );
        assert_eq!(
            inc("1.0.0-beta.1", ReleaseType::PreRelease, Some("rc")).unwrap(),
            "1.0.0-rc.0"
        );
        assert_eq!(
            inc("1.0.0-rc", ReleaseType::PreRelease, Some("rc")).unwrap(),
            "1.0.0-rc.0"
        );
        assert_eq!(inc("1.0.0-3", ReleaseType::PreRelease, None).unwrap(), "1.0.0-4");
        assert_eq!(
            inc("1.2.3", ReleaseType::PreRelease, Some("beta")).unwrap(),
            "1.2.4-beta.0"
        );
    }

    #[test]
    fn test_increment_rejects_invalid_identifier() {
        assert_eq!(inc("1.2.3", ReleaseType::PreMinor, Some("be ta")), None);
        assert_eq!(inc("1.2.3", ReleaseType::PreRelease, Some("beta!")), None);
    }

    #[test]
    fn test_increment_overflow_is_undefined() {
        let version = Version::new(u64::MAX, 0, 0);
        assert_eq!(increment(&version, ReleaseType::Major, None), None);
    }

    #[test]
    fn test_increment_drops_build_metadata() {
        assert_eq!(inc("1.2.3+build.5", ReleaseType::Patch, None).unwrap(), "1.2.4");
    }
}
