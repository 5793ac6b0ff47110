use crate::config::StableOverride;
use crate::domain::version::increment;
use crate::domain::{BumpLevel, PackageVersionState, ReleaseType, VersionShape};
use crate::error::{ReleaseError, Result};
use semver::Version;
use std::cmp::Ordering;
use tracing::debug;

/// Everything the resolver needs to pick the next version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionInput {
    /// Version currently in the package manifest.
    pub current_version: String,
    /// Bump suggested by the commits.
    pub bump: BumpLevel,
    /// Release type explicitly requested by the user.
    pub release_type: Option<ReleaseType>,
    /// Prerelease identifier explicitly requested by the user.
    pub prerelease_id: Option<String>,
    /// Version embedded in the latest release tag.
    pub tag_version: Option<String>,
    /// Latest version published in the registry.
    pub registry_version: Option<String>,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub release_type: ReleaseType,
    /// Identifier passed to the increment, if any.
    pub prerelease_id: Option<String>,
    pub next_version: Version,
}

/// Policy state machine turning the current version and the commit bump into
/// the next version.
///
/// The policy depends on the shape of the current version:
/// - unreleased (`0.0.0`): `major`, or `preminor` when a prerelease id is requested
/// - zero-major (`0.x.y`): prerelease continuation, else `patch` or `minor`;
///   a major bump is capped to `minor`
/// - stable: prerelease continuation, else the type matching the bump
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionResolver {
    stable_override: StableOverride,
}

impl VersionResolver {
    pub fn new(stable_override: StableOverride) -> Self {
        VersionResolver { stable_override }
    }

    /// Check the current version against the latest tag and registry versions.
    ///
    /// A current version lower than either means the manifest, the repository
    /// and the registry disagree, and nothing must be computed from it.
    pub fn validate(&self, input: &ResolutionInput) -> Result<PackageVersionState> {
        let state = PackageVersionState::parse(&input.current_version, "package.json")?;

        if let Some(tag_version) = &input.tag_version {
            let tag = parse_version(tag_version, "latest tag")?;
            if precedence(&state.version, &tag) == Ordering::Less {
                return Err(ReleaseError::BehindLatestTag {
                    current: input.current_version.clone(),
                    tag_version: tag_version.clone(),
                });
            }
        }

        if let Some(registry_version) = &input.registry_version {
            let published = parse_version(registry_version, "registry")?;
            if precedence(&state.version, &published) == Ordering::Less {
                return Err(ReleaseError::BehindRegistry {
                    current: input.current_version.clone(),
                    registry_version: registry_version.clone(),
                });
            }
        }

        Ok(state)
    }

    /// Pick the release type for the given version state.
    ///
    /// Returns `None` only for a stable version without prerelease whose bump
    /// is `none` and for which no override applies.
    pub fn choose_release_type(
        &self,
        state: &PackageVersionState,
        bump: BumpLevel,
        requested: Option<ReleaseType>,
        prerelease_requested: bool,
    ) -> Option<ReleaseType> {
        let shape = state.shape();
        let chosen = match shape {
            VersionShape::Unreleased => requested.or(Some(if prerelease_requested {
                ReleaseType::PreMinor
            } else {
                ReleaseType::Major
            })),
            VersionShape::ZeroMajor => requested.or(Some(if state.has_prerelease {
                ReleaseType::PreRelease
            } else if bump == BumpLevel::Patch {
                if prerelease_requested {
                    ReleaseType::PrePatch
                } else {
                    ReleaseType::Patch
                }
            } else if prerelease_requested {
                ReleaseType::PreMinor
            } else {
                ReleaseType::Minor
            })),
            VersionShape::Stable => {
                let derived = if state.has_prerelease {
                    Some(ReleaseType::PreRelease)
                } else {
                    ReleaseType::for_bump(bump, prerelease_requested)
                };
                match self.stable_override {
                    StableOverride::Honor => requested.or(derived),
                    StableOverride::Ignore => {
                        if let Some(ignored) = requested {
                            debug!(
                                "Ignoring requested release type '{}' for stable version {}",
                                ignored, state.version
                            );
                        }
                        derived
                    }
                }
            }
        };

        debug!(
            "Version {} is {:?} with bump {}: release type {:?}",
            state.version, shape, bump, chosen
        );
        chosen
    }

    /// Validate the input, then derive the next version.
    pub fn resolve(&self, input: &ResolutionInput) -> Result<Resolution> {
        let state = self.validate(input)?;
        self.resolve_state(&state, input)
    }

    /// Derive the next version for an already validated state.
    pub(crate) fn resolve_state(
        &self,
        state: &PackageVersionState,
        input: &ResolutionInput,
    ) -> Result<Resolution> {
        let requested_id = input.prerelease_id.as_deref().filter(|id| !id.is_empty());
        let identifier = requested_id
            .map(str::to_string)
            .or_else(|| state.prerelease_id.clone());

        let release_type = self
            .choose_release_type(state, input.bump, input.release_type, requested_id.is_some())
            .ok_or_else(|| ReleaseError::CouldNotComputeVersion {
                version: input.current_version.clone(),
                release_type: input.bump.to_string(),
                identifier: identifier.clone(),
            })?;

        let next_version = increment(&state.version, release_type, identifier.as_deref())
            .ok_or_else(|| ReleaseError::CouldNotComputeVersion {
                version: input.current_version.clone(),
                release_type: release_type.to_string(),
                identifier: identifier.clone(),
            })?;

        Ok(Resolution {
            release_type,
            prerelease_id: identifier,
            next_version,
        })
    }
}

fn parse_version(raw: &str, source_name: &str) -> Result<Version> {
    Version::parse(raw).map_err(|_| ReleaseError::InvalidVersion {
        source_name: source_name.to_string(),
        version: raw.to_string(),
    })
}

/// Semantic version precedence; build metadata does not count.
fn precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(current: &str, bump: BumpLevel) -> ResolutionInput {
        ResolutionInput {
            current_version: current.to_string(),
            bump,
            ..Default::default()
        }
    }

    fn resolve(input: &ResolutionInput) -> Resolution {
        VersionResolver::default().resolve(input).unwrap()
    }

    #[test]
    fn test_unreleased_defaults_to_major() {
        let r = resolve(&input("0.0.0", BumpLevel::Patch));
        assert_eq!(r.release_type, ReleaseType::Major);
        assert_eq!(r.next_version.to_string(), "1.0.0");
    }

    #[test]
    fn test_unreleased_with_prerelease_id() {
        let mut i = input("0.0.0", BumpLevel::Major);
        i.prerelease_id = Some("beta".to_string());
        let r = resolve(&i);
        assert_eq!(r.release_type, ReleaseType::PreMinor);
        assert_eq!(r.next_version.to_string(), "0.1.0-beta.0");
    }

    #[test]
    fn test_unreleased_honors_override() {
        let mut i = input("0.0.0", BumpLevel::Major);
        i.release_type = Some(ReleaseType::Minor);
        assert_eq!(resolve(&i).next_version.to_string(), "0.1.0");
    }

    #[test]
    fn test_zero_major_caps_breaking_to_minor() {
        let r = resolve(&input("0.5.0", BumpLevel::Major));
        assert_eq!(r.release_type, ReleaseType::Minor);
        assert_eq!(r.next_version.to_string(), "0.6.0");
    }

    #[test]
    fn test_zero_major_patch() {
        let r = resolve(&input("0.5.3", BumpLevel::Patch));
        assert_eq!(r.release_type, ReleaseType::Patch);
        assert_eq!(r.next_version.to_string(), "0.5.4");

        let mut i = input("0.5.3", BumpLevel::Patch);
        i.prerelease_id = Some("rc".to_string());
        let r = resolve(&i);
        assert_eq!(r.release_type, ReleaseType::PrePatch);
        assert_eq!(r.next_version.to_string(), "0.5.4-rc.0");
    }

    #[test]
    fn test_zero_major_minor_with_prerelease_id() {
        let mut i = input("0.5.3", BumpLevel::Minor);
        i.prerelease_id = Some("alpha".to_string());
        let r = resolve(&i);
        assert_eq!(r.release_type, ReleaseType::PreMinor);
        assert_eq!(r.next_version.to_string(), "0.6.0-alpha.0");
    }

    #[test]
    fn test_zero_major_continues_prerelease() {
        let r = resolve(&input("0.6.0-beta.1", BumpLevel::Major));
        assert_eq!(r.release_type, ReleaseType::PreRelease);
        assert_eq!(r.prerelease_id.as_deref(), Some("beta"));
        assert_eq!(r.next_version.to_string(), "0.6.0-beta.2");
    }

    #[test]
    fn test_zero_major_honors_override() {
        let mut i = input("0.5.0", BumpLevel::Patch);
        i.release_type = Some(ReleaseType::Major);
        let r = resolve(&i);
        assert_eq!(r.release_type, ReleaseType::Major);
        assert_eq!(r.next_version.to_string(), "1.0.0");
    }

    #[test]
    fn test_stable_direct_mapping() {
        let r = resolve(&input("1.2.3", BumpLevel::Patch));
        assert_eq!(r.release_type, ReleaseType::Patch);
        assert_eq!(r.next_version.to_string(), "1.2.4");

        assert_eq!(
            resolve(&input("1.2.3", BumpLevel::Minor)).next_version.to_string(),
            "1.3.0"
        );
        assert_eq!(
            resolve(&input("1.2.3", BumpLevel::Major)).next_version.to_string(),
            "2.0.0"
        );
    }

    #[test]
    fn test_stable_with_prerelease_id() {
        let mut i = input("1.2.3", BumpLevel::Major);
        i.prerelease_id = Some("beta".to_string());
        let r = resolve(&i);
        assert_eq!(r.release_type, ReleaseType::PreMajor);
        assert_eq!(r.next_version.to_string(), "2.0.0-beta.0");
    }

    #[test]
    fn test_stable_continues_prerelease_with_current_id() {
        let r = resolve(&input("2.0.0-beta.0", BumpLevel::Patch));
        assert_eq!(r.release_type, ReleaseType::PreRelease);
        assert_eq!(r.next_version.to_string(), "2.0.0-beta.1");
    }

    #[test]
    fn test_stable_switches_prerelease_id() {
        let mut i = input("2.0.0-beta.3", BumpLevel::Patch);
        i.prerelease_id = Some("rc".to_string());
        assert_eq!(resolve(&i).next_version.to_string(), "2.0.0-rc.0");
    }

    #[test]
    fn test_stable_ignores_override_by_default() {
        let mut i = input("1.2.3", BumpLevel::Patch);
        i.release_type = Some(ReleaseType::Major);
        let r = resolve(&i);
        assert_eq!(r.release_type, ReleaseType::Patch);
        assert_eq!(r.next_version.to_string(), "1.2.4");
    }

    #[test]
    fn test_stable_honors_override_when_configured() {
        let mut i = input("1.2.3", BumpLevel::Patch);
        i.release_type = Some(ReleaseType::Major);
        let r = VersionResolver::new(StableOverride::Honor)
            .resolve(&i)
            .unwrap();
        assert_eq!(r.release_type, ReleaseType::Major);
        assert_eq!(r.next_version.to_string(), "2.0.0");
    }

    #[test]
    fn test_stable_without_bump_cannot_compute() {
        let err = VersionResolver::default()
            .resolve(&input("1.2.3", BumpLevel::None))
            .unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::CouldNotComputeVersion { ref release_type, .. } if release_type == "none"
        ));
    }

    #[test]
    fn test_invalid_identifier_cannot_compute() {
        let mut i = input("1.2.3", BumpLevel::Minor);
        i.prerelease_id = Some("not valid!".to_string());
        let err = VersionResolver::default().resolve(&i).unwrap_err();
        assert!(matches!(err, ReleaseError::CouldNotComputeVersion { .. }));
    }

    #[test]
    fn test_validation_gate_latest_tag() {
        let mut i = input("1.0.0", BumpLevel::Patch);
        i.tag_version = Some("1.1.0".to_string());
        let err = VersionResolver::default().resolve(&i).unwrap_err();
        assert!(matches!(err, ReleaseError::BehindLatestTag { .. }));
    }

    #[test]
    fn test_validation_gate_registry() {
        let mut i = input("1.0.0", BumpLevel::Patch);
        i.registry_version = Some("1.0.1".to_string());
        let err = VersionResolver::default().resolve(&i).unwrap_err();
        assert!(matches!(err, ReleaseError::BehindRegistry { .. }));
    }

    #[test]
    fn test_validation_accepts_equal_and_prerelease_below() {
        let mut i = input("1.0.0", BumpLevel::Patch);
        i.tag_version = Some("1.0.0".to_string());
        i.registry_version = Some("1.0.0-rc.2".to_string());
        assert!(VersionResolver::default().validate(&i).is_ok());
    }

    #[test]
    fn test_invalid_current_version() {
        let err = VersionResolver::default()
            .resolve(&input("1.0", BumpLevel::Patch))
            .unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidVersion { .. }));
    }
}
