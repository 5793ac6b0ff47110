use crate::analyzer::resolver::{Resolution, ResolutionInput, VersionResolver};
use crate::boundary::BoundaryWarning;
use crate::domain::BumpLevel;
use crate::error::Result;
use tracing::info;

/// What the release flow should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleasePlan {
    /// Nothing to release; the warning says why.
    Skip(BoundaryWarning),
    Release(Resolution),
}

/// Decide whether and how to release.
///
/// The checks run in a fixed order: version validation first (failures),
/// then the benign no-ops (no commits, no releasable change), then the
/// version resolution itself.
pub fn plan_release(
    resolver: &VersionResolver,
    input: &ResolutionInput,
    commit_count: usize,
    previous_tag: Option<&str>,
) -> Result<ReleasePlan> {
    let state = resolver.validate(input)?;

    if commit_count == 0 {
        let warning = BoundaryWarning::NoNewCommits {
            previous_tag: previous_tag.map(str::to_string),
        };
        info!("{}", warning);
        return Ok(ReleasePlan::Skip(warning));
    }

    if input.bump == BumpLevel::None {
        let warning = BoundaryWarning::NoReleasableChanges { commit_count };
        info!("{}", warning);
        return Ok(ReleasePlan::Skip(warning));
    }

    resolver
        .resolve_state(&state, input)
        .map(ReleasePlan::Release)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;

    fn input(current: &str, bump: BumpLevel) -> ResolutionInput {
        ResolutionInput {
            current_version: current.to_string(),
            bump,
            ..Default::default()
        }
    }

    #[test]
    fn test_validation_runs_before_commit_checks() {
        let mut i = input("1.0.0", BumpLevel::None);
        i.tag_version = Some("1.1.0".to_string());
        let err = plan_release(&VersionResolver::default(), &i, 0, Some("x-v1.1.0")).unwrap_err();
        assert!(matches!(err, ReleaseError::BehindLatestTag { .. }));
    }

    #[test]
    fn test_no_commits_skips() {
        let plan = plan_release(
            &VersionResolver::default(),
            &input("1.0.0", BumpLevel::None),
            0,
            Some("rollup-plugin-foo-v1.0.0"),
        )
        .unwrap();
        assert_eq!(
            plan,
            ReleasePlan::Skip(BoundaryWarning::NoNewCommits {
                previous_tag: Some("rollup-plugin-foo-v1.0.0".to_string())
            })
        );
    }

    #[test]
    fn test_no_releasable_change_skips() {
        let plan = plan_release(
            &VersionResolver::default(),
            &input("1.0.0", BumpLevel::None),
            3,
            None,
        )
        .unwrap();
        assert_eq!(
            plan,
            ReleasePlan::Skip(BoundaryWarning::NoReleasableChanges { commit_count: 3 })
        );
    }

    #[test]
    fn test_release() {
        let plan = plan_release(
            &VersionResolver::default(),
            &input("0.5.0", BumpLevel::Major),
            1,
            None,
        )
        .unwrap();
        match plan {
            ReleasePlan::Release(r) => assert_eq!(r.next_version.to_string(), "0.6.0"),
            other => panic!("expected a release, got {:?}", other),
        }
    }
}
