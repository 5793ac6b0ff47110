use std::fmt;

/// Non-fatal outcomes that stop a release early or weaken a check.
/// These are reported to the user as warnings, never as failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryWarning {
    /// No commit concerning the package since the previous tag
    NoNewCommits { previous_tag: Option<String> },
    /// Commits exist but none is a breaking change, a feature or a fix
    NoReleasableChanges { commit_count: usize },
    /// The previous tag carries no recognisable version, so it cannot be compared
    UnparsableTag { tag: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoNewCommits { previous_tag } => match previous_tag {
                Some(tag) => write!(
                    f,
                    "No new commits found since last tag '{}': nothing to do.",
                    tag
                ),
                None => write!(f, "No commits found for this package: nothing to do."),
            },
            BoundaryWarning::NoReleasableChanges { commit_count } => write!(
                f,
                "Detected no breaking change, no new feature and no bug fix in {} commit(s): no need to release.",
                commit_count
            ),
            BoundaryWarning::UnparsableTag { tag } => {
                write!(
                    f,
                    "Cannot parse a version from tag '{}', skipping the tag version check",
                    tag
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_new_commits_without_tag() {
        assert_eq!(
            BoundaryWarning::NoNewCommits { previous_tag: None }.to_string(),
            "No commits found for this package: nothing to do."
        );
    }
}
