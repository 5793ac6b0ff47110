use crate::domain::{BumpLevel, Commit};

/// Version impact of a single commit.
pub fn commit_bump(commit: &Commit) -> BumpLevel {
    if commit.breaking {
        BumpLevel::Major
    } else {
        match commit.r#type.as_str() {
            "feat" => BumpLevel::Minor,
            "fix" => BumpLevel::Patch,
            _ => BumpLevel::None,
        }
    }
}

/// Reduce commits to the suggested bump level.
///
/// A running maximum over [`commit_bump`], so the result does not depend on
/// the order of `commits`.
pub fn determine_bump(commits: &[Commit]) -> BumpLevel {
    commits
        .iter()
        .fold(BumpLevel::None, |level, commit| level.raise(commit_bump(commit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(r#type: &str, breaking: bool) -> Commit {
        Commit {
            r#type: r#type.to_string(),
            scope: Some("foo".to_string()),
            subject: format!("{} change", r#type),
            hash: "0000000000000000000000000000000000000000".to_string(),
            breaking,
            references: vec![],
            mentions: vec![],
            notes: vec![],
        }
    }

    fn permutations(items: &[Commit]) -> Vec<Vec<Commit>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut result = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head.clone());
                result.push(tail);
            }
        }
        result
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(determine_bump(&[]), BumpLevel::None);
    }

    #[test]
    fn test_single_commits() {
        assert_eq!(determine_bump(&[commit("feat", false)]), BumpLevel::Minor);
        assert_eq!(determine_bump(&[commit("fix", false)]), BumpLevel::Patch);
        assert_eq!(determine_bump(&[commit("docs", false)]), BumpLevel::None);
        assert_eq!(determine_bump(&[commit("perf", false)]), BumpLevel::None);
    }

    #[test]
    fn test_breaking_dominates_any_type() {
        for t in ["feat", "fix", "chore", "refactor", "anything"] {
            assert_eq!(
                determine_bump(&[commit("fix", false), commit(t, true)]),
                BumpLevel::Major,
                "breaking {} commit should force major",
                t
            );
        }
    }

    #[test]
    fn test_feature_beats_fix() {
        let commits = vec![
            commit("fix", false),
            commit("feat", false),
            commit("fix", false),
        ];
        assert_eq!(determine_bump(&commits), BumpLevel::Minor);
    }

    #[test]
    fn test_order_independence() {
        let lists = vec![
            vec![
                commit("fix", false),
                commit("feat", false),
                commit("chore", true),
                commit("docs", false),
            ],
            vec![
                commit("fix", false),
                commit("docs", false),
                commit("feat", false),
            ],
            vec![commit("docs", false), commit("fix", false), commit("test", false)],
        ];

        for list in lists {
            let expected = determine_bump(&list);
            for permutation in permutations(&list) {
                assert_eq!(determine_bump(&permutation), expected);
            }
        }
    }

    #[test]
    fn test_monotonic_when_folding() {
        let commits = vec![
            commit("feat", false),
            commit("fix", false),
            commit("docs", false),
            commit("fix", true),
            commit("feat", false),
        ];
        let mut previous = BumpLevel::None;
        for n in 0..=commits.len() {
            let level = determine_bump(&commits[..n]);
            assert!(level >= previous);
            previous = level;
        }
    }
}
