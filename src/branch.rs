//! Derives branch names from references, and the deployment stage
//! each branch belongs to.

use crate::error::HookError;
use std::fmt;

/// The prefix every branch reference carries.
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Maximum length of branch names used to name pipeline resources.
pub const PIPELINE_BRANCH_MAX_LEN: usize = 15;

/// How a reference is turned into a branch name.
#[derive(Debug, Clone)]
pub struct BranchNameOptions {
    /// The prefix that must be present and is stripped.
    pub prefix: String,

    /// Replace `/` with `-` and lower-case the result.
    pub clean: bool,

    /// Truncate to this many characters. Distinct branches may end up
    /// with the same truncated name.
    pub max_len: Option<usize>,
}

impl BranchNameOptions {
    /// Options for naming pipeline stacks and storage prefixes.
    pub fn pipeline() -> Self {
        Self {
            prefix: String::from(BRANCH_REF_PREFIX),
            clean: true,
            max_len: Some(PIPELINE_BRANCH_MAX_LEN),
        }
    }

    /// Options for naming build variables and artifact paths.
    pub fn build() -> Self {
        Self {
            prefix: String::from(BRANCH_REF_PREFIX),
            clean: true,
            max_len: None,
        }
    }
}

/// Resolve the branch name from a reference.
pub fn resolve(reference: &str, options: &BranchNameOptions) -> Result<String, HookError> {
    let stripped =
        reference
            .strip_prefix(&options.prefix)
            .ok_or_else(|| HookError::InvalidReference {
                reference: reference.to_string(),
                prefix: options.prefix.clone(),
            })?;
    let name = if options.clean {
        stripped.replace('/', "-").to_lowercase()
    } else {
        stripped.to_string()
    };
    Ok(match options.max_len {
        Some(max_len) => name.chars().take(max_len).collect(),
        None => name,
    })
}

/// The deployment environment a branch deploys to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Live,
    Develop,
    Feature,
}

impl Stage {
    /// Classify a branch name.
    pub fn of(branch: &str) -> Self {
        match branch {
            "master" => Stage::Live,
            "develop" => Stage::Develop,
            _ => Stage::Feature,
        }
    }

    /// The stage's name, as passed to pipeline templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Live => "live",
            Stage::Develop => "develop",
            Stage::Feature => "feature",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> BranchNameOptions {
        BranchNameOptions {
            clean: false,
            ..BranchNameOptions::build()
        }
    }

    #[test]
    fn strips_exactly_the_prefix() {
        for branch in ["main", "Feature/Login", "a/b/c", "refs/heads/nested", ""] {
            let reference = format!("refs/heads/{branch}");
            assert_eq!(resolve(&reference, &raw()).unwrap(), branch);
        }
    }

    #[test]
    fn rejects_references_without_the_prefix() {
        for reference in ["refs/tags/v1.0", "heads/main", "main", "", "refs/heads"] {
            assert_eq!(
                resolve(reference, &BranchNameOptions::build()),
                Err(HookError::InvalidReference {
                    reference: reference.to_string(),
                    prefix: String::from(BRANCH_REF_PREFIX),
                })
            );
        }
    }

    #[test]
    fn cleaning_replaces_slashes_and_lowercases() {
        assert_eq!(
            resolve("refs/heads/Feature/JIRA-12/Login", &BranchNameOptions::build()).unwrap(),
            "feature-jira-12-login"
        );
    }

    #[test]
    fn truncates_to_a_prefix_of_the_cleaned_name() {
        let name = resolve(
            "refs/heads/a-very-long-branch-name",
            &BranchNameOptions::pipeline(),
        )
        .unwrap();
        assert_eq!(name.chars().count(), 15);
        assert_eq!(name, "a-very-long-bra");
        assert!("a-very-long-branch-name".starts_with(&name));
    }

    #[test]
    fn short_names_are_not_padded() {
        assert_eq!(
            resolve("refs/heads/develop", &BranchNameOptions::pipeline()).unwrap(),
            "develop"
        );
    }

    #[test]
    fn truncation_may_collide() {
        let first = resolve("refs/heads/feature/payments-v1", &BranchNameOptions::pipeline());
        let second = resolve("refs/heads/feature/payments-v2", &BranchNameOptions::pipeline());
        assert_eq!(first, second);
    }

    #[test]
    fn truncation_counts_characters() {
        let options = BranchNameOptions {
            max_len: Some(3),
            ..BranchNameOptions::build()
        };
        assert_eq!(resolve("refs/heads/ñandú", &options).unwrap(), "ñan");
    }

    #[test]
    fn classifies_stages() {
        assert_eq!(Stage::of("master"), Stage::Live);
        assert_eq!(Stage::of("develop"), Stage::Develop);
        for branch in ["main", "feature-x", "Master", "develop-2", ""] {
            assert_eq!(Stage::of(branch), Stage::Feature);
        }
        assert_eq!(Stage::Live.to_string(), "live");
        assert_eq!(Stage::Develop.to_string(), "develop");
        assert_eq!(Stage::Feature.to_string(), "feature");
    }
}
