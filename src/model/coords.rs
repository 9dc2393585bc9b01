use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_PATH: &str = "pipeline-config.json";

/// Where the pipeline file lives on the hosting service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoCoordinates {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl RepoCoordinates {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: DEFAULT_BRANCH.to_string(),
            path: DEFAULT_PATH.to_string(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// `owner/repo`, as shown to the user.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn validate(&self) -> Result<()> {
        if self.owner.is_empty() || self.repo.is_empty() {
            return Err(SyncError::Validation(
                "repository owner and name are required".to_string(),
            ));
        }
        if !is_valid_identifier(&self.owner) || !is_valid_identifier(&self.repo) {
            return Err(SyncError::Validation(
                "invalid repository owner or name format".to_string(),
            ));
        }
        if self.branch.trim().is_empty() {
            return Err(SyncError::Validation("branch is required".to_string()));
        }
        let path = self.path.trim_matches('/');
        if path.is_empty() || path.split('/').any(|seg| seg.is_empty() || seg == "..") {
            return Err(SyncError::Validation(format!(
                "invalid file path: {:?}",
                self.path
            )));
        }
        Ok(())
    }
}

/// Owner and repository names are restricted to `[a-zA-Z0-9._-]+`.
pub fn is_valid_identifier(s: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("static pattern"))
        .is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_follow_the_allow_list() {
        for ok in ["octo", "my-org", "repo.name", "a_b", "X9"] {
            assert!(is_valid_identifier(ok), "{ok}");
        }
        for bad in ["", "a/b", "a b", "../x", "ä", "a;b", "a\n"] {
            assert!(!is_valid_identifier(bad), "{bad:?}");
        }
    }

    #[test]
    fn validate_rejects_bad_owner_before_anything_else() {
        let err = RepoCoordinates::new("bad owner", "repo")
            .validate()
            .expect_err("invalid");
        assert!(matches!(err, SyncError::Validation(_)));
    }

    #[test]
    fn validate_rejects_path_traversal() {
        let err = RepoCoordinates::new("o", "r")
            .with_path("../secrets.json")
            .validate()
            .expect_err("invalid");
        assert!(matches!(err, SyncError::Validation(_)));
        assert!(
            RepoCoordinates::new("o", "r")
                .with_path("config/pipeline.json")
                .validate()
                .is_ok()
        );
    }
}
