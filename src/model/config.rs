use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_BRANCH, DEFAULT_PATH};
use crate::remote::DEFAULT_API_URL;
use crate::session::SessionLimits;

/// Editor settings read from `config.json` in the state directory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EditorConfig {
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Absolute session length in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_minutes: Option<u64>,

    /// Minutes without input before the session locks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inactivity_minutes: Option<u64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            api_base_url: None,
            branch: None,
            path: None,
            session_minutes: None,
            inactivity_minutes: None,
        }
    }
}

impl EditorConfig {
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or(DEFAULT_PATH)
    }

    pub fn limits(&self) -> SessionLimits {
        let mut limits = SessionLimits::default();
        if let Some(m) = self.session_minutes {
            limits.session_duration = Duration::from_secs(m * 60);
        }
        if let Some(m) = self.inactivity_minutes {
            limits.inactivity_timeout = Duration::from_secs(m * 60);
        }
        limits
    }
}

/// Local state kept between runs. Holds at most the obfuscated repository
/// coordinates; the credential is never written here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EditorState {
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure_repo_config: Option<String>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            version: 1,
            secure_repo_config: None,
        }
    }
}

/// Plaintext shape of `secure_repo_config` before obfuscation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberedRepo {
    pub owner: String,
    pub repo: String,
}
