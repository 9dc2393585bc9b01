//! Error taxonomy for the load/save flow.

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Bad local input; never reaches the network.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("authentication failed (HTTP {status}): check the token and its permissions")]
    Auth { status: u16 },

    #[error("repository or file not found: {0}")]
    NotFound(String),

    /// The revision token sent with a write no longer matches the remote file.
    #[error("the file changed remotely since it was loaded (stale revision {sent})")]
    Conflict { sent: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed remote content: {0}")]
    MalformedContent(String),

    #[error("add at least one stage with a label and a value before saving")]
    EmptyStageList,

    #[error("another load or save is already in progress")]
    Busy,

    #[error("no active session (authenticate first)")]
    NotAuthenticated,
}

pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Auth { .. })
    }

    /// Conflicts are reported as a transport failure; nothing retries or merges them.
    pub fn is_transport(&self) -> bool {
        matches!(self, SyncError::Conflict { .. } | SyncError::Transport(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transport(err.to_string())
    }
}
