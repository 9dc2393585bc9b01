//! Client for the hosting service's file contents API.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::Result;
use crate::model::{PipelineConfig, RepoCoordinates, RevisionToken};

mod contents;
mod http_client;
mod types;
pub use self::types::*;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// A file read from the remote store together with its revision.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchedFile {
    pub content: PipelineConfig,
    pub revision: RevisionToken,
}

/// Read and conditional-replace of one file. [`RemoteClient`] is the HTTP
/// implementation; tests substitute their own.
pub trait ConfigStore {
    fn fetch_file(&self, coords: &RepoCoordinates, credential: &str) -> Result<FetchedFile>;

    /// Replaces the file only if `revision` still names the remote content.
    /// Returns the revision of the new content.
    fn write_file(
        &self,
        coords: &RepoCoordinates,
        content: &str,
        revision: &RevisionToken,
        credential: &str,
        message: &str,
    ) -> Result<RevisionToken>;
}

#[derive(Clone)]
pub struct RemoteClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl RemoteClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("stageboard/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// `Update pipeline configuration - <RFC 3339 timestamp>`.
pub fn commit_message(now: OffsetDateTime) -> String {
    let ts = now
        .format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string());
    format!("Update pipeline configuration - {}", ts)
}
