use reqwest::StatusCode;
use reqwest::blocking::{RequestBuilder, Response};

use super::RemoteClient;
use crate::error::{Result, SyncError};
use crate::model::RepoCoordinates;

const ACCEPT: &str = "application/vnd.github.v3+json";

impl RemoteClient {
    /// Maps non-2xx statuses onto the error taxonomy. `sent` is the revision
    /// token a write carried, if any.
    pub(super) fn ensure_ok(
        &self,
        resp: Response,
        label: &str,
        sent: Option<&str>,
    ) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().unwrap_or_default();
        tracing::debug!(%status, label, body = %body, "remote request failed");
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SyncError::Auth {
                status: status.as_u16(),
            }),
            StatusCode::NOT_FOUND => Err(SyncError::NotFound(format!(
                "{}: check the repository name and file path",
                label
            ))),
            StatusCode::CONFLICT => Err(SyncError::Conflict {
                sent: sent.unwrap_or_default().to_string(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY if sent.is_some() && body.contains("sha") => {
                Err(SyncError::Conflict {
                    sent: sent.unwrap_or_default().to_string(),
                })
            }
            _ => Err(SyncError::Transport(format!(
                "{}: remote API error {}",
                label, status
            ))),
        }
    }

    pub(super) fn authed(&self, req: RequestBuilder, credential: &str) -> RequestBuilder {
        req.bearer_auth(credential)
            .header(reqwest::header::ACCEPT, ACCEPT)
    }

    /// `{base}/repos/{owner}/{repo}/contents/{path}` with every segment escaped.
    pub(super) fn contents_url(&self, coords: &RepoCoordinates) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| SyncError::Validation(format!("invalid API url {}: {}", self.base_url, e)))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                SyncError::Validation(format!("API url cannot be a base: {}", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(["repos", coords.owner.as_str(), coords.repo.as_str(), "contents"])
                .extend(coords.path.trim_matches('/').split('/'));
        }
        Ok(url)
    }
}
