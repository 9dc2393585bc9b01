use base64::{Engine, engine::general_purpose::STANDARD};

use super::{
    ConfigStore, ContentsResponse, FetchedFile, RemoteClient, UpdateContentsRequest,
    UpdateContentsResponse,
};
use crate::error::{Result, SyncError};
use crate::model::{PipelineConfig, RepoCoordinates, RevisionToken};

impl ConfigStore for RemoteClient {
    fn fetch_file(&self, coords: &RepoCoordinates, credential: &str) -> Result<FetchedFile> {
        let mut url = self.contents_url(coords)?;
        url.query_pairs_mut().append_pair("ref", &coords.branch);

        tracing::info!(repo = %coords.slug(), path = %coords.path, branch = %coords.branch, "fetch pipeline config");
        let resp = self
            .authed(self.client.get(url), credential)
            .send()
            .map_err(|e| SyncError::Transport(format!("fetch file: {}", e)))?;
        let data: ContentsResponse = self
            .ensure_ok(resp, "fetch file", None)?
            .json()
            .map_err(|e| SyncError::MalformedContent(format!("parse contents response: {}", e)))?;

        if let Some(enc) = data.encoding.as_deref()
            && enc != "base64"
        {
            return Err(SyncError::MalformedContent(format!(
                "unsupported content encoding {:?}",
                enc
            )));
        }

        let text = decode_content(&data.content)?;
        let content = PipelineConfig::parse(&text)?;
        tracing::debug!(sha = %data.sha, stages = content.stages().len(), "fetched pipeline config");
        Ok(FetchedFile {
            content,
            revision: RevisionToken(data.sha),
        })
    }

    fn write_file(
        &self,
        coords: &RepoCoordinates,
        content: &str,
        revision: &RevisionToken,
        credential: &str,
        message: &str,
    ) -> Result<RevisionToken> {
        let url = self.contents_url(coords)?;
        let body = UpdateContentsRequest {
            message: message.to_string(),
            content: STANDARD.encode(content),
            sha: revision.0.clone(),
            branch: coords.branch.clone(),
        };

        tracing::info!(repo = %coords.slug(), path = %coords.path, sha = %revision, "write pipeline config");
        let resp = self
            .authed(self.client.put(url), credential)
            .json(&body)
            .send()
            .map_err(|e| SyncError::Transport(format!("write file: {}", e)))?;
        let out: UpdateContentsResponse = self
            .ensure_ok(resp, "write file", Some(revision.as_str()))?
            .json()
            .map_err(|e| SyncError::Transport(format!("parse write response: {}", e)))?;
        tracing::debug!(sha = %out.content.sha, "wrote pipeline config");
        Ok(RevisionToken(out.content.sha))
    }
}

/// Decodes the API's base64 payload, which arrives wrapped at 60 columns.
pub fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| SyncError::MalformedContent(format!("decode base64 content: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| SyncError::MalformedContent(format!("content is not UTF-8: {}", e)))
}
