//! Wire shapes of the contents API.

#[derive(Debug, serde::Deserialize)]
pub struct ContentsResponse {
    /// Base64, possibly wrapped with newlines.
    pub content: String,
    pub sha: String,

    #[serde(default)]
    pub encoding: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct UpdateContentsRequest {
    pub message: String,
    pub content: String,
    pub sha: String,
    pub branch: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct UpdateContentsResponse {
    pub content: ContentRef,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ContentRef {
    pub sha: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
