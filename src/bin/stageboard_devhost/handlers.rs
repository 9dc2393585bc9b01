use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::*;

/// Width the API wraps base64 content at.
const WRAP: usize = 60;

#[derive(Debug, serde::Deserialize)]
pub(super) struct ContentsQuery {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct PutContentsBody {
    message: String,
    content: String,

    #[serde(default)]
    sha: Option<String>,

    #[serde(default)]
    branch: Option<String>,
}

pub(super) async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Accepts `Authorization: Bearer <token>` and the older `token <token>` form.
pub(super) async fn require_bearer(
    State(state): State<Arc<AppState>>,
    req: axum::extract::Request,
    next: Next,
) -> Response {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return unauthorized("Requires authentication");
    };
    let Ok(value) = value.to_str() else {
        return unauthorized("Bad credentials");
    };
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("token "));
    if token != Some(state.token.as_str()) {
        return unauthorized("Bad credentials");
    }
    next.run(req).await
}

fn file_key(
    state: &AppState,
    owner: String,
    repo: String,
    path: &str,
    branch: Option<String>,
) -> FileKey {
    FileKey {
        owner,
        repo,
        branch: branch
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| state.default_branch.clone()),
        path: path.trim_matches('/').to_string(),
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn wrap(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len() + encoded.len() / WRAP + 1);
    for (i, c) in encoded.chars().enumerate() {
        if i > 0 && i % WRAP == 0 {
            out.push('\n');
        }
        out.push(c);
    }
    out.push('\n');
    out
}

pub(super) async fn get_contents(
    State(state): State<Arc<AppState>>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Query(q): Query<ContentsQuery>,
) -> Response {
    let key = file_key(&state, owner, repo, &path, q.git_ref);
    let files = state.files.read().await;
    let Some(file) = files.get(&key) else {
        return not_found();
    };

    Json(serde_json::json!({
        "type": "file",
        "name": file_name(&key.path),
        "path": key.path,
        "sha": file.sha,
        "size": file.content.len(),
        "encoding": "base64",
        "content": wrap(&STANDARD.encode(&file.content)),
    }))
    .into_response()
}

/// Create-or-replace. Replacing requires the current sha; anything else is a
/// conflict and leaves the file untouched.
pub(super) async fn put_contents(
    State(state): State<Arc<AppState>>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Json(body): Json<PutContentsBody>,
) -> Response {
    let cleaned: String = body.content.chars().filter(|c| !c.is_whitespace()).collect();
    let Ok(content) = STANDARD.decode(cleaned) else {
        return unprocessable("content is not valid Base64");
    };

    let key = file_key(&state, owner, repo, &path, body.branch);
    let mut files = state.files.write().await;
    let created = match (files.get(&key), body.sha.as_deref()) {
        (Some(existing), Some(sent)) if existing.sha == sent => false,
        (Some(existing), sent) => {
            tracing::info!(path = %key.path, current = %existing.sha, sent = ?sent, "rejecting stale write");
            return conflict(&key.path, sent);
        }
        (None, None) => true,
        (None, Some(_)) => return not_found(),
    };

    let file = StoredFile::new(content);
    let sha = file.sha.clone();
    files.insert(key.clone(), file);
    tracing::info!(
        repo = %format!("{}/{}", key.owner, key.repo),
        branch = %key.branch,
        path = %key.path,
        %sha,
        message = %body.message,
        "file written"
    );

    let commit = revision_of(format!("{}\n{}", sha, body.message).as_bytes());
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (
        status,
        Json(serde_json::json!({
            "content": {
                "name": file_name(&key.path),
                "path": key.path,
                "sha": sha,
            },
            "commit": {
                "sha": commit,
                "message": body.message,
            },
        })),
    )
        .into_response()
}
