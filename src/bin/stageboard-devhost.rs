//! Development stand-in for the hosting service's contents API.
//!
//! Serves `GET`/`PUT /repos/:owner/:repo/contents/*path` over an in-memory
//! file table with content-derived revision tokens, so the editor and the
//! integration tests can run without network access.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tokio::sync::RwLock;

#[path = "stageboard_devhost/http_error.rs"]
mod http_error;
use self::http_error::*;
#[path = "stageboard_devhost/handlers.rs"]
mod handlers;
use self::handlers::*;
#[path = "stageboard_devhost/runtime.rs"]
mod runtime;

/// One file on one branch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FileKey {
    owner: String,
    repo: String,
    branch: String,
    path: String,
}

#[derive(Clone, Debug)]
struct StoredFile {
    content: Vec<u8>,
    sha: String,
}

impl StoredFile {
    fn new(content: Vec<u8>) -> Self {
        let sha = revision_of(&content);
        Self { content, sha }
    }
}

struct AppState {
    token: String,
    default_branch: String,
    files: RwLock<HashMap<FileKey, StoredFile>>,
}

/// Forty hex characters, the same shape as a git blob id.
fn revision_of(content: &[u8]) -> String {
    let hex = blake3::hash(content).to_hex();
    hex.as_str()[..40].to_string()
}

#[tokio::main]
async fn main() {
    if let Err(err) = runtime::run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
