use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::middleware;
use axum::routing::get;
use clap::Parser;

use super::*;

#[derive(Parser)]
#[command(name = "stageboard-devhost")]
#[command(about = "Local contents API for trying out stageboard (development)", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8787")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Bearer token clients must present
    #[arg(long, default_value = "dev")]
    token: String,

    /// Branch for seeded files and for requests that name none
    #[arg(long, default_value = stageboard::model::DEFAULT_BRANCH)]
    branch: String,

    /// Serve a local file: OWNER/REPO/PATH=FILE (repeatable)
    #[arg(long = "seed", value_name = "OWNER/REPO/PATH=FILE")]
    seeds: Vec<String>,
}

pub(super) async fn run() -> Result<()> {
    stageboard::logging::init_stderr();
    let args = Args::parse();

    let mut files = HashMap::new();
    for seed in &args.seeds {
        let (key, source) = parse_seed(seed, &args.branch)?;
        let bytes =
            std::fs::read(&source).with_context(|| format!("read seed {}", source.display()))?;
        tracing::info!(repo = %format!("{}/{}", key.owner, key.repo), path = %key.path, "seeded");
        files.insert(key, StoredFile::new(bytes));
    }

    let state = Arc::new(AppState {
        token: args.token.clone(),
        default_branch: args.branch.clone(),
        files: RwLock::new(files),
    });

    let contents: Router<Arc<AppState>> = Router::new()
        .route(
            "/repos/:owner/:repo/contents/*path",
            get(get_contents).put(put_contents),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer));
    let app = Router::new()
        .route("/healthz", get(healthz))
        .merge(contents)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;

    let local_addr = listener.local_addr().context("read listener local addr")?;
    eprintln!("stageboard-devhost listening on {}", local_addr);

    if let Some(addr_file) = &args.addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

/// `OWNER/REPO/PATH=FILE`; PATH may contain slashes.
fn parse_seed(seed: &str, branch: &str) -> Result<(FileKey, PathBuf)> {
    let (target, source) = seed
        .split_once('=')
        .with_context(|| format!("seed `{}` is missing `=FILE`", seed))?;
    let mut parts = target.splitn(3, '/');
    let (Some(owner), Some(repo), Some(path)) = (parts.next(), parts.next(), parts.next()) else {
        anyhow::bail!("seed `{}` must look like OWNER/REPO/PATH=FILE", seed);
    };
    let path = path.trim_matches('/');
    if owner.is_empty() || repo.is_empty() || path.is_empty() || source.is_empty() {
        anyhow::bail!("seed `{}` must look like OWNER/REPO/PATH=FILE", seed);
    }

    Ok((
        FileKey {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
        },
        PathBuf::from(source),
    ))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
#[path = "../../tests/bin/stageboard_devhost/runtime_tests.rs"]
mod tests;
