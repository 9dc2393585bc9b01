use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

pub const OWNER: &str = "acme";
pub const REPO: &str = "deploy";
pub const FILE: &str = "pipeline-config.json";

/// A pipeline document with fields around the stage list that must survive a save.
pub const SEED_DOC: &str = r##"{
  "version": 2,
  "pipeline": {
    "name": "release",
    "stages": [
      { "label": "Development", "value": "dev", "badgeClass": "badge-secondary", "background": "#6b7280" },
      { "label": "QA", "value": "qa", "badgeClass": "badge-info", "background": "#3b82f6" }
    ],
    "notify": ["ops@example.com"]
  },
  "owners": ["platform"]
}
"##;

pub struct DevhostGuard {
    pub base_url: String,
    pub token: String,
    pub data_dir: tempfile::TempDir,
    child: Child,
}

impl Drop for DevhostGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl DevhostGuard {
    #[allow(dead_code)]
    pub fn contents_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}/contents/{}", self.base_url, OWNER, REPO, path)
    }

    #[allow(dead_code)]
    pub fn state_dir(&self) -> PathBuf {
        self.data_dir.path().join("state")
    }
}

/// Starts the dev host serving [`SEED_DOC`] at `acme/deploy/pipeline-config.json`.
pub fn spawn_devhost() -> Result<DevhostGuard> {
    let data_dir = tempfile::tempdir().context("create devhost tempdir")?;
    let token = "ghp_devhosttoken".to_string();

    let seed_file = data_dir.path().join("seed.json");
    std::fs::write(&seed_file, SEED_DOC).context("write seed file")?;
    let seed = format!("{}/{}/{}={}", OWNER, REPO, FILE, seed_file.display());

    let addr_file = data_dir.path().join("addr.txt");

    let child = Command::new(env!("CARGO_BIN_EXE_stageboard-devhost"))
        .args([
            "--addr",
            "127.0.0.1:0",
            "--addr-file",
            addr_file.to_str().unwrap(),
            "--token",
            &token,
            "--seed",
            &seed,
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("spawn stageboard-devhost")?;

    // Kill the child if startup stalls.
    let mut guard = DevhostGuard {
        base_url: String::new(),
        token,
        data_dir,
        child,
    };
    let deadline = Instant::now() + STARTUP_TIMEOUT;
    guard.base_url = bound_url(&addr_file, deadline)?;
    healthy(&guard.base_url, deadline)?;
    Ok(guard)
}

const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

fn bound_url(addr_file: &Path, deadline: Instant) -> Result<String> {
    while Instant::now() < deadline {
        let addr = std::fs::read_to_string(addr_file).unwrap_or_default();
        if !addr.trim().is_empty() {
            return Ok(format!("http://{}", addr.trim()));
        }
        thread::sleep(Duration::from_millis(10));
    }
    anyhow::bail!("devhost never wrote {}", addr_file.display())
}

fn healthy(base_url: &str, deadline: Instant) -> Result<()> {
    let client = reqwest::blocking::Client::new();
    let url = format!("{base_url}/healthz");
    while Instant::now() < deadline {
        if client.get(&url).send().is_ok_and(|r| r.status().is_success()) {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(50));
    }
    anyhow::bail!("devhost at {base_url} never answered /healthz")
}

#[allow(dead_code)]
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
