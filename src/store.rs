use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{EditorConfig, EditorState, RememberedRepo};
use crate::obfuscate::{deobfuscate, now_millis, obfuscate};

pub const STORE_DIR: &str = ".stageboard";

/// The on-disk state directory: `config.json` (editor settings) and
/// `state.json` (remembered repository coordinates).
#[derive(Clone, Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn default_dir(cwd: &Path) -> PathBuf {
        cwd.join(STORE_DIR)
    }

    /// Opens `root`, creating it with default files if it does not exist.
    pub fn open_or_init(root: &Path) -> Result<Self> {
        fs::create_dir_all(root).with_context(|| format!("create {}", root.display()))?;
        let store = Self {
            root: root.to_path_buf(),
        };
        if !store.config_path().exists() {
            store.write_config(&EditorConfig::default())?;
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join("stageboard.log")
    }

    fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    fn state_path(&self) -> PathBuf {
        self.root.join("state.json")
    }

    pub fn read_config(&self) -> Result<EditorConfig> {
        let bytes = fs::read(self.config_path()).context("read config.json")?;
        let cfg: EditorConfig = serde_json::from_slice(&bytes).context("parse config.json")?;
        if cfg.version != 1 {
            anyhow::bail!("unsupported config version {}", cfg.version);
        }
        Ok(cfg)
    }

    pub fn write_config(&self, cfg: &EditorConfig) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(cfg).context("serialize config")?;
        write_atomic(&self.config_path(), &bytes).context("write config.json")?;
        Ok(())
    }

    pub fn read_state(&self) -> Result<EditorState> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(EditorState::default());
        }
        let bytes = fs::read(&path).context("read state.json")?;
        let st: EditorState = serde_json::from_slice(&bytes).context("parse state.json")?;
        Ok(st)
    }

    pub fn write_state(&self, st: &EditorState) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(st).context("serialize state")?;
        write_atomic(&self.state_path(), &bytes).context("write state.json")?;
        Ok(())
    }

    /// Stores owner and repository under reversible obfuscation. The
    /// credential is never passed here.
    pub fn remember_repo(&self, owner: &str, repo: &str) -> Result<()> {
        let plain = serde_json::to_string(&RememberedRepo {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
        .context("serialize remembered repo")?;
        let mut st = self.read_state()?;
        if st.version != 1 {
            anyhow::bail!("unsupported state version {}", st.version);
        }
        st.secure_repo_config = Some(obfuscate(&plain, now_millis()));
        self.write_state(&st)
    }

    /// Coordinates saved by [`remember_repo`](Self::remember_repo). A value
    /// that no longer decodes is dropped from disk.
    pub fn recall_repo(&self) -> Result<Option<RememberedRepo>> {
        let st = self.read_state()?;
        let Some(saved) = st.secure_repo_config.as_deref() else {
            return Ok(None);
        };
        match serde_json::from_str::<RememberedRepo>(&deobfuscate(saved)) {
            Ok(repo) => Ok(Some(repo)),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable remembered repository");
                self.forget()?;
                Ok(None)
            }
        }
    }

    /// Removes everything this tool persisted about the user's repositories.
    pub fn forget(&self) -> Result<()> {
        let path = self.state_path();
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
