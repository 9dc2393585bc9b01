use std::path::PathBuf;

use anyhow::Result;

/// Startup values for the interactive editor. Anything left `None` falls back
/// to the remembered repository and `config.json`.
#[derive(Clone, Debug, Default)]
pub struct TuiRunOptions {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub path: Option<String>,
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub state_dir: Option<PathBuf>,
}

pub fn run(opts: TuiRunOptions) -> Result<()> {
    crate::tui_shell::run(opts)
}
