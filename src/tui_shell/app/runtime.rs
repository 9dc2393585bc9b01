use std::io::IsTerminal;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

use crate::remote::RemoteClient;
use crate::session::MonotonicClock;

use super::*;

pub(in crate::tui_shell) fn run(opts: TuiRunOptions) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("the stage editor requires an interactive terminal (TTY)");
    }

    let dir = match &opts.state_dir {
        Some(dir) => dir.clone(),
        None => LocalStore::default_dir(&std::env::current_dir().context("get current dir")?),
    };
    let local = LocalStore::open_or_init(&dir)?;
    crate::logging::init_file(&local.log_path())?;
    let cfg = local.read_config()?;

    let api_url = opts
        .api_url
        .as_deref()
        .unwrap_or_else(|| cfg.api_base_url());
    let client = RemoteClient::new(api_url).context("create http client")?;
    tracing::info!(api = %client.base_url(), "editor starting");

    let mut app = App::new(&opts, local, &cfg, Arc::new(client), Arc::new(MonotonicClock));
    if opts.token.is_some() && app.login.first_empty().is_none() {
        app.submit_login();
    }

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let res = event_loop::run_loop(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    tracing::info!("editor closed");
    res
}
