//! Full-screen stage editor.
//!
//! A login form collects the token and repository coordinates; once the file
//! is loaded the editor shows the stage rows next to a live preview. Network
//! calls run on a worker thread so the expiry check keeps ticking while a
//! request is outstanding.

mod app;
mod input;

pub(crate) fn run(opts: crate::tui::TuiRunOptions) -> anyhow::Result<()> {
    app::run(opts)
}
