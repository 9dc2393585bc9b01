use std::io;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::error::SyncError;
use crate::model::{EditorConfig, PALETTE, RepoCoordinates, StageField, StageRows};
use crate::remote::ConfigStore;
use crate::session::Clock;
use crate::store::LocalStore;
use crate::sync::{Outcome, SyncController, SyncState};
use crate::tui::TuiRunOptions;

use super::input::Input;

mod editor;
mod event_loop;
mod login;
mod render;
mod runtime;
mod worker;

pub(super) use self::runtime::run;

pub(super) type SharedStore = Arc<dyn ConfigStore + Send + Sync>;

/// How often the expiry check runs while the editor is idle.
const CHECK_INTERVAL: Duration = Duration::from_secs(1);
/// Notifications disappear after this long.
const STATUS_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Screen {
    Login,
    Editor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum LoginField {
    Token,
    Owner,
    Repo,
    Branch,
    Path,
}

impl LoginField {
    pub(super) const ALL: [LoginField; 5] = [
        LoginField::Token,
        LoginField::Owner,
        LoginField::Repo,
        LoginField::Branch,
        LoginField::Path,
    ];

    pub(super) fn label(self) -> &'static str {
        match self {
            LoginField::Token => "Access token",
            LoginField::Owner => "Owner",
            LoginField::Repo => "Repository",
            LoginField::Branch => "Branch",
            LoginField::Path => "File path",
        }
    }

    pub(super) fn masked(self) -> bool {
        self == LoginField::Token
    }
}

#[derive(Debug, Default)]
pub(super) struct LoginForm {
    pub(super) inputs: [Input; 5],
    pub(super) focus: usize,
}

impl LoginForm {
    pub(super) fn get(&self, field: LoginField) -> &Input {
        &self.inputs[field as usize]
    }

    pub(super) fn get_mut(&mut self, field: LoginField) -> &mut Input {
        &mut self.inputs[field as usize]
    }

    pub(super) fn focused(&self) -> LoginField {
        LoginField::ALL[self.focus]
    }

    pub(super) fn first_empty(&self) -> Option<usize> {
        self.inputs.iter().position(|i| i.buf.trim().is_empty())
    }

    pub(super) fn next(&mut self) {
        self.focus = (self.focus + 1) % LoginField::ALL.len();
    }

    pub(super) fn prev(&mut self) {
        self.focus = (self.focus + LoginField::ALL.len() - 1) % LoginField::ALL.len();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Prompt {
    Save,
    Delete(usize),
    Reload,
    Logout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug)]
pub(super) struct Status {
    pub(super) kind: StatusKind,
    pub(super) text: String,
    pub(super) at: Instant,
}

pub(super) struct App {
    pub(super) controller: SyncController,
    pub(super) remote: SharedStore,
    pub(super) local: LocalStore,

    pub(super) login: LoginForm,

    pub(super) rows: StageRows,
    pub(super) selected: usize,
    pub(super) field: usize,
    pub(super) editing: Option<Input>,
    pub(super) prompt: Option<Prompt>,

    pub(super) status: Option<Status>,
    pub(super) pending: Vec<Receiver<worker::Reply>>,
    pub(super) last_check: Instant,
    pub(super) quit: bool,
}

impl App {
    pub(super) fn new(
        opts: &TuiRunOptions,
        local: LocalStore,
        cfg: &EditorConfig,
        remote: SharedStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let remembered = match local.recall_repo() {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(error = %format!("{:#}", err), "could not read remembered repository");
                None
            }
        };

        let mut login = LoginForm::default();
        let prefill = [
            (LoginField::Token, opts.token.clone()),
            (
                LoginField::Owner,
                opts.owner
                    .clone()
                    .or_else(|| remembered.as_ref().map(|r| r.owner.clone())),
            ),
            (
                LoginField::Repo,
                opts.repo
                    .clone()
                    .or_else(|| remembered.as_ref().map(|r| r.repo.clone())),
            ),
            (
                LoginField::Branch,
                Some(opts.branch.clone().unwrap_or_else(|| cfg.branch().to_string())),
            ),
            (
                LoginField::Path,
                Some(opts.path.clone().unwrap_or_else(|| cfg.path().to_string())),
            ),
        ];
        for (field, value) in prefill {
            if let Some(value) = value {
                login.get_mut(field).set(value);
            }
        }
        login.focus = login.first_empty().unwrap_or(0);

        Self {
            controller: SyncController::new(clock, cfg.limits()),
            remote,
            local,
            login,
            rows: StageRows::default(),
            selected: 0,
            field: 0,
            editing: None,
            prompt: None,
            status: None,
            pending: Vec::new(),
            last_check: Instant::now(),
            quit: false,
        }
    }

    pub(super) fn screen(&self) -> Screen {
        if self.controller.config().is_some() {
            Screen::Editor
        } else {
            Screen::Login
        }
    }

    pub(super) fn selected_field(&self) -> StageField {
        StageField::ALL[self.field]
    }

    pub(super) fn notify(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(Status {
            kind,
            text: text.into(),
            at: Instant::now(),
        });
    }

    /// Drops the notification once it has been shown long enough. Errors on
    /// the login screen stay until the next action.
    pub(super) fn expire_status(&mut self) {
        if let Some(status) = &self.status
            && status.at.elapsed() >= STATUS_TTL
            && !(status.kind == StatusKind::Error && self.screen() == Screen::Login)
        {
            self.status = None;
        }
    }

    pub(super) fn submit_login(&mut self) {
        let value = |f: LoginField| self.login.get(f).buf.clone();
        let token = value(LoginField::Token);
        let coords = RepoCoordinates::new(value(LoginField::Owner), value(LoginField::Repo))
            .with_branch(value(LoginField::Branch))
            .with_path(value(LoginField::Path));

        if let Err(err) = self.controller.authenticate(&token, coords) {
            self.notify(StatusKind::Error, err.to_string());
            return;
        }
        // The token now lives only in the session.
        self.login.get_mut(LoginField::Token).clear();

        if let Some(coords) = self.controller.coords()
            && let Err(err) = self.local.remember_repo(&coords.owner, &coords.repo)
        {
            tracing::warn!(error = %format!("{:#}", err), "could not remember repository");
        }
        self.start_load();
    }

    pub(super) fn start_load(&mut self) {
        match self.controller.begin_load() {
            Ok(ticket) => {
                self.notify(StatusKind::Info, "Loading configuration...");
                self.pending
                    .push(worker::spawn_load(Arc::clone(&self.remote), ticket));
            }
            Err(err) => self.report("Failed to load", err),
        }
    }

    /// Rows differ from the last loaded or saved document.
    pub(super) fn has_unsaved_edits(&self) -> bool {
        self.controller
            .config()
            .is_some_and(|config| config.rows() != self.rows.as_slice())
    }

    pub(super) fn start_save(&mut self) {
        match self.controller.begin_save(self.rows.as_slice()) {
            Ok(ticket) => {
                self.notify(StatusKind::Info, "Saving configuration...");
                self.pending
                    .push(worker::spawn_save(Arc::clone(&self.remote), ticket));
            }
            Err(SyncError::EmptyStageList) => {
                self.notify(StatusKind::Error, "Please add at least one stage before saving")
            }
            Err(err) => self.report("Failed to save", err),
        }
    }

    /// Applies any finished worker replies.
    pub(super) fn poll_workers(&mut self) {
        let mut replies = Vec::new();
        self.pending.retain(|rx| match rx.try_recv() {
            Ok(reply) => {
                replies.push(reply);
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => false,
        });
        for reply in replies {
            self.apply_reply(reply);
        }
    }

    fn apply_reply(&mut self, reply: worker::Reply) {
        match reply {
            worker::Reply::Loaded(ticket, result) => {
                let slug = format!("{}:{}", ticket.coords().slug(), ticket.coords().path);
                match self.controller.finish_load(ticket, result) {
                    Ok(Outcome::Applied(rows)) => {
                        let n = rows.len();
                        self.rows = StageRows::new(rows);
                        self.selected = 0;
                        self.field = 0;
                        self.editing = None;
                        self.prompt = None;
                        self.notify(
                            StatusKind::Success,
                            format!("Loaded {} stage(s) from {}", n, slug),
                        );
                    }
                    Ok(Outcome::Discarded) => {}
                    Err(err) => self.report("Failed to load", err),
                }
            }
            worker::Reply::Saved(ticket, result) => match self.controller.finish_save(ticket, result) {
                Ok(Outcome::Applied(rev)) => self.notify(
                    StatusKind::Success,
                    format!(
                        "Configuration saved (sha {}). Changes will be live within a few minutes.",
                        short_sha(rev.as_str())
                    ),
                ),
                Ok(Outcome::Discarded) => {}
                Err(err) => self.report("Failed to save", err),
            },
        }
    }

    /// Shows a failure. A rejected credential also forgets the remembered
    /// repository and drops back to the login form.
    fn report(&mut self, what: &str, err: SyncError) {
        if err.is_auth() {
            self.forget_repo();
            self.reset_editor();
        }
        self.notify(StatusKind::Error, format!("{}: {}", what, err));
    }

    /// Runs the expiry check at most once per interval.
    pub(super) fn maybe_check_session(&mut self) {
        if self.last_check.elapsed() >= CHECK_INTERVAL {
            self.last_check = Instant::now();
            self.check_session();
        }
    }

    pub(super) fn check_session(&mut self) {
        if let Some(reason) = self.controller.tick() {
            self.reset_editor();
            self.login.get_mut(LoginField::Token).clear();
            self.login.focus = 0;
            self.notify(StatusKind::Error, reason.message());
        }
    }

    pub(super) fn logout(&mut self) {
        self.controller.logout();
        self.forget_repo();
        self.reset_editor();
        for field in [LoginField::Token, LoginField::Owner, LoginField::Repo] {
            self.login.get_mut(field).clear();
        }
        self.login.focus = 0;
        self.notify(StatusKind::Info, "Logged out");
    }

    fn forget_repo(&mut self) {
        if let Err(err) = self.local.forget() {
            tracing::warn!(error = %format!("{:#}", err), "could not forget repository");
        }
    }

    fn reset_editor(&mut self) {
        self.rows = StageRows::default();
        self.selected = 0;
        self.field = 0;
        self.editing = None;
        self.prompt = None;
    }

    pub(super) fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub(super) fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub(super) fn field_prev(&mut self) {
        self.field = self.field.saturating_sub(1);
    }

    pub(super) fn field_next(&mut self) {
        self.field = (self.field + 1).min(StageField::ALL.len() - 1);
    }

    pub(super) fn add_row(&mut self) {
        self.selected = self.rows.push_blank();
        self.field = 0;
        self.begin_edit();
    }

    pub(super) fn delete_row(&mut self, idx: usize) {
        if self.rows.remove(idx).is_some() && self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
    }

    pub(super) fn move_up(&mut self) {
        if self.rows.move_up(self.selected) {
            self.selected -= 1;
        }
    }

    pub(super) fn move_down(&mut self) {
        if self.rows.move_down(self.selected) {
            self.selected += 1;
        }
    }

    /// Steps the selected row's background through the palette.
    pub(super) fn cycle_background(&mut self) {
        let Some(row) = self.rows.get_mut(self.selected) else {
            return;
        };
        let next = PALETTE
            .iter()
            .position(|c| c.eq_ignore_ascii_case(row.background.trim()))
            .map_or(0, |i| (i + 1) % PALETTE.len());
        row.background = PALETTE[next].to_string();
    }

    pub(super) fn begin_edit(&mut self) {
        let field = self.selected_field();
        if let Some(row) = self.rows.as_slice().get(self.selected) {
            self.editing = Some(Input::with_text(row.field(field)));
        }
    }

    pub(super) fn commit_edit(&mut self) {
        let field = self.selected_field();
        if let Some(input) = self.editing.take()
            && let Some(row) = self.rows.get_mut(self.selected)
        {
            *row.field_mut(field) = input.buf;
        }
    }

    pub(super) fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Time left in the session as `mm:ss`.
    pub(super) fn session_clock(&self) -> Option<(String, Duration)> {
        let remaining = self.controller.remaining()?;
        let secs = remaining.as_secs();
        Some((format!("{:02}:{:02}", secs / 60, secs % 60), remaining))
    }
}

pub(super) fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
#[path = "../tests/tui_shell/app_tests.rs"]
mod tests;
