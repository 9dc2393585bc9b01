use std::sync::Mutex;

use super::event_loop::handle_key;
use super::*;
use crate::model::{PipelineConfig, RevisionToken};
use crate::remote::FetchedFile;
use crate::session::ManualClock;

const DOC: &str = r##"{"version":3,"pipeline":{"name":"release","stages":[
    {"label":"Dev","value":"dev","badgeClass":"badge-secondary","background":"#6b7280"},
    {"label":"QA","value":"qa","badgeClass":"badge-info","background":"#3b82f6"}
]}}"##;

struct FakeRemote {
    doc: Mutex<(String, String)>,
    writes: Mutex<Vec<String>>,
    fail_status: Mutex<Option<u16>>,
}

impl FakeRemote {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            doc: Mutex::new((DOC.to_string(), "sha-0".to_string())),
            writes: Mutex::new(Vec::new()),
            fail_status: Mutex::new(None),
        })
    }

    fn written(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl ConfigStore for FakeRemote {
    fn fetch_file(
        &self,
        _coords: &RepoCoordinates,
        _credential: &str,
    ) -> crate::error::Result<FetchedFile> {
        if let Some(status) = *self.fail_status.lock().unwrap() {
            return Err(SyncError::Auth { status });
        }
        let (content, sha) = self.doc.lock().unwrap().clone();
        Ok(FetchedFile {
            content: PipelineConfig::parse(&content)?,
            revision: RevisionToken(sha),
        })
    }

    fn write_file(
        &self,
        _coords: &RepoCoordinates,
        content: &str,
        revision: &RevisionToken,
        _credential: &str,
        _message: &str,
    ) -> crate::error::Result<RevisionToken> {
        let mut doc = self.doc.lock().unwrap();
        if doc.1 != revision.as_str() {
            return Err(SyncError::Conflict {
                sent: revision.to_string(),
            });
        }
        let mut writes = self.writes.lock().unwrap();
        writes.push(content.to_string());
        *doc = (content.to_string(), format!("sha-{}", writes.len()));
        Ok(RevisionToken(doc.1.clone()))
    }
}

struct Harness {
    app: App,
    remote: Arc<FakeRemote>,
    clock: ManualClock,
    _dir: tempfile::TempDir,
}

fn harness(opts: TuiRunOptions) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let local = LocalStore::open_or_init(dir.path()).unwrap();
    harness_with(opts, local, dir)
}

fn harness_with(opts: TuiRunOptions, local: LocalStore, dir: tempfile::TempDir) -> Harness {
    let remote = FakeRemote::new();
    let clock = ManualClock::new();
    let shared: SharedStore = remote.clone();
    let app = App::new(
        &opts,
        local,
        &EditorConfig::default(),
        shared,
        Arc::new(clock.clone()),
    );
    Harness {
        app,
        remote,
        clock,
        _dir: dir,
    }
}

fn connect_opts() -> TuiRunOptions {
    TuiRunOptions {
        owner: Some("acme".to_string()),
        repo: Some("deploy".to_string()),
        token: Some("ghp_example".to_string()),
        ..Default::default()
    }
}

fn settle(app: &mut App) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !app.pending.is_empty() && Instant::now() < deadline {
        app.poll_workers();
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(app.pending.is_empty(), "worker did not reply");
}

fn press(app: &mut App, code: KeyCode) {
    handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn connected() -> Harness {
    let mut h = harness(connect_opts());
    h.app.submit_login();
    settle(&mut h.app);
    assert_eq!(h.app.screen(), Screen::Editor);
    h
}

#[test]
fn login_form_prefills_from_flags_and_defaults() {
    let h = harness(TuiRunOptions {
        owner: Some("acme".to_string()),
        ..Default::default()
    });
    let login = &h.app.login;
    assert_eq!(login.get(LoginField::Owner).buf, "acme");
    assert_eq!(login.get(LoginField::Branch).buf, "main");
    assert_eq!(login.get(LoginField::Path).buf, "pipeline-config.json");
    // Focus lands on the first empty field.
    assert_eq!(login.focused(), LoginField::Token);
    assert_eq!(h.app.screen(), Screen::Login);
}

#[test]
fn login_form_prefills_remembered_repository() {
    let dir = tempfile::tempdir().unwrap();
    let local = LocalStore::open_or_init(dir.path()).unwrap();
    local.remember_repo("acme", "deploy").unwrap();

    let h = harness_with(TuiRunOptions::default(), local, dir);
    assert_eq!(h.app.login.get(LoginField::Owner).buf, "acme");
    assert_eq!(h.app.login.get(LoginField::Repo).buf, "deploy");
    assert!(h.app.login.get(LoginField::Token).buf.is_empty());
}

#[test]
fn empty_token_is_rejected_before_any_request() {
    let mut h = harness(TuiRunOptions {
        token: Some("   ".to_string()),
        ..connect_opts()
    });
    h.app.submit_login();

    assert!(h.app.pending.is_empty());
    assert_eq!(h.app.screen(), Screen::Login);
    let status = h.app.status.as_ref().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
}

#[test]
fn connecting_loads_rows_and_remembers_repository() {
    let h = connected();
    assert_eq!(h.app.rows.len(), 2);
    assert_eq!(h.app.rows.as_slice()[1].label, "QA");
    assert_eq!(h.app.controller.revision().unwrap().as_str(), "sha-0");
    assert!(h.app.login.get(LoginField::Token).buf.is_empty());

    let remembered = h.app.local.recall_repo().unwrap().unwrap();
    assert_eq!(remembered.owner, "acme");
    assert_eq!(remembered.repo, "deploy");
}

#[test]
fn keys_edit_reorder_and_recolour_rows() {
    let mut h = connected();

    press(&mut h.app, KeyCode::Char('a'));
    assert_eq!(h.app.selected, 2);
    assert!(h.app.editing.is_some());
    type_text(&mut h.app, "Prod");
    press(&mut h.app, KeyCode::Tab);
    type_text(&mut h.app, "prod");
    press(&mut h.app, KeyCode::Enter);
    assert!(h.app.editing.is_none());

    press(&mut h.app, KeyCode::Char('c'));
    let row = &h.app.rows.as_slice()[2];
    assert_eq!((row.label.as_str(), row.value.as_str()), ("Prod", "prod"));
    // Blank rows start on the grey swatch, the last in the palette.
    assert_eq!(row.background, PALETTE[0]);

    press(&mut h.app, KeyCode::Char('K'));
    assert_eq!(h.app.selected, 1);
    let labels: Vec<_> = h.app.rows.as_slice().iter().map(|r| r.label.clone()).collect();
    assert_eq!(labels, ["Dev", "Prod", "QA"]);
}

#[test]
fn escape_cancels_an_edit() {
    let mut h = connected();
    press(&mut h.app, KeyCode::Enter);
    press(&mut h.app, KeyCode::Backspace);
    press(&mut h.app, KeyCode::Esc);
    assert_eq!(h.app.rows.as_slice()[0].label, "Dev");
    assert!(!h.app.quit);
}

#[test]
fn delete_asks_first() {
    let mut h = connected();
    press(&mut h.app, KeyCode::Char('d'));
    assert_eq!(h.app.prompt, Some(Prompt::Delete(0)));
    press(&mut h.app, KeyCode::Char('n'));
    assert_eq!(h.app.rows.len(), 2);

    press(&mut h.app, KeyCode::Char('d'));
    press(&mut h.app, KeyCode::Char('y'));
    assert_eq!(h.app.rows.len(), 1);
    assert_eq!(h.app.rows.as_slice()[0].label, "QA");
}

#[test]
fn confirmed_save_writes_only_the_stage_list() {
    let mut h = connected();
    press(&mut h.app, KeyCode::Char('a'));
    press(&mut h.app, KeyCode::Esc);

    press(&mut h.app, KeyCode::Char('s'));
    assert_eq!(h.app.prompt, Some(Prompt::Save));
    press(&mut h.app, KeyCode::Enter);
    settle(&mut h.app);

    let written = h.remote.written();
    assert_eq!(written.len(), 1);
    let doc: serde_json::Value = serde_json::from_str(&written[0]).unwrap();
    assert_eq!(doc["version"], 3);
    assert_eq!(doc["pipeline"]["name"], "release");
    // The blank row is not persisted.
    assert_eq!(doc["pipeline"]["stages"].as_array().unwrap().len(), 2);
    assert_eq!(h.app.controller.revision().unwrap().as_str(), "sha-1");
    assert_eq!(h.app.status.as_ref().unwrap().kind, StatusKind::Success);
}

#[test]
fn saving_without_complete_rows_sends_nothing() {
    let mut h = connected();
    press(&mut h.app, KeyCode::Char('d'));
    press(&mut h.app, KeyCode::Char('y'));
    press(&mut h.app, KeyCode::Char('d'));
    press(&mut h.app, KeyCode::Char('y'));
    press(&mut h.app, KeyCode::Char('s'));
    press(&mut h.app, KeyCode::Char('y'));

    assert!(h.app.pending.is_empty());
    assert!(h.remote.written().is_empty());
    let status = h.app.status.as_ref().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.text.contains("at least one stage"));
    assert_eq!(h.app.controller.revision().unwrap().as_str(), "sha-0");
}

#[test]
fn inactivity_locks_before_the_key_counts_as_activity() {
    let mut h = connected();
    h.clock.advance(Duration::from_secs(15 * 60));
    press(&mut h.app, KeyCode::Char('j'));

    assert_eq!(h.app.screen(), Screen::Login);
    assert!(h.app.rows.is_empty());
    assert!(h.app.controller.session().is_none());
    let status = h.app.status.as_ref().unwrap();
    assert!(status.text.contains("inactivity"));
    // Coordinates survive a lock; the token does not.
    assert_eq!(h.app.login.get(LoginField::Owner).buf, "acme");
    assert!(h.app.login.get(LoginField::Token).buf.is_empty());
    assert!(h.app.local.recall_repo().unwrap().is_some());
}

#[test]
fn activity_keeps_the_session_alive_until_the_absolute_limit() {
    let mut h = connected();
    for _ in 0..2 {
        h.clock.advance(Duration::from_secs(10 * 60));
        press(&mut h.app, KeyCode::Char('j'));
        assert_eq!(h.app.screen(), Screen::Editor);
    }
    h.clock.advance(Duration::from_secs(10 * 60));
    h.app.check_session();
    assert_eq!(h.app.screen(), Screen::Login);
    assert!(h.app.status.as_ref().unwrap().text.contains("expired"));
}

#[test]
fn reply_after_logout_is_discarded() {
    let mut h = harness(connect_opts());
    h.app.submit_login();
    assert_eq!(h.app.pending.len(), 1);

    h.app.logout();
    settle(&mut h.app);

    assert_eq!(h.app.screen(), Screen::Login);
    assert!(h.app.rows.is_empty());
    assert!(h.app.controller.config().is_none());
    assert!(h.app.local.recall_repo().unwrap().is_none());
}

#[test]
fn rejected_token_forgets_remembered_repository() {
    let mut h = harness(connect_opts());
    *h.remote.fail_status.lock().unwrap() = Some(401);
    h.app.submit_login();
    settle(&mut h.app);

    assert_eq!(h.app.screen(), Screen::Login);
    assert!(h.app.controller.session().is_none());
    assert!(h.app.local.recall_repo().unwrap().is_none());
    let status = h.app.status.as_ref().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.text.contains("401"));
}

#[test]
fn save_conflict_keeps_edits_and_revision() {
    let mut h = connected();
    *h.remote.doc.lock().unwrap() = (DOC.to_string(), "sha-elsewhere".to_string());

    press(&mut h.app, KeyCode::Char('s'));
    press(&mut h.app, KeyCode::Char('y'));
    settle(&mut h.app);

    assert!(h.remote.written().is_empty());
    assert_eq!(h.app.controller.state(), SyncState::Error);
    assert_eq!(h.app.controller.revision().unwrap().as_str(), "sha-0");
    assert_eq!(h.app.rows.len(), 2);
    assert_eq!(h.app.screen(), Screen::Editor);
}

#[test]
fn reload_asks_before_discarding_edits() {
    let mut h = connected();
    press(&mut h.app, KeyCode::Enter);
    type_text(&mut h.app, "-edited");
    press(&mut h.app, KeyCode::Enter);
    assert!(h.app.has_unsaved_edits());

    press(&mut h.app, KeyCode::Char('r'));
    assert_eq!(h.app.prompt, Some(Prompt::Reload));
    press(&mut h.app, KeyCode::Char('n'));
    settle(&mut h.app);
    assert_eq!(h.app.rows.as_slice()[0].label, "Dev-edited");

    press(&mut h.app, KeyCode::Char('r'));
    press(&mut h.app, KeyCode::Char('y'));
    settle(&mut h.app);
    assert_eq!(h.app.rows.as_slice()[0].label, "Dev");
    assert!(!h.app.has_unsaved_edits());
}

#[test]
fn reload_without_edits_goes_straight_to_the_remote() {
    let mut h = connected();
    *h.remote.doc.lock().unwrap() = (DOC.replace("\"QA\"", "\"Staging\""), "sha-9".to_string());

    press(&mut h.app, KeyCode::Char('r'));
    assert_eq!(h.app.prompt, None);
    settle(&mut h.app);
    assert_eq!(h.app.rows.as_slice()[1].label, "Staging");
    assert_eq!(h.app.controller.revision().unwrap().as_str(), "sha-9");
}

#[test]
fn unreadable_first_load_drops_the_session() {
    let mut h = harness(connect_opts());
    *h.remote.doc.lock().unwrap() = (r#"{"nope":1}"#.to_string(), "sha-0".to_string());
    h.app.submit_login();
    settle(&mut h.app);

    assert_eq!(h.app.screen(), Screen::Login);
    assert_eq!(h.app.controller.state(), SyncState::Unauthenticated);
    assert!(h.app.controller.session().is_none());
    assert!(h.app.controller.coords().is_none());
    assert_eq!(h.app.status.as_ref().unwrap().kind, StatusKind::Error);

    // No stale session left to lock later on the login screen.
    h.clock.advance(Duration::from_secs(15 * 60));
    h.app.check_session();
    let status = h.app.status.as_ref().unwrap();
    assert!(!status.text.contains("inactivity"), "{}", status.text);
}
