use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use stageboard::model::{EditorConfig, PipelineConfig, RepoCoordinates, StageRow, collect};
use stageboard::preview::{contrast_color, to_preview};
use stageboard::remote::RemoteClient;
use stageboard::session::MonotonicClock;
use stageboard::store::LocalStore;
use stageboard::sync::SyncController;

use crate::{Commands, TargetArgs};

pub(crate) fn handle_command(target: &TargetArgs, command: Commands) -> Result<()> {
    let store = open_store(target)?;

    match command {
        Commands::Edit => anyhow::bail!("`edit` runs the interactive editor"),
        Commands::Forget => {
            store.forget()?;
            println!("Forgot remembered repository");
        }
        Commands::Show { json } => {
            let mut session = Connected::open(target, &store)?;
            let rows = session.load()?;
            if json {
                let stages = collect(&rows);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "repo": session.coords.slug(),
                        "branch": session.coords.branch,
                        "path": session.coords.path,
                        "sha": session.controller.revision().map(|r| r.as_str()),
                        "stages": stages,
                    }))
                    .context("serialize stages json")?
                );
            } else {
                println!(
                    "{} {}@{} (sha {})",
                    session.coords.slug(),
                    session.coords.path,
                    session.coords.branch,
                    session
                        .controller
                        .revision()
                        .map(|r| r.as_str())
                        .unwrap_or("?")
                );
                for (i, row) in rows.iter().enumerate() {
                    println!(
                        "{:>2}. {:<20} {:<16} {:<18} {}",
                        i + 1,
                        row.label,
                        row.value,
                        row.badge_class,
                        row.background
                    );
                }
            }
        }
        Commands::Preview { json } => {
            let mut session = Connected::open(target, &store)?;
            let rows = session.load()?;
            let preview = to_preview(&collect(&rows));
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&preview).context("serialize preview json")?
                );
            } else {
                println!("Dropdown:");
                for opt in &preview.dropdown {
                    if opt.disabled {
                        println!("  ({})", opt.text);
                    } else {
                        println!(
                            "  {} [{}] bg={} fg={}",
                            opt.text,
                            opt.value,
                            opt.background.as_deref().unwrap_or_default(),
                            opt.color.as_deref().unwrap_or_default()
                        );
                    }
                }
                println!("Badges:");
                for badge in &preview.badges {
                    println!(
                        "  {} class=\"{}\" bg={} fg={}",
                        badge.text, badge.class, badge.background, badge.color
                    );
                }
            }
        }
        Commands::Apply { stages_file, yes } => {
            let rows = read_stage_file(&stages_file)?;
            let mut session = Connected::open(target, &store)?;
            session.load()?;

            let stages = collect(&rows);
            if !yes {
                println!(
                    "Would write {} stage(s) to {}:{}",
                    stages.len(),
                    session.coords.slug(),
                    session.coords.path
                );
                for s in &stages {
                    println!(
                        "  {} [{}] {} {} (text {})",
                        s.label,
                        s.value,
                        s.badge_class,
                        s.background,
                        contrast_color(&s.background)
                    );
                }
                println!("Re-run with --yes to commit.");
                return Ok(());
            }

            let rev = session.save(&rows)?;
            println!(
                "Saved {} stage(s) to {}:{} (sha {})",
                stages.len(),
                session.coords.slug(),
                session.coords.path,
                rev
            );
        }
    }

    Ok(())
}

fn open_store(target: &TargetArgs) -> Result<LocalStore> {
    let dir = match &target.state_dir {
        Some(dir) => dir.clone(),
        None => LocalStore::default_dir(&std::env::current_dir().context("get current dir")?),
    };
    LocalStore::open_or_init(&dir)
}

/// Coordinates from flags, falling back to the remembered repository and the
/// configured defaults.
fn resolve_coords(
    target: &TargetArgs,
    store: &LocalStore,
    cfg: &EditorConfig,
) -> Result<RepoCoordinates> {
    let remembered = store.recall_repo()?;
    let owner = target
        .owner
        .clone()
        .or_else(|| remembered.as_ref().map(|r| r.owner.clone()))
        .context("no repository owner given (use --owner)")?;
    let repo = target
        .repo
        .clone()
        .or_else(|| remembered.as_ref().map(|r| r.repo.clone()))
        .context("no repository name given (use --repo)")?;
    Ok(RepoCoordinates::new(owner, repo)
        .with_branch(target.branch.as_deref().unwrap_or(cfg.branch()))
        .with_path(target.path.as_deref().unwrap_or(cfg.path())))
}

/// Accepts a bare JSON array of stages or a whole pipeline document.
fn read_stage_file(path: &Path) -> Result<Vec<StageRow>> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))?;
    if let Some(items) = value.as_array() {
        return Ok(items.iter().map(StageRow::from_json).collect());
    }
    let doc = PipelineConfig::from_value(value)
        .with_context(|| format!("{} is neither a stage array nor a pipeline document", path.display()))?;
    Ok(doc.rows())
}

/// One authenticated, non-interactive session.
struct Connected<'a> {
    store: &'a LocalStore,
    coords: RepoCoordinates,
    client: RemoteClient,
    controller: SyncController,
}

impl<'a> Connected<'a> {
    fn open(target: &TargetArgs, store: &'a LocalStore) -> Result<Self> {
        let cfg = store.read_config()?;
        let coords = resolve_coords(target, store, &cfg)?;
        let token = target
            .token
            .as_deref()
            .context("no access token given (use --token or STAGEBOARD_TOKEN)")?;

        let mut controller = SyncController::new(Arc::new(MonotonicClock), cfg.limits());
        controller.authenticate(token, coords.clone())?;
        store.remember_repo(&coords.owner, &coords.repo)?;

        let api_url = target.api_url.as_deref().unwrap_or(cfg.api_base_url());
        let client = RemoteClient::new(api_url)?;
        Ok(Self {
            store,
            coords,
            client,
            controller,
        })
    }

    fn load(&mut self) -> Result<Vec<StageRow>> {
        let res = self.controller.load(&self.client);
        self.forget_on_auth_failure(res)
            .with_context(|| format!("load {}:{}", self.coords.slug(), self.coords.path))
    }

    fn save(&mut self, rows: &[StageRow]) -> Result<stageboard::model::RevisionToken> {
        let res = self.controller.save(&self.client, rows);
        self.forget_on_auth_failure(res)
            .with_context(|| format!("save {}:{}", self.coords.slug(), self.coords.path))
    }

    fn forget_on_auth_failure<T>(&self, res: stageboard::error::Result<T>) -> Result<T> {
        match res {
            Err(err) if err.is_auth() => {
                self.store.forget()?;
                Err(err.into())
            }
            other => Ok(other?),
        }
    }
}
