//! Load → edit → save orchestration with optimistic concurrency.
//!
//! The controller owns the loaded document and its revision token. Network
//! work is split into `begin_*` (take a ticket, mark the operation in
//! flight), the I/O itself (`ticket.execute`, possibly on another thread) and
//! `finish_*` (apply the result). A clear in between bumps the epoch, and a
//! result carrying an older epoch is dropped without touching state.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::error::{Result, SyncError};
use crate::model::{PipelineConfig, RepoCoordinates, RevisionToken, StageRow, collect};
use crate::remote::{ConfigStore, FetchedFile, commit_message};
use crate::session::{Clock, ExpiryReason, Session, SessionLimits, credential_looks_valid};

mod tickets;
pub use self::tickets::{LoadTicket, SaveTicket};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    Unauthenticated,
    Loading,
    Editing,
    Saving,
    Error,
    Locked,
}

/// Result of applying a finished network operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    Applied(T),
    /// The session was cleared while the request was in flight.
    Discarded,
}

pub struct SyncController {
    clock: Arc<dyn Clock>,
    limits: SessionLimits,
    session: Option<Session>,
    state: SyncState,
    config: Option<PipelineConfig>,
    revision: Option<RevisionToken>,
    in_flight: bool,
    epoch: u64,
    last_error: Option<String>,
}

impl SyncController {
    pub fn new(clock: Arc<dyn Clock>, limits: SessionLimits) -> Self {
        Self {
            clock,
            limits,
            session: None,
            state: SyncState::Unauthenticated,
            config: None,
            revision: None,
            in_flight: false,
            epoch: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn config(&self) -> Option<&PipelineConfig> {
        self.config.as_ref()
    }

    pub fn revision(&self) -> Option<&RevisionToken> {
        self.revision.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn coords(&self) -> Option<&RepoCoordinates> {
        self.session.as_ref().map(Session::coords)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Time left in the session, if there is one.
    pub fn remaining(&self) -> Option<std::time::Duration> {
        let now = self.clock.now();
        self.session.as_ref().map(|s| s.remaining(now))
    }

    /// Starts a session. Any previous session and loaded document are dropped.
    pub fn authenticate(&mut self, credential: &str, coords: RepoCoordinates) -> Result<()> {
        let credential = credential.trim();
        let coords = RepoCoordinates {
            owner: coords.owner.trim().to_string(),
            repo: coords.repo.trim().to_string(),
            branch: coords.branch.trim().to_string(),
            path: coords.path.trim().to_string(),
        };
        if credential.is_empty() {
            return Err(SyncError::Validation("an access token is required".to_string()));
        }
        coords.validate()?;
        if !credential_looks_valid(credential) {
            tracing::warn!("token does not start with `ghp_` or `github_pat_`; continuing anyway");
        }

        self.clear(SyncState::Unauthenticated);
        tracing::info!(repo = %coords.slug(), branch = %coords.branch, path = %coords.path, "session started");
        self.session = Some(Session::start(
            credential.to_string(),
            coords,
            self.limits,
            self.clock.now(),
        ));
        Ok(())
    }

    /// Records user activity.
    pub fn touch(&mut self) {
        let now = self.clock.now();
        if let Some(session) = self.session.as_mut() {
            session.touch(now);
        }
    }

    /// Periodic expiry check. On expiry everything is cleared and the state
    /// becomes `Locked`.
    pub fn tick(&mut self) -> Option<ExpiryReason> {
        let now = self.clock.now();
        let reason = self.session.as_ref()?.expiry(now)?;
        tracing::warn!(?reason, in_flight = self.in_flight, "session expired");
        self.clear(SyncState::Locked);
        self.last_error = Some(reason.message().to_string());
        Some(reason)
    }

    /// `Locked` → `Unauthenticated`, once the user has seen the lock notice.
    pub fn unlock(&mut self) {
        if self.state == SyncState::Locked {
            self.state = SyncState::Unauthenticated;
        }
    }

    pub fn logout(&mut self) {
        tracing::info!("logout");
        self.clear(SyncState::Unauthenticated);
    }

    /// `Error` → `Editing`, once the user has seen the failure.
    pub fn acknowledge_error(&mut self) {
        if self.state == SyncState::Error {
            self.state = SyncState::Editing;
        }
    }

    pub fn begin_load(&mut self) -> Result<LoadTicket> {
        self.ensure_live()?;
        let session = self.session.as_ref().ok_or(SyncError::NotAuthenticated)?;
        let ticket = LoadTicket {
            epoch: self.epoch,
            coords: session.coords().clone(),
            credential: session.credential().to_string(),
        };
        self.in_flight = true;
        self.state = SyncState::Loading;
        Ok(ticket)
    }

    /// Applies a fetch result. On success returns the rows to render.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<FetchedFile>,
    ) -> Result<Outcome<Vec<StageRow>>> {
        if ticket.epoch != self.epoch {
            tracing::debug!("discarding load response for a cleared session");
            return Ok(Outcome::Discarded);
        }
        self.in_flight = false;

        match result {
            Ok(file) => {
                let rows = file.content.rows();
                tracing::info!(sha = %file.revision, stages = rows.len(), "configuration loaded");
                self.config = Some(file.content);
                self.revision = Some(file.revision);
                self.state = SyncState::Editing;
                self.last_error = None;
                Ok(Outcome::Applied(rows))
            }
            Err(err) => {
                self.fail(&err);
                if self.config.is_some() {
                    self.state = SyncState::Error;
                } else if self.session.is_some() {
                    // Nothing was ever loaded: back to sign-in without a credential.
                    self.clear(SyncState::Unauthenticated);
                    self.last_error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Fetches the configured file and returns the rows to render.
    pub fn load(&mut self, store: &dyn ConfigStore) -> Result<Vec<StageRow>> {
        let ticket = self.begin_load()?;
        let result = ticket.execute(store);
        match self.finish_load(ticket, result)? {
            Outcome::Applied(rows) => Ok(rows),
            Outcome::Discarded => Err(SyncError::NotAuthenticated),
        }
    }

    /// Prepares a conditional write of `rows`. Fails without side effects
    /// when there is nothing valid to save.
    pub fn begin_save(&mut self, rows: &[StageRow]) -> Result<SaveTicket> {
        self.ensure_live()?;
        let session = self.session.as_ref().ok_or(SyncError::NotAuthenticated)?;
        let (Some(config), Some(revision)) = (self.config.as_ref(), self.revision.as_ref()) else {
            return Err(SyncError::Validation(
                "load the configuration before saving".to_string(),
            ));
        };

        let stages = collect(rows);
        if stages.is_empty() {
            return Err(SyncError::EmptyStageList);
        }
        let next = config.with_stages(&stages)?;
        let content = next.to_pretty_json()?;

        let ticket = SaveTicket {
            epoch: self.epoch,
            coords: session.coords().clone(),
            credential: session.credential().to_string(),
            content,
            revision: revision.clone(),
            message: commit_message(OffsetDateTime::now_utc()),
            next,
        };
        self.in_flight = true;
        self.state = SyncState::Saving;
        Ok(ticket)
    }

    /// Applies a write result. Only a success changes the held document and
    /// revision.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<RevisionToken>,
    ) -> Result<Outcome<RevisionToken>> {
        if ticket.epoch != self.epoch {
            tracing::debug!("discarding save response for a cleared session");
            return Ok(Outcome::Discarded);
        }
        self.in_flight = false;

        match result {
            Ok(revision) => {
                tracing::info!(old = %ticket.revision, new = %revision, "configuration saved");
                self.config = Some(ticket.next);
                self.revision = Some(revision.clone());
                self.state = SyncState::Editing;
                self.last_error = None;
                Ok(Outcome::Applied(revision))
            }
            Err(err) => {
                self.fail(&err);
                if self.state != SyncState::Unauthenticated {
                    self.state = SyncState::Error;
                }
                Err(err)
            }
        }
    }

    /// Writes `rows` back with the held revision and returns the new one.
    pub fn save(&mut self, store: &dyn ConfigStore, rows: &[StageRow]) -> Result<RevisionToken> {
        let ticket = self.begin_save(rows)?;
        let result = ticket.execute(store);
        match self.finish_save(ticket, result)? {
            Outcome::Applied(revision) => Ok(revision),
            Outcome::Discarded => Err(SyncError::NotAuthenticated),
        }
    }

    /// Requires an unexpired session and no operation in flight.
    fn ensure_live(&mut self) -> Result<()> {
        self.tick();
        if self.session.is_none() {
            return Err(SyncError::NotAuthenticated);
        }
        if self.in_flight {
            return Err(SyncError::Busy);
        }
        Ok(())
    }

    /// Records a failed operation. Auth failures invalidate the credential.
    fn fail(&mut self, err: &SyncError) {
        tracing::warn!(error = %err, "remote operation failed");
        if err.is_auth() {
            self.clear(SyncState::Unauthenticated);
        }
        self.last_error = Some(err.to_string());
    }

    fn clear(&mut self, next: SyncState) {
        self.session = None;
        self.config = None;
        self.revision = None;
        self.in_flight = false;
        self.epoch += 1;
        self.last_error = None;
        self.state = next;
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
