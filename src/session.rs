//! Credential and target coordinates for one editing session.

use std::time::{Duration, Instant};

use crate::model::RepoCoordinates;

mod clock;
pub use self::clock::{Clock, ManualClock, MonotonicClock};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionLimits {
    /// Absolute lifetime from `start`.
    pub session_duration: Duration,
    /// Maximum gap between user inputs.
    pub inactivity_timeout: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            session_duration: Duration::from_secs(30 * 60),
            inactivity_timeout: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpiryReason {
    SessionExpired,
    Inactive,
}

impl ExpiryReason {
    pub fn message(self) -> &'static str {
        match self {
            ExpiryReason::SessionExpired => "session expired; please re-authenticate",
            ExpiryReason::Inactive => "session locked due to inactivity",
        }
    }
}

pub struct Session {
    credential: String,
    coords: RepoCoordinates,
    limits: SessionLimits,
    started_at: Instant,
    last_activity_at: Instant,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credential", &"<redacted>")
            .field("coords", &self.coords)
            .field("limits", &self.limits)
            .field("started_at", &self.started_at)
            .field("last_activity_at", &self.last_activity_at)
            .finish()
    }
}

impl Session {
    pub fn start(
        credential: String,
        coords: RepoCoordinates,
        limits: SessionLimits,
        now: Instant,
    ) -> Self {
        Self {
            credential,
            coords,
            limits,
            started_at: now,
            last_activity_at: now,
        }
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn coords(&self) -> &RepoCoordinates {
        &self.coords
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_activity_at = now;
    }

    /// Which limit has run out, if any. The absolute limit wins when both have.
    pub fn expiry(&self, now: Instant) -> Option<ExpiryReason> {
        if now.saturating_duration_since(self.started_at) >= self.limits.session_duration {
            return Some(ExpiryReason::SessionExpired);
        }
        if now.saturating_duration_since(self.last_activity_at) >= self.limits.inactivity_timeout {
            return Some(ExpiryReason::Inactive);
        }
        None
    }

    pub fn is_valid(&self, now: Instant) -> bool {
        self.expiry(now).is_none()
    }

    /// Time left before the absolute limit.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.limits
            .session_duration
            .saturating_sub(now.saturating_duration_since(self.started_at))
    }
}

/// Hosting tokens normally start with `ghp_` or `github_pat_`. Anything else
/// is accepted but worth a warning.
pub fn credential_looks_valid(credential: &str) -> bool {
    credential.starts_with("ghp_") || credential.starts_with("github_pat_")
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
