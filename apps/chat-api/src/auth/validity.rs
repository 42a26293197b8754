//! Restart-aware session validity.
//!
//! A transport session can outlive the process that issued its login, while
//! the identity table is wiped on every start. A login therefore only counts
//! if it happened during the current process incarnation.

use chrono::{DateTime, Utc};

/// Decides whether a session's recorded login is still authenticated.
///
/// The watermark is fixed at construction; build a new value to model a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionValidity {
    started_at: DateTime<Utc>,
}

impl SessionValidity {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    /// The process start watermark.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_valid(&self, login_time: Option<DateTime<Utc>>) -> bool {
        is_valid(login_time, self.started_at)
    }
}

/// `false` when the session never logged in or logged in before `process_start`.
pub fn is_valid(login_time: Option<DateTime<Utc>>, process_start: DateTime<Utc>) -> bool {
    matches!(login_time, Some(at) if at >= process_start)
}
