use std::borrow::Cow;
use std::time::{Duration, Instant};

pub const IDLE_HINT: &str = "Press SPACEBAR or upload a photo to add your drawing";

/// User-visible capture status.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum Status {
    Idle,
    Processing,
    Scanning,
    Success(String),
    Error(String),
}

impl Status {
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Status::Idle => Cow::Borrowed(IDLE_HINT),
            Status::Processing => Cow::Borrowed("Processing your drawing..."),
            Status::Scanning => Cow::Borrowed("Scanning marker..."),
            Status::Success(msg) => Cow::Borrowed(msg.as_str()),
            Status::Error(msg) => Cow::Owned(format!("Error: {msg}")),
        }
    }

    /// Terminal states fall back to [`Status::Idle`] after the revert delay.
    pub fn reverts(&self) -> bool {
        matches!(self, Status::Success(_) | Status::Error(_))
    }
}

/// Status text with time-based revert to the idle hint.
#[derive(Clone, Debug)]
pub struct StatusBoard {
    status: Status,
    set_at: Instant,
    revert_after: Duration,
}

impl StatusBoard {
    pub fn new(revert_after: Duration) -> Self {
        Self {
            status: Status::Idle,
            set_at: Instant::now(),
            revert_after,
        }
    }

    pub fn set(&mut self, status: Status) {
        self.set_at_instant(status, Instant::now());
    }

    pub fn set_at_instant(&mut self, status: Status, now: Instant) {
        tracing::debug!(status = %status.message(), "status");
        self.status = status;
        self.set_at = now;
    }

    pub fn current(&self) -> Status {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> Status {
        let expired = now.saturating_duration_since(self.set_at) >= self.revert_after;
        if self.status.reverts() && expired {
            Status::Idle
        } else {
            self.status.clone()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/status.rs"]
mod tests;
