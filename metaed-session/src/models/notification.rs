//! Transient user-facing notifications
//!
//! Single-slot queue: at most one notification is visible. Showing a new one
//! replaces the current one and restarts the expiry clock. Expiry is evaluated
//! lazily against `tokio::time::Instant`, so a paused test clock drives it.

use metaed_common::events::Severity;
use std::time::Duration;
use tokio::time::Instant;

/// Default lifetime of an error notification
pub const DEFAULT_ERROR_TTL: Duration = Duration::from_secs(8);

/// Default lifetime of warning and success notifications
pub const DEFAULT_INFO_TTL: Duration = Duration::from_secs(5);

/// A visible status message
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub expires_after: Duration,
    shown_at: Instant,
}

impl Notification {
    /// Whether the notification has outlived its expiry at `now`
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.expires_after
    }

    /// Time left before expiry at `now`
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.expires_after
            .saturating_sub(now.saturating_duration_since(self.shown_at))
    }
}

/// Expiry durations per severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTimings {
    pub error: Duration,
    pub info: Duration,
}

impl NotificationTimings {
    pub fn ttl_for(&self, severity: Severity) -> Duration {
        match severity {
            Severity::Error => self.error,
            Severity::Warning | Severity::Success => self.info,
        }
    }
}

impl Default for NotificationTimings {
    fn default() -> Self {
        Self {
            error: DEFAULT_ERROR_TTL,
            info: DEFAULT_INFO_TTL,
        }
    }
}

/// Single-slot notification queue
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    slot: Option<Notification>,
    timings: NotificationTimings,
}

impl NotificationQueue {
    pub fn new(timings: NotificationTimings) -> Self {
        Self { slot: None, timings }
    }

    /// Show a notification, preempting any visible one
    pub fn show(&mut self, message: impl Into<String>, severity: Severity) -> &Notification {
        self.slot.insert(Notification {
            message: message.into(),
            severity,
            expires_after: self.timings.ttl_for(severity),
            shown_at: Instant::now(),
        })
    }

    pub fn error(&mut self, message: impl Into<String>) -> &Notification {
        self.show(message, Severity::Error)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> &Notification {
        self.show(message, Severity::Warning)
    }

    pub fn success(&mut self, message: impl Into<String>) -> &Notification {
        self.show(message, Severity::Success)
    }

    /// Currently visible notification, dropping it if it has expired
    pub fn current(&mut self) -> Option<&Notification> {
        if self
            .slot
            .as_ref()
            .is_some_and(|n| n.is_expired_at(Instant::now()))
        {
            self.slot = None;
        }
        self.slot.as_ref()
    }

    /// Hide the visible notification, cancelling its expiry
    ///
    /// Returns whether anything was visible.
    pub fn dismiss(&mut self) -> bool {
        self.slot.take().is_some()
    }

    /// Hide the visible notification only if it is an error
    pub fn clear_errors(&mut self) -> bool {
        if self
            .slot
            .as_ref()
            .is_some_and(|n| n.severity == Severity::Error)
        {
            self.slot = None;
            return true;
        }
        false
    }

    pub fn timings(&self) -> NotificationTimings {
        self.timings
    }
}
