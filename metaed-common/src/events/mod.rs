//! Event system for MetaEdit
//!
//! Provides the session event definitions and the EventBus the session
//! controller publishes to. Binding layers (CLI, UI) subscribe to observe
//! state changes instead of polling the controller.

mod session_types;

pub use session_types::{SessionState, Severity};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Session event types
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to a UI process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Session lifecycle state changed
    StateChanged {
        /// Session the transition belongs to
        session_id: Uuid,
        /// State before change
        old_state: SessionState,
        /// State after change
        new_state: SessionState,
        /// When state changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A field of the working copy was edited
    ///
    /// Carries the recomputed flags so the binding layer can update row and
    /// submit-button state without querying.
    FieldEdited {
        key: String,
        modified: bool,
        has_changes: bool,
    },

    /// A notification became visible (replacing any previous one)
    NotificationShown {
        message: String,
        severity: Severity,
        /// Time until automatic expiry
        expires_after_ms: u64,
    },

    /// The visible notification was dismissed
    NotificationDismissed,

    /// A file is ready to be offered to the user as a download
    DownloadReady {
        filename: String,
        content_type: String,
        size_bytes: usize,
    },
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block the controller)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use metaed_common::events::{EventBus, SessionEvent};
///
/// let event_bus = EventBus::new(16);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(SessionEvent::NotificationDismissed);
/// assert_eq!(rx.try_recv().unwrap(), SessionEvent::NotificationDismissed);
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SessionEvent,
    ) -> Result<usize, broadcast::error::SendError<SessionEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.emit(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(8);
        assert!(bus.emit(SessionEvent::NotificationDismissed).is_err());
        bus.emit_lossy(SessionEvent::NotificationDismissed);

        let mut rx = bus.subscribe();
        assert_eq!(bus.emit(SessionEvent::NotificationDismissed).unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::NotificationDismissed);
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.emit(SessionEvent::FieldEdited {
            key: "Make".to_string(),
            modified: true,
            has_changes: true,
        })
        .unwrap();
        bus.emit(SessionEvent::NotificationDismissed).unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            SessionEvent::FieldEdited { ref key, modified: true, .. } if key == "Make"
        ));
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::NotificationDismissed);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = SessionEvent::NotificationShown {
            message: "1 field(s) modified successfully.".to_string(),
            severity: Severity::Success,
            expires_after_ms: 5000,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "NotificationShown");
        assert_eq!(json["severity"], "success");
    }

    #[test]
    fn test_state_helpers() {
        assert!(SessionState::Loading.is_busy());
        assert!(SessionState::Submitting.is_busy());
        assert!(!SessionState::Editing.is_busy());
        assert!(SessionState::Submitting.has_file());
        assert!(!SessionState::Loading.has_file());
        assert_eq!(SessionState::Viewing.to_string(), "Viewing");
    }
}
