//! Session-related type definitions
//!
//! Supporting types for the editing-session lifecycle and user-facing notifications.

use serde::{Deserialize, Serialize};

/// Editing-session lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub enum SessionState {
    /// No file loaded
    Empty,
    /// Extraction request in flight
    Loading,
    /// Metadata displayed read-only
    Viewing,
    /// Working copy mutable
    Editing,
    /// Modification request in flight
    Submitting,
}

impl SessionState {
    /// Whether a request to the engine is in flight
    pub fn is_busy(self) -> bool {
        matches!(self, SessionState::Loading | SessionState::Submitting)
    }

    /// Whether a file and its metadata are loaded
    pub fn has_file(self) -> bool {
        matches!(
            self,
            SessionState::Viewing | SessionState::Editing | SessionState::Submitting
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Empty => write!(f, "Empty"),
            SessionState::Loading => write!(f, "Loading"),
            SessionState::Viewing => write!(f, "Viewing"),
            SessionState::Editing => write!(f, "Editing"),
            SessionState::Submitting => write!(f, "Submitting"),
        }
    }
}

/// Notification severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Success,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Success => write!(f, "success"),
        }
    }
}
