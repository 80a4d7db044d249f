//! Error types for metaed-session
//!
//! Endpoint failures (`Extraction`, `Modification`, `NoFieldsApplied`,
//! `Transport`, `CorruptPayload`) are caught by the controller at the action
//! boundary and turned into notifications. `UnknownField` and
//! `InvalidTransition` indicate a wiring defect in the binding layer and are
//! returned to the caller.

use metaed_common::events::SessionState;
use thiserror::Error;

/// Session error type
#[derive(Debug, Error)]
pub enum SessionError {
    /// Extraction endpoint returned an error or non-success status
    #[error("{0}")]
    Extraction(String),

    /// An edit referenced a field absent from the loaded metadata
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Modification endpoint returned an error or non-success status
    #[error("{0}")]
    Modification(String),

    /// Modification succeeded transport-wise but wrote nothing
    #[error("No fields could be modified. The selected fields are not writable for this file type.")]
    NoFieldsApplied {
        /// Fields the engine reported as rejected
        failed: Vec<String>,
    },

    /// Action not accepted in the current state
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        state: SessionState,
        action: &'static str,
    },

    /// Transport text of a binary payload did not decode
    #[error("Modified file could not be decoded: {0}")]
    CorruptPayload(String),

    /// Request never produced an HTTP response
    #[error("Connection error: {0}")]
    Transport(String),

    /// Serialization error while building a request or export
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// Whether the error comes from the engine round trip rather than a wiring defect
    pub fn is_endpoint_failure(&self) -> bool {
        !matches!(
            self,
            SessionError::UnknownField(_) | SessionError::InvalidTransition { .. }
        )
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_messages_are_verbatim() {
        let err = SessionError::Extraction("Select a file.".to_string());
        assert_eq!(err.to_string(), "Select a file.");
        assert!(err.is_endpoint_failure());
    }

    #[test]
    fn test_wiring_defects() {
        let err = SessionError::UnknownField("Lens".to_string());
        assert!(!err.is_endpoint_failure());

        let err = SessionError::InvalidTransition {
            state: SessionState::Viewing,
            action: "submit",
        };
        assert_eq!(err.to_string(), "Cannot submit while Viewing");
        assert!(!err.is_endpoint_failure());
    }
}
