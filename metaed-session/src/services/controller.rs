//! Session controller
//!
//! Owns the [`Session`] and exposes it to a binding layer as a command
//! interface (`on_file_selected`, `on_edit_clicked`, `on_field_edited`,
//! `on_cancel_clicked`, `on_submit_clicked`, `on_reset_clicked`). Every state
//! change, field edit, notification and download is published on the
//! [`EventBus`].
//!
//! Engine failures never escape an action: they become error notifications and
//! the action returns `Ok`. Only wiring defects (unknown fields, actions in a
//! state that does not accept them) are returned as `Err`, even when the engine
//! transport is the one reporting them. The session still settles in Empty or
//! Editing first.
//!
//! Async actions take `&mut self`, so at most one engine request can be in
//! flight per controller.

use metaed_common::events::{EventBus, SessionEvent, SessionState, Severity};
use metaed_common::FieldMutabilityPolicy;
use tracing::{debug, error, info, warn};

use super::codec::{ApplyStatus, RoundTripCodec};
use super::download::DownloadArtifact;
use super::engine_client::MetadataEngine;
use crate::error::{SessionError, SessionResult};
use crate::models::{
    FieldChange, FieldRow, FileHandle, Notification, NotificationQueue, NotificationTimings,
    Session, SessionAction,
};

/// Drives one editing session against a metadata engine
pub struct SessionController<E: MetadataEngine> {
    session: Session,
    policy: FieldMutabilityPolicy,
    notifications: NotificationQueue,
    engine: E,
    event_bus: EventBus,
}

impl<E: MetadataEngine> SessionController<E> {
    pub fn new(
        engine: E,
        policy: FieldMutabilityPolicy,
        timings: NotificationTimings,
        event_bus: EventBus,
    ) -> Self {
        Self {
            session: Session::new(),
            policy,
            notifications: NotificationQueue::new(timings),
            engine,
            event_bus,
        }
    }

    /// Controller with the standard policy, default timings and its own event bus
    pub fn with_defaults(engine: E) -> Self {
        Self::new(
            engine,
            FieldMutabilityPolicy::standard(),
            NotificationTimings::default(),
            EventBus::default(),
        )
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// A file was chosen: extract its metadata
    ///
    /// Returns the state after the extraction completed (Viewing on success,
    /// Empty on failure).
    pub async fn on_file_selected(&mut self, file: FileHandle) -> SessionResult<SessionState> {
        self.transition(SessionAction::Upload)?;

        info!(file = %file.name(), bytes = file.len(), "Extracting metadata");
        let request = RoundTripCodec::encode_extract(&file);
        self.session.attach_file(file);

        let result = match self.engine.extract(request).await {
            Ok(response) => RoundTripCodec::decode_extract(&response),
            Err(e) => Err(e),
        };

        match result {
            Ok(extracted) => {
                let filename = if extracted.filename.is_empty() {
                    self.session
                        .file()
                        .map(|f| f.name().to_string())
                        .unwrap_or_default()
                } else {
                    extracted.filename
                };
                info!(file = %filename, fields = extracted.metadata.len(), "Metadata extracted");

                self.session.load(filename, extracted.metadata);
                if self.notifications.clear_errors() {
                    self.event_bus.emit_lossy(SessionEvent::NotificationDismissed);
                }
                self.transition(SessionAction::ExtractionSucceeded)?;
            }
            Err(e) => {
                warn!(error = %e, "Metadata extraction failed");
                self.session.clear();
                self.transition(SessionAction::ExtractionFailed)?;
                self.report(e)?;
            }
        }

        Ok(self.session.state())
    }

    /// Enter Editing with a fresh working copy
    pub fn on_edit_clicked(&mut self) -> SessionResult<()> {
        self.transition(SessionAction::Edit)?;
        self.session.metadata_mut().begin_edit();
        Ok(())
    }

    /// Leave Editing, discarding the working copy
    pub fn on_cancel_clicked(&mut self) -> SessionResult<()> {
        self.transition(SessionAction::Cancel)?;
        self.session.metadata_mut().discard_edits();
        Ok(())
    }

    /// Record a field edit
    ///
    /// The returned flags reflect the field and the whole session after the edit.
    pub fn on_field_edited(&mut self, key: &str, value: impl Into<String>) -> SessionResult<FieldChange> {
        self.session
            .ensure(SessionAction::FieldChanged)
            .inspect_err(|e| warn!(field = %key, error = %e, "Field edit rejected"))?;

        let change = self
            .session
            .metadata_mut()
            .set_field(key, value)
            .inspect_err(|e| error!(error = %e, "Edit referenced a field that was never loaded"))?;

        if self.policy.is_read_only(key) {
            warn!(field = %key, "Read-only field edited; it will not be submitted");
        }

        self.event_bus.emit_lossy(SessionEvent::FieldEdited {
            key: change.key.clone(),
            modified: change.modified,
            has_changes: change.has_changes,
        });
        Ok(change)
    }

    /// Submit the change-set to the engine
    ///
    /// Returns the modified file when the engine applied at least one field.
    /// Read-only fields are removed from the change-set before sending; if
    /// nothing remains, no request is made.
    pub async fn on_submit_clicked(&mut self) -> SessionResult<Option<DownloadArtifact>> {
        self.session.ensure(SessionAction::Submit)?;
        if !self.session.can_submit() {
            warn!(state = %self.session.state(), "Submit without pending changes rejected");
            return Err(SessionError::InvalidTransition {
                state: self.session.state(),
                action: "submit without changes",
            });
        }

        let mut changes = self.session.metadata().change_set();
        let stripped = changes.strip_read_only(&self.policy);
        if !stripped.is_empty() {
            warn!(fields = ?stripped, "Read-only fields removed from change-set");
        }
        if changes.is_empty() {
            self.notify(
                SessionError::NoFieldsApplied { failed: stripped }.to_string(),
                Severity::Error,
            );
            return Ok(None);
        }

        let request = match self.session.file() {
            Some(file) => RoundTripCodec::encode_modify(file, &changes)?,
            None => {
                return Err(SessionError::InvalidTransition {
                    state: self.session.state(),
                    action: "submit without a file",
                })
            }
        };

        self.transition(SessionAction::Submit)?;
        info!(fields = changes.len(), "Submitting changes");

        let result = match self.engine.modify(request).await {
            Ok(response) => RoundTripCodec::decode_modify(&response),
            Err(e) => Err(e),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Modification failed");
                self.transition(SessionAction::ModificationFailed)?;
                self.report(e)?;
                return Ok(None);
            }
        };

        for warning in &outcome.warnings {
            debug!(warning = %warning, "Engine reported warning");
        }

        let (message, severity) = match outcome.status() {
            ApplyStatus::NoneApplied { failed } => {
                warn!(failed = ?failed, "Engine applied no fields");
                self.transition(SessionAction::ModificationFailed)?;
                self.notify(
                    SessionError::NoFieldsApplied { failed }.to_string(),
                    Severity::Error,
                );
                return Ok(None);
            }
            ApplyStatus::Complete { applied } => (
                format!("{} field(s) modified successfully.", applied),
                Severity::Success,
            ),
            ApplyStatus::Partial(warning) => (warning.to_string(), Severity::Warning),
        };

        info!(
            applied = outcome.applied.len(),
            failed = outcome.failed.len(),
            "Modification applied"
        );
        let artifact = DownloadArtifact::modified_file(self.session.filename(), outcome.payload);
        self.transition(SessionAction::ModificationSucceeded)?;
        self.publish_download(&artifact);
        self.notify(message, severity);

        Ok(Some(artifact))
    }

    /// Discard the current file and return to Empty
    pub fn on_reset_clicked(&mut self) -> SessionResult<()> {
        self.transition(SessionAction::Reset)?;
        self.session.clear();
        Ok(())
    }

    /// JSON export of the displayed metadata (edited while editing, else original)
    pub fn export_json(&self) -> SessionResult<DownloadArtifact> {
        if !self.session.state().has_file() {
            return Err(SessionError::InvalidTransition {
                state: self.session.state(),
                action: "export metadata",
            });
        }

        let artifact =
            DownloadArtifact::json_export(self.session.filename(), self.session.displayed_metadata())?;
        self.publish_download(&artifact);
        Ok(artifact)
    }

    /// Hide the visible notification
    pub fn dismiss_notification(&mut self) -> bool {
        let dismissed = self.notifications.dismiss();
        if dismissed {
            self.event_bus.emit_lossy(SessionEvent::NotificationDismissed);
        }
        dismissed
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Rows of the active view with per-field editability
    pub fn rows(&self) -> Vec<FieldRow> {
        self.session.rows(&self.policy)
    }

    /// Whether the submit affordance is enabled
    pub fn can_submit(&self) -> bool {
        self.session.can_submit()
    }

    /// Visible notification, if it has not expired
    pub fn notification(&mut self) -> Option<&Notification> {
        self.notifications.current()
    }

    pub fn policy(&self) -> &FieldMutabilityPolicy {
        &self.policy
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn transition(&mut self, action: SessionAction) -> SessionResult<()> {
        let transition = self
            .session
            .apply(action)
            .inspect_err(|e| warn!(error = %e, "Action rejected"))?;

        debug!(
            session_id = %transition.session_id,
            from = %transition.old_state,
            to = %transition.new_state,
            "Session state changed"
        );
        self.event_bus.emit_lossy(SessionEvent::StateChanged {
            session_id: transition.session_id,
            old_state: transition.old_state,
            new_state: transition.new_state,
            timestamp: transition.transitioned_at,
        });
        Ok(())
    }

    /// Endpoint failures become an error notification; wiring defects are returned
    fn report(&mut self, error: SessionError) -> SessionResult<()> {
        if !error.is_endpoint_failure() {
            return Err(error);
        }
        self.notify(error.to_string(), Severity::Error);
        Ok(())
    }

    fn notify(&mut self, message: String, severity: Severity) {
        let notification = self.notifications.show(message, severity);
        self.event_bus.emit_lossy(SessionEvent::NotificationShown {
            message: notification.message.clone(),
            severity: notification.severity,
            expires_after_ms: notification.expires_after.as_millis() as u64,
        });
    }

    fn publish_download(&self, artifact: &DownloadArtifact) {
        self.event_bus.emit_lossy(SessionEvent::DownloadReady {
            filename: artifact.filename.clone(),
            content_type: artifact.content_type.to_string(),
            size_bytes: artifact.bytes.len(),
        });
    }
}
