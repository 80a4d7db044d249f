//! Editing-session state machine
//!
//! A session progresses through five states:
//! Empty → Loading → Viewing ⇄ Editing → Submitting → Viewing (or back to
//! Editing on failure). Reset returns to Empty from anywhere. There is no
//! terminal state.
//!
//! The transition table lives in [`SessionState::after`]; [`Session::apply`]
//! is the only way the state changes.

use chrono::{DateTime, Utc};
use metaed_common::events::SessionState;
use metaed_common::FieldMutabilityPolicy;
use uuid::Uuid;

use super::diff_model::MetadataDiffModel;
use super::metadata::MetadataMap;
use crate::error::{SessionError, SessionResult};

/// Session inputs that drive state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Upload,
    ExtractionSucceeded,
    ExtractionFailed,
    Edit,
    Cancel,
    FieldChanged,
    Submit,
    ModificationSucceeded,
    ModificationFailed,
    Reset,
}

impl SessionAction {
    /// Verb used in rejection messages
    pub fn verb(self) -> &'static str {
        match self {
            SessionAction::Upload => "upload a file",
            SessionAction::ExtractionSucceeded | SessionAction::ExtractionFailed => {
                "complete extraction"
            }
            SessionAction::Edit => "start editing",
            SessionAction::Cancel => "cancel editing",
            SessionAction::FieldChanged => "edit a field",
            SessionAction::Submit => "submit",
            SessionAction::ModificationSucceeded | SessionAction::ModificationFailed => {
                "complete modification"
            }
            SessionAction::Reset => "reset",
        }
    }
}

/// Transition table
pub trait Transitions {
    /// State after `action`, or `None` if the action is not accepted
    fn after(self, action: SessionAction) -> Option<SessionState>;
}

impl Transitions for SessionState {
    fn after(self, action: SessionAction) -> Option<SessionState> {
        use SessionAction as A;
        use SessionState as S;

        match (self, action) {
            (_, A::Reset) => Some(S::Empty),
            (S::Empty, A::Upload) => Some(S::Loading),
            (S::Loading, A::ExtractionSucceeded) => Some(S::Viewing),
            (S::Loading, A::ExtractionFailed) => Some(S::Empty),
            (S::Viewing, A::Edit) => Some(S::Editing),
            (S::Editing, A::Cancel) => Some(S::Viewing),
            (S::Editing, A::FieldChanged) => Some(S::Editing),
            (S::Viewing | S::Editing, A::Submit) => Some(S::Submitting),
            (S::Submitting, A::ModificationSucceeded) => Some(S::Viewing),
            (S::Submitting, A::ModificationFailed) => Some(S::Editing),
            _ => None,
        }
    }
}

/// Which top-level view is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Upload,
    Results,
}

impl From<SessionState> for ActiveView {
    fn from(state: SessionState) -> Self {
        if state.has_file() {
            ActiveView::Results
        } else {
            ActiveView::Upload
        }
    }
}

/// State transition record
#[derive(Debug, Clone, PartialEq)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: SessionState,
    pub new_state: SessionState,
    pub transitioned_at: DateTime<Utc>,
}

/// The uploaded file, owned exclusively by the session
#[derive(Clone, PartialEq, Eq)]
pub struct FileHandle {
    name: String,
    bytes: Vec<u8>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, naming it after the final path component
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One displayed metadata row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    pub key: String,
    pub value: String,
    /// Rendered as an input control
    pub editable: bool,
    /// Classified read-only by policy
    pub read_only: bool,
    /// Edited value differs from the original
    pub modified: bool,
}

/// Complete in-memory state for one loaded file
#[derive(Debug, Clone)]
pub struct Session {
    session_id: Uuid,
    state: SessionState,
    file: Option<FileHandle>,
    filename: String,
    metadata: MetadataDiffModel,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: SessionState::Empty,
            file: None,
            filename: String::new(),
            metadata: MetadataDiffModel::new(),
        }
    }

    /// Apply an action, moving to the state the transition table dictates
    ///
    /// Rejected actions leave the session untouched.
    pub fn apply(&mut self, action: SessionAction) -> SessionResult<StateTransition> {
        let new_state = self
            .state
            .after(action)
            .ok_or(SessionError::InvalidTransition {
                state: self.state,
                action: action.verb(),
            })?;

        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;
        Ok(transition)
    }

    /// Check an action against the transition table without applying it
    pub fn ensure(&self, action: SessionAction) -> SessionResult<()> {
        self.state
            .after(action)
            .map(|_| ())
            .ok_or(SessionError::InvalidTransition {
                state: self.state,
                action: action.verb(),
            })
    }

    /// Take ownership of an uploaded file (replaces any previous one)
    pub fn attach_file(&mut self, file: FileHandle) {
        self.file = Some(file);
    }

    /// Populate from a successful extraction
    pub fn load(&mut self, filename: String, metadata: MetadataMap) {
        self.filename = filename;
        self.metadata.set_original(metadata);
    }

    /// Discard everything belonging to the current file
    pub fn clear(&mut self) {
        self.file = None;
        self.filename.clear();
        self.metadata.clear();
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn active_view(&self) -> ActiveView {
        ActiveView::from(self.state)
    }

    pub fn file(&self) -> Option<&FileHandle> {
        self.file.as_ref()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn metadata(&self) -> &MetadataDiffModel {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataDiffModel {
        &mut self.metadata
    }

    /// Whether display and export use the working copy
    pub fn is_editing(&self) -> bool {
        matches!(self.state, SessionState::Editing | SessionState::Submitting)
    }

    /// Mapping currently on screen: edited while editing, original otherwise
    pub fn displayed_metadata(&self) -> &MetadataMap {
        if self.is_editing() {
            self.metadata.edited()
        } else {
            self.metadata.original()
        }
    }

    /// Whether there is anything to submit
    ///
    /// Always false outside Editing: in Viewing the working copy mirrors the original.
    pub fn has_changes(&self) -> bool {
        self.state == SessionState::Editing && self.metadata.has_changes()
    }

    /// Whether the submit affordance is enabled
    pub fn can_submit(&self) -> bool {
        self.file.is_some() && self.has_changes()
    }

    /// Rows for the active view, in extraction order
    pub fn rows(&self, policy: &FieldMutabilityPolicy) -> Vec<FieldRow> {
        let editing = self.state == SessionState::Editing;

        self.displayed_metadata()
            .iter()
            .map(|(key, value)| {
                let read_only = policy.is_read_only(key);
                FieldRow {
                    key: key.to_string(),
                    value: value.to_string(),
                    editable: editing && !read_only,
                    read_only,
                    modified: self.is_editing() && self.metadata.is_modified(key),
                }
            })
            .collect()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [SessionState; 5] = [
        SessionState::Empty,
        SessionState::Loading,
        SessionState::Viewing,
        SessionState::Editing,
        SessionState::Submitting,
    ];

    fn loaded() -> Session {
        let mut session = Session::new();
        session.apply(SessionAction::Upload).unwrap();
        session.attach_file(FileHandle::new("photo.jpg", vec![0xff, 0xd8]));
        session.load(
            "photo.jpg".to_string(),
            [("Make", "Canon"), ("ImageWidth", "4000")].into_iter().collect(),
        );
        session.apply(SessionAction::ExtractionSucceeded).unwrap();
        session
    }

    #[test]
    fn test_reset_accepted_everywhere() {
        for state in ALL_STATES {
            assert_eq!(state.after(SessionAction::Reset), Some(SessionState::Empty));
        }
    }

    #[test]
    fn test_busy_states_reject_user_actions() {
        for state in [SessionState::Loading, SessionState::Submitting] {
            for action in [
                SessionAction::Upload,
                SessionAction::Edit,
                SessionAction::Cancel,
                SessionAction::FieldChanged,
                SessionAction::Submit,
            ] {
                assert_eq!(state.after(action), None, "{:?} in {:?}", action, state);
            }
        }
    }

    #[test]
    fn test_upload_only_from_empty() {
        assert_eq!(
            SessionState::Empty.after(SessionAction::Upload),
            Some(SessionState::Loading)
        );
        assert_eq!(SessionState::Viewing.after(SessionAction::Upload), None);
        assert_eq!(SessionState::Editing.after(SessionAction::Upload), None);
    }

    #[test]
    fn test_submission_outcomes() {
        assert_eq!(
            SessionState::Submitting.after(SessionAction::ModificationSucceeded),
            Some(SessionState::Viewing)
        );
        assert_eq!(
            SessionState::Submitting.after(SessionAction::ModificationFailed),
            Some(SessionState::Editing)
        );
    }

    #[test]
    fn test_rejected_action_leaves_state() {
        let mut session = Session::new();
        let err = session.apply(SessionAction::Edit).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                state: SessionState::Empty,
                ..
            }
        ));
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_transition_record() {
        let mut session = Session::new();
        let transition = session.apply(SessionAction::Upload).unwrap();
        assert_eq!(transition.session_id, session.session_id());
        assert_eq!(transition.old_state, SessionState::Empty);
        assert_eq!(transition.new_state, SessionState::Loading);
    }

    #[test]
    fn test_active_view_mirrors_state() {
        let mut session = Session::new();
        assert_eq!(session.active_view(), ActiveView::Upload);
        session.apply(SessionAction::Upload).unwrap();
        assert_eq!(session.active_view(), ActiveView::Upload);

        let session = loaded();
        assert_eq!(session.active_view(), ActiveView::Results);
    }

    #[test]
    fn test_rows_in_viewing_are_not_editable() {
        let session = loaded();
        let rows = session.rows(&FieldMutabilityPolicy::standard());

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| !r.editable && !r.modified));
        assert!(rows[1].read_only);
        assert!(!rows[0].read_only);
    }

    #[test]
    fn test_rows_in_editing_follow_policy() {
        let mut session = loaded();
        session.apply(SessionAction::Edit).unwrap();
        session.metadata_mut().set_field("Make", "Nikon").unwrap();

        let rows = session.rows(&FieldMutabilityPolicy::standard());
        assert_eq!(rows[0].key, "Make");
        assert_eq!(rows[0].value, "Nikon");
        assert!(rows[0].editable && rows[0].modified);
        assert_eq!(rows[1].key, "ImageWidth");
        assert!(!rows[1].editable && rows[1].read_only);
        assert!(session.can_submit());
    }

    #[test]
    fn test_viewing_displays_original() {
        let mut session = loaded();
        session.apply(SessionAction::Edit).unwrap();
        session.metadata_mut().set_field("Make", "Nikon").unwrap();
        session.apply(SessionAction::Cancel).unwrap();

        assert_eq!(session.displayed_metadata().get("Make"), Some("Canon"));
        assert!(!session.has_changes());
    }

    #[test]
    fn test_clear() {
        let mut session = loaded();
        session.clear();
        assert!(session.file().is_none());
        assert!(session.filename().is_empty());
        assert!(session.metadata().original().is_empty());
    }

    #[test]
    fn test_file_handle_debug_hides_bytes() {
        let file = FileHandle::new("a.jpg", vec![1, 2, 3]);
        assert_eq!(format!("{:?}", file), r#"FileHandle { name: "a.jpg", len: 3 }"#);
    }
}
