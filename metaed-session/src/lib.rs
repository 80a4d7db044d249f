//! metaed-session library interface
//!
//! The editing-session core: original vs. edited metadata, per-field and
//! aggregate diffs, field mutability, the session state machine, transient
//! notifications, and the extract/modify round-trip codec.
//!
//! Binding layers (the `metaed` CLI, or any UI) drive a [`SessionController`]
//! through its `on_*` command methods and observe it through the
//! [`EventBus`](metaed_common::events::EventBus).

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{SessionError, SessionResult};
pub use crate::models::{
    ChangeSet, FieldChange, FieldRow, FileHandle, MetadataDiffModel, MetadataMap, Notification,
    NotificationQueue, Session, SessionAction,
};
pub use crate::services::{
    DownloadArtifact, HttpMetadataEngine, MetadataEngine, RoundTripCodec, SessionController,
};
pub use metaed_common::events::{SessionState, Severity};
