//! Data models for metaed-session

pub mod diff_model;
pub mod metadata;
pub mod notification;
pub mod session;

pub use diff_model::{FieldChange, MetadataDiffModel};
pub use metadata::{coerce_value, ChangeSet, MetadataMap};
pub use notification::{Notification, NotificationQueue, NotificationTimings};
pub use session::{
    ActiveView, FieldRow, FileHandle, Session, SessionAction, StateTransition, Transitions,
};
