//! Engine services: upload staging and write-then-verify

pub mod upload;
pub mod writer;

pub use upload::{sanitize_filename, upload_suffix, StagedUpload};
pub use writer::{apply_changes, is_known_writable, WriteReport};
