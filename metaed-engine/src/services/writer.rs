//! Write-then-verify
//!
//! Writes the requested fields through the backend, re-reads the file and
//! classifies each field as applied or failed by comparing the re-read value
//! with the requested one.

use indexmap::IndexMap;
use metaed_common::api::coerce_value;
use metaed_common::policy::is_common_descriptive_field;
use metaed_common::FieldMutabilityPolicy;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::backend::MetadataBackend;
use crate::exiftool::ExifToolError;

/// Warning returned when every requested field is read-only
pub const ALL_READ_ONLY_WARNING: &str = "All selected fields are read-only.";

/// Warning returned when no requested field can be written
pub const NONE_WRITABLE_WARNING: &str = "None of the selected fields can be written.";

/// Outcome of a write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub applied: Vec<String>,
    pub failed: Vec<String>,
    pub warnings: Vec<String>,
}

/// Whether `tag` is known to be writable
///
/// Accepts the full name, the base name after a group prefix, or a common
/// descriptive field. An empty tag list means the backend could not report
/// one, and every tag is accepted.
pub fn is_known_writable(tag: &str, writable: &HashSet<String>) -> bool {
    if writable.is_empty() {
        return true;
    }
    let base = tag.rsplit_once(':').map(|(_, b)| b).unwrap_or(tag);
    writable.contains(tag) || writable.contains(base) || is_common_descriptive_field(tag)
}

/// Apply `requested` to the file at `path`
///
/// Read-only fields and fields missing from the backend's writable tag list
/// are never written and are reported as failed. Every other field is
/// applied only if re-reading the file returns the requested value.
pub async fn apply_changes(
    backend: &dyn MetadataBackend,
    policy: &FieldMutabilityPolicy,
    path: &Path,
    requested: &IndexMap<String, String>,
) -> Result<WriteReport, ExifToolError> {
    if requested.keys().all(|tag| policy.is_read_only(tag)) {
        return Ok(WriteReport {
            applied: Vec::new(),
            failed: requested.keys().cloned().collect(),
            warnings: vec![ALL_READ_ONLY_WARNING.to_string()],
        });
    }

    let writable = backend.writable_tags().await;
    let mut report = WriteReport::default();
    let mut to_write = IndexMap::new();
    for (tag, value) in requested {
        if policy.is_read_only(tag) || !is_known_writable(tag, &writable) {
            debug!(field = %tag, "Field not writable, skipped");
            report.failed.push(tag.clone());
        } else {
            to_write.insert(tag.clone(), value.clone());
        }
    }

    if to_write.is_empty() {
        report.warnings.push(NONE_WRITABLE_WARNING.to_string());
        return Ok(report);
    }

    report.warnings = backend.write(path, &to_write).await?;
    let reread = backend.read(path).await?;

    for (tag, requested_value) in &to_write {
        let actual = reread.get(tag).map(coerce_value).unwrap_or_default();
        if &actual == requested_value {
            report.applied.push(tag.clone());
        } else {
            debug!(field = %tag, requested = %requested_value, actual = %actual, "Field not verified");
            report.failed.push(tag.clone());
        }
    }

    Ok(report)
}
