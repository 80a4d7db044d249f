//! POST /api/modify

use axum::extract::{Multipart, State};
use axum::Json;
use indexmap::IndexMap;
use metaed_common::api::{coerce_value, encode_payload, ModifyResponse};
use serde_json::Value;
use std::time::Instant;
use tracing::{error, info};

use super::form::UploadForm;
use crate::error::{ApiError, ApiResult};
use crate::services::{apply_changes, StagedUpload};
use crate::AppState;

pub const MISSING_FILE: &str = "No file was sent.";
pub const INVALID_METADATA: &str = "Invalid metadata.";

/// Parse the `metadata` form field: a JSON object of field → value
///
/// A missing field is an empty change-set. Non-string values are coerced to
/// their display text.
pub fn parse_changes(raw: Option<&str>) -> Result<IndexMap<String, String>, ApiError> {
    let raw = raw.unwrap_or("{}");
    let parsed: IndexMap<String, Value> =
        serde_json::from_str(raw).map_err(|_| ApiError::BadRequest(INVALID_METADATA.to_string()))?;
    Ok(parsed
        .into_iter()
        .map(|(tag, value)| (tag, coerce_value(&value)))
        .collect())
}

/// Write a change-set into an uploaded file and return the result
pub async fn modify_metadata(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ModifyResponse>> {
    let form = UploadForm::read(multipart).await?;
    let upload = form
        .file
        .ok_or_else(|| ApiError::BadRequest(MISSING_FILE.to_string()))?;
    let changes = parse_changes(form.metadata.as_deref())?;

    let started = Instant::now();
    let staged = StagedUpload::stage(&upload.name, &upload.bytes).await?;

    let report = apply_changes(state.backend.as_ref(), &state.policy, staged.path(), &changes)
        .await
        .inspect_err(|e| error!(file = %staged.filename(), "Error modifying metadata: {}", e))?;
    let bytes = staged.read_back().await?;

    info!(
        file = %staged.filename(),
        requested = changes.len(),
        applied = report.applied.len(),
        failed = report.failed.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Metadata modified"
    );

    Ok(Json(ModifyResponse {
        file: encode_payload(&bytes),
        filename: Some(staged.filename().to_string()),
        applied: report.applied,
        failed: report.failed,
        warnings: report.warnings,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_changes() {
        let changes = parse_changes(Some(r#"{"Make":"Nikon","Rating":5}"#)).unwrap();
        assert_eq!(
            changes.into_iter().collect::<Vec<_>>(),
            vec![
                ("Make".to_string(), "Nikon".to_string()),
                ("Rating".to_string(), "5".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_changes_missing_is_empty() {
        assert!(parse_changes(None).unwrap().is_empty());
    }

    #[test]
    fn test_parse_changes_rejects_non_objects() {
        for raw in ["{not json", "[1,2]", "\"Make\""] {
            let err = parse_changes(Some(raw)).unwrap_err();
            assert_eq!(err.to_string(), INVALID_METADATA);
        }
    }
}
