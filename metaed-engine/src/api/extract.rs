//! POST /api/extract

use axum::extract::{Multipart, State};
use axum::Json;
use metaed_common::api::ExtractResponse;
use metaed_common::policy::COMMON_DESCRIPTIVE_FIELDS;
use serde_json::Value;
use std::time::Instant;
use tracing::{error, info};

use super::form::UploadForm;
use crate::error::{ApiError, ApiResult};
use crate::services::StagedUpload;
use crate::AppState;

pub const MISSING_FILE: &str = "Select a file.";

/// Read the metadata of an uploaded file
///
/// Common descriptive fields the file does not carry are appended with an
/// empty value so they can be filled in.
pub async fn extract_metadata(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ExtractResponse>> {
    let form = UploadForm::read(multipart).await?;
    let upload = form
        .file
        .ok_or_else(|| ApiError::BadRequest(MISSING_FILE.to_string()))?;

    let started = Instant::now();
    let staged = StagedUpload::stage(&upload.name, &upload.bytes).await?;

    let mut metadata = state
        .backend
        .read(staged.path())
        .await
        .inspect_err(|e| error!(file = %staged.filename(), "Error extracting metadata: {}", e))?;

    let found = metadata.len();
    for field in COMMON_DESCRIPTIVE_FIELDS {
        metadata
            .entry(field.to_string())
            .or_insert_with(|| Value::String(String::new()));
    }

    info!(
        file = %staged.filename(),
        bytes = upload.bytes.len(),
        fields = found,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Metadata extracted"
    );

    Ok(Json(ExtractResponse {
        metadata,
        filename: staged.filename().to_string(),
    }))
}
