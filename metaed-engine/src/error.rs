//! Error types for metaed-engine

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metaed_common::api::ErrorResponse;
use thiserror::Error;

use crate::exiftool::ExifToolError;

/// API error type
///
/// Every variant renders as `{ "error": message }`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Unreadable or oversized multipart body
    #[error("{message}")]
    Multipart { status: StatusCode, message: String },

    /// Backend failure (500)
    #[error(transparent)]
    ExifTool(#[from] ExifToolError),

    /// Temporary file handling (500)
    #[error("Temporary file error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart { status, .. } => status,
            ApiError::ExifTool(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
