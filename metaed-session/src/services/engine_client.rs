//! Metadata engine transport
//!
//! The engine is an external collaborator reached over HTTP. This module only
//! moves bytes: [`RoundTripCodec`](super::codec::RoundTripCodec) builds the
//! requests and interprets the responses, so the transport can be swapped for
//! an in-memory fake in tests.

use async_trait::async_trait;
use metaed_common::api::{EXTRACT_PATH, FILE_FIELD, METADATA_FIELD, MODIFY_PATH};
use reqwest::multipart::{Form, Part};

use crate::error::{SessionError, SessionResult};

const USER_AGENT: &str = concat!("metaed/", env!("CARGO_PKG_VERSION"));

/// Extraction request: the file alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Modification request: the file plus a serialized change-set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// JSON object of field → new value
    pub changes_json: String,
}

/// Status and body of an engine response, not yet interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Server-side metadata engine
///
/// Implementations return `Err` only when no response was obtained at all;
/// error statuses are returned as responses for the codec to decode.
#[async_trait]
pub trait MetadataEngine: Send + Sync {
    async fn extract(&self, request: ExtractRequest) -> SessionResult<RawResponse>;

    async fn modify(&self, request: ModifyRequest) -> SessionResult<RawResponse>;
}

/// Engine reached over HTTP multipart requests
pub struct HttpMetadataEngine {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpMetadataEngine {
    pub fn new(base_url: impl Into<String>) -> SessionResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn file_part(file_name: String, bytes: Vec<u8>) -> Part {
        Part::bytes(bytes).file_name(file_name)
    }

    async fn post(&self, path: &str, form: Form) -> SessionResult<RawResponse> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Posting to metadata engine");

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        tracing::debug!(status, bytes = body.len(), "Metadata engine responded");
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl MetadataEngine for HttpMetadataEngine {
    async fn extract(&self, request: ExtractRequest) -> SessionResult<RawResponse> {
        let form = Form::new().part(FILE_FIELD, Self::file_part(request.file_name, request.bytes));
        self.post(EXTRACT_PATH, form).await
    }

    async fn modify(&self, request: ModifyRequest) -> SessionResult<RawResponse> {
        let form = Form::new()
            .part(FILE_FIELD, Self::file_part(request.file_name, request.bytes))
            .text(METADATA_FIELD, request.changes_json);
        self.post(MODIFY_PATH, form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_trims_slash() {
        let engine = HttpMetadataEngine::new("http://127.0.0.1:5050/").unwrap();
        assert_eq!(engine.base_url(), "http://127.0.0.1:5050");
    }

    #[test]
    fn test_raw_response_success_range() {
        assert!(RawResponse::new(200, "{}").is_success());
        assert!(!RawResponse::new(400, "{}").is_success());
        assert!(!RawResponse::new(500, Vec::new()).is_success());
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_transport_error() {
        // Port 9 (discard) is essentially never listening on loopback
        let engine = HttpMetadataEngine::new("http://127.0.0.1:9").unwrap();
        let result = engine
            .extract(ExtractRequest {
                file_name: "a.jpg".to_string(),
                bytes: vec![1],
            })
            .await;
        assert!(matches!(result, Err(SessionError::Transport(_))));
    }
}
