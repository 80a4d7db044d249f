//! Test helpers for metaed-session integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use metaed_common::api::encode_payload;
use metaed_session::services::{ExtractRequest, ModifyRequest, RawResponse};
use metaed_session::{FileHandle, MetadataEngine, SessionError, SessionResult};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Bytes standing in for a JPEG upload
pub const PHOTO_BYTES: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

/// Bytes the fake engine returns as the "modified" file
pub const MODIFIED_BYTES: &[u8] = &[0xff, 0xd8, 0xff, 0xe1, 0x00, 0x00, 0x0d, 0x0a, 0x80];

pub fn photo() -> FileHandle {
    FileHandle::new("photo.jpg", PHOTO_BYTES.to_vec())
}

pub fn json_response(status: u16, body: Value) -> RawResponse {
    RawResponse::new(status, body.to_string())
}

/// Extraction response of the canonical two-field photo
pub fn photo_extraction() -> RawResponse {
    json_response(
        200,
        json!({
            "metadata": {"Make": "Canon", "ImageWidth": 4000},
            "filename": "photo.jpg"
        }),
    )
}

pub fn modify_response(applied: &[&str], failed: &[&str]) -> RawResponse {
    json_response(
        200,
        json!({
            "file": encode_payload(MODIFIED_BYTES),
            "filename": "photo.jpg",
            "applied": applied,
            "failed": failed,
            "warnings": []
        }),
    )
}

/// Requests recorded by [`FakeEngine`]
#[derive(Default)]
pub struct Recorded {
    pub extracts: Vec<ExtractRequest>,
    pub modifies: Vec<ModifyRequest>,
}

/// In-memory engine returning canned responses
pub struct FakeEngine {
    extract: Option<RawResponse>,
    modify: Option<RawResponse>,
    extract_failure: Option<fn() -> SessionError>,
    modify_failure: Option<fn() -> SessionError>,
    pub recorded: Arc<Mutex<Recorded>>,
}

impl FakeEngine {
    /// Engine with no responses configured: every call is a transport error
    pub fn unreachable() -> Self {
        Self {
            extract: None,
            modify: None,
            extract_failure: None,
            modify_failure: None,
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    pub fn new(extract: RawResponse) -> Self {
        Self {
            extract: Some(extract),
            ..Self::unreachable()
        }
    }

    pub fn with_modify(mut self, modify: RawResponse) -> Self {
        self.modify = Some(modify);
        self
    }

    /// Fail extraction with a specific error instead of a transport error
    pub fn with_extract_failure(mut self, failure: fn() -> SessionError) -> Self {
        self.extract_failure = Some(failure);
        self
    }

    /// Fail modification with a specific error instead of a transport error
    pub fn with_modify_failure(mut self, failure: fn() -> SessionError) -> Self {
        self.modify_failure = Some(failure);
        self
    }

    pub fn recorder(&self) -> Arc<Mutex<Recorded>> {
        Arc::clone(&self.recorded)
    }
}

#[async_trait]
impl MetadataEngine for FakeEngine {
    async fn extract(&self, request: ExtractRequest) -> SessionResult<RawResponse> {
        self.recorded.lock().unwrap().extracts.push(request);
        if let Some(failure) = self.extract_failure {
            return Err(failure());
        }
        self.extract
            .clone()
            .ok_or_else(|| SessionError::Transport("connection refused".to_string()))
    }

    async fn modify(&self, request: ModifyRequest) -> SessionResult<RawResponse> {
        self.recorded.lock().unwrap().modifies.push(request);
        if let Some(failure) = self.modify_failure {
            return Err(failure());
        }
        self.modify
            .clone()
            .ok_or_else(|| SessionError::Transport("connection refused".to_string()))
    }
}
