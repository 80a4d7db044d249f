//! Round-trip codec
//!
//! Encodes extract/modify requests and decodes the engine's responses into
//! session types. The modified file arrives as base64 text and is decoded
//! byte-for-byte; a payload that does not decode cleanly is rejected outright.

use metaed_common::api::{decode_payload, ErrorResponse, ExtractResponse, ModifyResponse};

use super::engine_client::{ExtractRequest, ModifyRequest, RawResponse};
use crate::error::{SessionError, SessionResult};
use crate::models::{ChangeSet, FileHandle, MetadataMap};

const EXTRACTION_FAILED: &str = "Failed to extract metadata.";
const MODIFICATION_FAILED: &str = "Failed to modify file.";

/// Decoded extraction response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMetadata {
    pub filename: String,
    pub metadata: MetadataMap,
}

/// Decoded modification response
#[derive(Clone, PartialEq, Eq)]
pub struct ModifyOutcome {
    /// Modified file, raw bytes
    pub payload: Vec<u8>,
    pub applied: Vec<String>,
    pub failed: Vec<String>,
    pub warnings: Vec<String>,
}

impl std::fmt::Debug for ModifyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModifyOutcome")
            .field("payload_len", &self.payload.len())
            .field("applied", &self.applied)
            .field("failed", &self.failed)
            .field("warnings", &self.warnings)
            .finish()
    }
}

/// Some fields were written, some were rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialApplyWarning {
    pub applied: usize,
    pub failed: Vec<String>,
}

impl std::fmt::Display for PartialApplyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} field(s) modified. {} field(s) could not be written: {}",
            self.applied,
            self.failed.len(),
            self.failed.join(", ")
        )
    }
}

/// How much of a change-set the engine applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyStatus {
    /// Every requested field was written
    Complete { applied: usize },
    /// Some fields failed; the file is still usable
    Partial(PartialApplyWarning),
    /// Nothing was written
    NoneApplied { failed: Vec<String> },
}

impl ModifyOutcome {
    pub fn status(&self) -> ApplyStatus {
        if self.applied.is_empty() {
            ApplyStatus::NoneApplied {
                failed: self.failed.clone(),
            }
        } else if self.failed.is_empty() {
            ApplyStatus::Complete {
                applied: self.applied.len(),
            }
        } else {
            ApplyStatus::Partial(PartialApplyWarning {
                applied: self.applied.len(),
                failed: self.failed.clone(),
            })
        }
    }
}

/// Encoder/decoder for the extract and modify endpoints
pub struct RoundTripCodec;

impl RoundTripCodec {
    /// Extraction request carrying the file alone
    pub fn encode_extract(file: &FileHandle) -> ExtractRequest {
        ExtractRequest {
            file_name: file.name().to_string(),
            bytes: file.bytes().to_vec(),
        }
    }

    /// Modification request carrying the file and the serialized change-set
    pub fn encode_modify(file: &FileHandle, changes: &ChangeSet) -> SessionResult<ModifyRequest> {
        Ok(ModifyRequest {
            file_name: file.name().to_string(),
            bytes: file.bytes().to_vec(),
            changes_json: changes.to_json()?,
        })
    }

    /// Decode an extraction response
    ///
    /// Error bodies and non-success statuses become [`SessionError::Extraction`]
    /// carrying the engine's message verbatim.
    pub fn decode_extract(response: &RawResponse) -> SessionResult<ExtractedMetadata> {
        if !response.is_success() {
            return Err(SessionError::Extraction(error_message(
                response,
                EXTRACTION_FAILED,
            )));
        }

        match serde_json::from_slice::<ExtractResponse>(&response.body) {
            Ok(body) => Ok(ExtractedMetadata {
                filename: body.filename,
                metadata: MetadataMap::from_values(body.metadata),
            }),
            Err(e) => Err(SessionError::Extraction(
                reported_error(&response.body)
                    .unwrap_or_else(|| format!("Invalid response from metadata engine: {}", e)),
            )),
        }
    }

    /// Decode a modification response, decoding the file payload to raw bytes
    pub fn decode_modify(response: &RawResponse) -> SessionResult<ModifyOutcome> {
        if !response.is_success() {
            return Err(SessionError::Modification(error_message(
                response,
                MODIFICATION_FAILED,
            )));
        }

        let body = match serde_json::from_slice::<ModifyResponse>(&response.body) {
            Ok(body) => body,
            Err(e) => {
                return Err(SessionError::Modification(
                    reported_error(&response.body).unwrap_or_else(|| {
                        format!("Invalid response from metadata engine: {}", e)
                    }),
                ))
            }
        };

        let payload =
            decode_payload(&body.file).map_err(|e| SessionError::CorruptPayload(e.to_string()))?;

        Ok(ModifyOutcome {
            payload,
            applied: body.applied,
            failed: body.failed,
            warnings: body.warnings,
        })
    }
}

fn reported_error(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorResponse>(body)
        .ok()
        .map(|e| e.error)
        .filter(|e| !e.is_empty())
}

fn error_message(response: &RawResponse, fallback: &str) -> String {
    reported_error(&response.body)
        .unwrap_or_else(|| format!("{} (HTTP {})", fallback, response.status))
}
