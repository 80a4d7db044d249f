//! Shared HTTP API types and payload encoding
//!
//! Both the session client and the metadata engine use these definitions, so
//! the two sides of the extract/modify round trip cannot drift apart.
//!
//! This module contains ONLY pure types and functions; each side wraps them
//! with its own framework (reqwest on the client, axum on the engine).

pub mod payload;
pub mod types;

pub use payload::{decode_payload, encode_payload};
pub use types::{coerce_value, ErrorResponse, ExtractResponse, HealthResponse, ModifyResponse};

/// Path of the extraction endpoint
pub const EXTRACT_PATH: &str = "/api/extract";

/// Path of the modification endpoint
pub const MODIFY_PATH: &str = "/api/modify";

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Multipart field carrying the serialized change-set
pub const METADATA_FIELD: &str = "metadata";
