//! Extract/modify request and response bodies

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Coerce a raw engine value to its display string
///
/// `null` becomes the empty string, booleans use their JSON text, arrays are
/// comma-joined, objects are rendered as compact JSON. Integral floats below
/// 1e21 drop the fraction (`5.0` → `5`); other numbers use their JSON text.
pub fn coerce_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => coerce_number(n),
        Value::Array(items) => items.iter().map(coerce_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn coerce_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            // -0.0 displays as 0
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{}", f)
            }
        }
        _ => n.to_string(),
    }
}

/// Successful `POST /api/extract` response
///
/// Values are whatever the engine reported (strings, numbers, lists); the
/// client coerces them to strings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractResponse {
    /// Field name → raw value, in extraction order
    pub metadata: IndexMap<String, Value>,

    /// Sanitized name of the uploaded file
    pub filename: String,
}

/// Successful `POST /api/modify` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModifyResponse {
    /// Modified file, base64 text
    pub file: String,

    /// Sanitized name of the uploaded file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Fields actually written
    pub applied: Vec<String>,

    /// Fields rejected by the engine
    pub failed: Vec<String>,

    /// Engine diagnostics emitted while writing
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Error body returned by both endpoints
///
/// # Examples
///
/// ```
/// use metaed_common::api::ErrorResponse;
///
/// let body: ErrorResponse = serde_json::from_str(r#"{"error":"Select a file."}"#).unwrap();
/// assert_eq!(body.error, "Select a file.");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// `GET /health` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    /// Service status (e.g., "ok")
    pub status: String,
    /// Module name
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
}
