//! Transport encoding for binary payloads
//!
//! The modified file travels inside a JSON body as standard base64 text. The
//! decode must be byte-exact: any malformed input is an error, never a
//! partially decoded file.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::{Error, Result};

/// Encode raw bytes as transport text
pub fn encode_payload(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode transport text back to raw bytes
///
/// Surrounding whitespace is tolerated; anything else that is not valid
/// standard base64 is rejected.
pub fn decode_payload(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| Error::Payload(e.to_string()))
}
