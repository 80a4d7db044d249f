//! Common error types for MetaEdit

use thiserror::Error;

/// Common result type for MetaEdit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the session client and the engine
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Binary payload could not be decoded from its transport text
    #[error("Payload decode error: {0}")]
    Payload(String),
}
