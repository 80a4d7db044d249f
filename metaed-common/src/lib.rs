//! # MetaEdit Common Library
//!
//! Shared code for the MetaEdit session client and metadata engine:
//! - Wire types for the extract/modify endpoints
//! - Transport encoding of binary payloads
//! - Field mutability policy (read-only denylist)
//! - Event types (SessionEvent enum) and EventBus
//! - Configuration loading

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod policy;

pub use error::{Error, Result};
pub use policy::FieldMutabilityPolicy;
