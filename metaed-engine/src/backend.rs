//! Metadata backend abstraction
//!
//! The HTTP layer talks to this trait rather than to exiftool directly, so
//! handlers can run against an in-memory implementation.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::exiftool::ExifToolError;

/// Reads and writes metadata of a file on disk
#[async_trait]
pub trait MetadataBackend: Send + Sync {
    /// Every tag of the file, in the order the backend reports them
    async fn read(&self, path: &Path) -> Result<IndexMap<String, Value>, ExifToolError>;

    /// Write `tags` in place, returning diagnostic lines
    async fn write(
        &self,
        path: &Path,
        tags: &IndexMap<String, String>,
    ) -> Result<Vec<String>, ExifToolError>;

    /// Tag names the backend can write; empty when unknown
    async fn writable_tags(&self) -> HashSet<String>;
}
