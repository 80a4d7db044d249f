//! exiftool process wrapper
//!
//! Runs the external `exiftool` program for reading (`-j -s`), writing
//! (`-overwrite_original -TAG=VALUE`) and listing writable tags (`-listw`).
//! Every invocation is bounded by the configured timeout; the child is killed
//! when the timeout fires.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, error};

use crate::backend::MetadataBackend;

/// exiftool invocation failures
///
/// Display strings are shown to the end user verbatim.
#[derive(Debug, Error)]
pub enum ExifToolError {
    /// Executable not found
    #[error("exiftool was not found on the server.")]
    NotFound,

    #[error("Metadata extraction timed out.")]
    ReadTimeout,

    #[error("Metadata write timed out.")]
    WriteTimeout,

    /// Non-zero (read) or fatal (write) exit; carries stderr or a fallback message
    #[error("{0}")]
    Failed(String),

    #[error("Invalid exiftool output.")]
    InvalidOutput,

    #[error("exiftool I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle on the exiftool executable
pub struct ExifTool {
    program: PathBuf,
    timeout: Duration,
    writable_tags: OnceCell<HashSet<String>>,
}

impl ExifTool {
    /// `program` is a name looked up on `PATH` or an absolute path
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            writable_tags: OnceCell::new(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run<I, S>(&self, args: I, on_timeout: ExifToolError) -> Result<Output, ExifToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Err(_) => Err(on_timeout),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(ExifToolError::NotFound),
            Ok(Err(e)) => Err(ExifToolError::Io(e)),
            Ok(Ok(output)) => Ok(output),
        }
    }

    /// Read every tag of `path` as `-j -s` JSON (short tag names)
    pub async fn read(&self, path: &Path) -> Result<IndexMap<String, Value>, ExifToolError> {
        let output = self
            .run(
                [OsStr::new("-j"), OsStr::new("-s"), path.as_os_str()],
                ExifToolError::ReadTimeout,
            )
            .await?;

        if !output.status.success() {
            return Err(ExifToolError::Failed(stderr_or(&output, "exiftool failed.")));
        }

        parse_read_output(&output.stdout)
    }

    /// Write `tags` into `path` in place
    ///
    /// Returns the non-empty stderr lines as warnings. Exit code 1 (minor
    /// errors) is tolerated; anything higher is fatal.
    pub async fn write(
        &self,
        path: &Path,
        tags: &IndexMap<String, String>,
    ) -> Result<Vec<String>, ExifToolError> {
        let mut args: Vec<OsString> = Vec::with_capacity(tags.len() + 2);
        args.push("-overwrite_original".into());
        args.extend(tags.iter().map(|(tag, value)| format!("-{}={}", tag, value).into()));
        args.push(path.as_os_str().to_owned());

        let output = self.run(args, ExifToolError::WriteTimeout).await?;

        let warnings: Vec<String> = String::from_utf8_lossy(&output.stderr)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        for warning in &warnings {
            debug!("exiftool write: {}", warning);
        }

        match output.status.code() {
            Some(0) | Some(1) => Ok(warnings),
            _ => Err(ExifToolError::Failed(stderr_or(
                &output,
                "Failed to write metadata.",
            ))),
        }
    }

    /// Tag names exiftool can write (`-listw`)
    pub async fn list_writable(&self) -> Result<HashSet<String>, ExifToolError> {
        let output = self.run(["-listw"], ExifToolError::ReadTimeout).await?;
        if !output.status.success() {
            return Err(ExifToolError::Failed(stderr_or(&output, "exiftool failed.")));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }
}

#[async_trait]
impl MetadataBackend for ExifTool {
    async fn read(&self, path: &Path) -> Result<IndexMap<String, Value>, ExifToolError> {
        ExifTool::read(self, path).await
    }

    async fn write(
        &self,
        path: &Path,
        tags: &IndexMap<String, String>,
    ) -> Result<Vec<String>, ExifToolError> {
        ExifTool::write(self, path, tags).await
    }

    /// Cached for the process lifetime once fetched; a failed fetch is not cached
    async fn writable_tags(&self) -> HashSet<String> {
        match self
            .writable_tags
            .get_or_try_init(|| self.list_writable())
            .await
        {
            Ok(tags) => tags.clone(),
            Err(e) => {
                error!("Error fetching writable tags: {}", e);
                HashSet::new()
            }
        }
    }
}

/// First object of exiftool's JSON array (empty when the array is empty)
fn parse_read_output(stdout: &[u8]) -> Result<IndexMap<String, Value>, ExifToolError> {
    let mut records: Vec<IndexMap<String, Value>> =
        serde_json::from_slice(stdout).map_err(|_| ExifToolError::InvalidOutput)?;
    if records.is_empty() {
        return Ok(IndexMap::new());
    }
    Ok(records.swap_remove(0))
}

fn stderr_or(output: &Output, fallback: &str) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
