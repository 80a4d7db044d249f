//! Upload staging
//!
//! Uploaded bytes are written to a named temporary file so the backend can
//! work on a real path. The file is removed when the [`StagedUpload`] drops,
//! whatever the outcome of the request.

use std::path::Path;
use tempfile::NamedTempFile;

/// Suffix used when the upload name has no extension
pub const DEFAULT_SUFFIX: &str = ".bin";

/// Reduce an uploaded file name to a safe ASCII name
///
/// Path separators and whitespace runs become `_`, characters outside
/// `[A-Za-z0-9._-]` are dropped, and leading/trailing `.`/`_` are stripped.
///
/// # Examples
///
/// ```
/// use metaed_engine::services::sanitize_filename;
///
/// assert_eq!(sanitize_filename("My Photo (1).jpg"), "My_Photo_1.jpg");
/// assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Extension of a sanitized name including the dot, or [`DEFAULT_SUFFIX`]
pub fn upload_suffix(safe_name: &str) -> String {
    match safe_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => format!(".{}", ext),
        _ => DEFAULT_SUFFIX.to_string(),
    }
}

/// An upload written to a temporary file
pub struct StagedUpload {
    filename: String,
    file: NamedTempFile,
}

impl StagedUpload {
    /// Sanitize `original_name` and write `bytes` to a fresh temporary file
    pub async fn stage(original_name: &str, bytes: &[u8]) -> std::io::Result<Self> {
        let filename = sanitize_filename(original_name);
        let file = tempfile::Builder::new()
            .prefix("metaed-")
            .suffix(&upload_suffix(&filename))
            .tempfile()?;
        tokio::fs::write(file.path(), bytes).await?;
        Ok(Self { filename, file })
    }

    /// Sanitized upload name
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Current contents of the staged file
    pub async fn read_back(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.file.path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_filename("  summer   trip.png "), "summer_trip.png");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename("café.jpg"), "caf.jpg");
        assert_eq!(sanitize_filename("C:\\Users\\me\\scan.tiff"), "C_Users_me_scan.tiff");
        assert_eq!(sanitize_filename("日本"), "");
    }

    #[test]
    fn test_upload_suffix() {
        assert_eq!(upload_suffix("photo.jpg"), ".jpg");
        assert_eq!(upload_suffix("archive.tar.gz"), ".gz");
        assert_eq!(upload_suffix("README"), ".bin");
        assert_eq!(upload_suffix(""), ".bin");
        assert_eq!(upload_suffix("trailing."), ".bin");
    }

    #[tokio::test]
    async fn test_staged_file_removed_on_drop() {
        let staged = StagedUpload::stage("my photo.jpg", b"\xff\xd8data").await.unwrap();
        let path = staged.path().to_path_buf();

        assert_eq!(staged.filename(), "my_photo.jpg");
        assert!(path.to_string_lossy().ends_with(".jpg"));
        assert_eq!(staged.read_back().await.unwrap(), b"\xff\xd8data");

        drop(staged);
        assert!(!path.exists());
    }
}
