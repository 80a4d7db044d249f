//! Client-visible downloads
//!
//! Two artifacts leave a session: the JSON export of the displayed metadata
//! (`<stem>_metadata.json`) and the engine-modified file
//! (`<stem>_modified<ext>`). `<stem>` is the filename without its final
//! extension, or [`FALLBACK_STEM`] when that leaves nothing.

use std::path::{Path, PathBuf};

use crate::models::MetadataMap;

/// Stem used when the filename is empty or is only an extension
pub const FALLBACK_STEM: &str = "file";

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// Split `name` into (stem, final extension including the dot)
///
/// An extension is a dot followed by at least one non-dot character at the
/// end of the name.
///
/// # Examples
///
/// ```
/// use metaed_session::services::download::split_extension;
///
/// assert_eq!(split_extension("photo.jpg"), ("photo", ".jpg"));
/// assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
/// assert_eq!(split_extension("README"), ("README", ""));
/// assert_eq!(split_extension("trailing."), ("trailing.", ""));
/// ```
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i + 1 < name.len() => name.split_at(i),
        _ => (name, ""),
    }
}

/// Filename stem with fallback
pub fn file_stem(name: &str) -> &str {
    match split_extension(name).0 {
        "" => FALLBACK_STEM,
        stem => stem,
    }
}

/// Name of the JSON metadata export
pub fn metadata_json_name(name: &str) -> String {
    format!("{}_metadata.json", file_stem(name))
}

/// Name of the modified file download
pub fn modified_file_name(name: &str) -> String {
    format!("{}_modified{}", file_stem(name), split_extension(name).1)
}

/// A file ready to be handed to the user
#[derive(Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl DownloadArtifact {
    /// Pretty-printed JSON export of `metadata`
    pub fn json_export(source_name: &str, metadata: &MetadataMap) -> serde_json::Result<Self> {
        Ok(Self {
            filename: metadata_json_name(source_name),
            content_type: JSON_CONTENT_TYPE,
            bytes: metadata.to_pretty_json()?.into_bytes(),
        })
    }

    /// Modified copy of the source file
    pub fn modified_file(source_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: modified_file_name(source_name),
            content_type: BINARY_CONTENT_TYPE,
            bytes,
        }
    }

    /// Write into `dir` under the artifact's filename
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

impl std::fmt::Debug for DownloadArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadArtifact")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_for_regular_file() {
        assert_eq!(metadata_json_name("photo.jpg"), "photo_metadata.json");
        assert_eq!(modified_file_name("photo.jpg"), "photo_modified.jpg");
    }

    #[test]
    fn test_names_without_extension() {
        assert_eq!(metadata_json_name("scan"), "scan_metadata.json");
        assert_eq!(modified_file_name("scan"), "scan_modified");
    }

    #[test]
    fn test_fallback_stem() {
        assert_eq!(metadata_json_name(""), "file_metadata.json");
        assert_eq!(modified_file_name(""), "file_modified");
        assert_eq!(modified_file_name(".jpg"), "file_modified.jpg");
    }

    #[test]
    fn test_only_final_extension_removed() {
        assert_eq!(modified_file_name("my.holiday.png"), "my.holiday_modified.png");
    }

    #[test]
    fn test_json_export_round_trips() {
        let map: MetadataMap = [("Make", "Canon"), ("ImageWidth", "4000")].into_iter().collect();
        let artifact = DownloadArtifact::json_export("photo.jpg", &map).unwrap();

        assert_eq!(artifact.filename, "photo_metadata.json");
        assert_eq!(artifact.content_type, JSON_CONTENT_TYPE);
        let parsed: MetadataMap = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = DownloadArtifact::modified_file("photo.jpg", vec![1, 2, 3]);
        let path = artifact.write_to(dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), "photo_modified.jpg");
        assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
    }
}
