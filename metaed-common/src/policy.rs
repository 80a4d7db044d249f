//! Field mutability policy
//!
//! Classifies metadata field names as read-only or editable. The policy is a
//! denylist: fields intrinsic to the file container or capture device (file
//! system attributes, sensor/encoding parameters, computed summaries) are
//! read-only, every other name is editable.

use std::collections::HashSet;

/// Fields that describe the container or capture device and cannot be rewritten
pub const READ_ONLY_FIELDS: &[&str] = &[
    "SourceFile",
    "Directory",
    "FileName",
    "FileSize",
    "FileModifyDate",
    "FileAccessDate",
    "FileInodeChangeDate",
    "FilePermissions",
    "FileType",
    "FileTypeExtension",
    "MIMEType",
    "ExifToolVersion",
    "ExifByteOrder",
    "EncodingProcess",
    "BitsPerSample",
    "ColorComponents",
    "YCbCrSubSampling",
    "ImageWidth",
    "ImageHeight",
    "ImageSize",
    "Megapixels",
];

/// Descriptive fields that are writable for most container formats
///
/// The engine offers these for editing even when a file does not carry them yet.
pub const COMMON_DESCRIPTIVE_FIELDS: &[&str] = &[
    "Artist",
    "Author",
    "Title",
    "Description",
    "Subject",
    "Keywords",
    "Copyright",
    "Creator",
    "Comment",
    "UserComment",
    "DateTimeOriginal",
    "CreateDate",
    "ModifyDate",
];

/// Read-only classification of field names
///
/// # Examples
///
/// ```
/// use metaed_common::FieldMutabilityPolicy;
///
/// let policy = FieldMutabilityPolicy::standard();
/// assert!(policy.is_read_only("ImageWidth"));
/// assert!(policy.is_read_only("File:FileSize"));
/// assert!(!policy.is_read_only("Make"));
/// ```
#[derive(Debug, Clone)]
pub struct FieldMutabilityPolicy {
    read_only: HashSet<String>,
}

impl FieldMutabilityPolicy {
    /// Policy with the built-in denylist
    pub fn standard() -> Self {
        Self {
            read_only: READ_ONLY_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Extend the denylist with additional names (e.g. from configuration)
    pub fn with_additional<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.read_only.extend(names.into_iter().map(Into::into));
        self
    }

    /// Whether `name` is read-only
    ///
    /// Group-prefixed names (`File:FileSize`) are classified by the name after the
    /// last `:`. Unknown names are editable.
    pub fn is_read_only(&self, name: &str) -> bool {
        if self.read_only.contains(name) {
            return true;
        }
        match name.rsplit_once(':') {
            Some((_, base)) => self.read_only.contains(base),
            None => false,
        }
    }

    /// Whether `name` may be rendered as an editable control
    pub fn is_editable(&self, name: &str) -> bool {
        !self.is_read_only(name)
    }
}

impl Default for FieldMutabilityPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Whether `name` (or its base name after a group prefix) is a common descriptive field
pub fn is_common_descriptive_field(name: &str) -> bool {
    let base = name.rsplit_once(':').map(|(_, b)| b).unwrap_or(name);
    COMMON_DESCRIPTIVE_FIELDS.contains(&base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_denylist() {
        let policy = FieldMutabilityPolicy::standard();
        for name in READ_ONLY_FIELDS {
            assert!(policy.is_read_only(name), "{} should be read-only", name);
        }
    }

    #[test]
    fn test_unknown_names_are_editable() {
        let policy = FieldMutabilityPolicy::standard();
        assert!(!policy.is_read_only("Make"));
        assert!(!policy.is_read_only(""));
        assert!(!policy.is_read_only("imagewidth"));
        assert!(policy.is_editable("Copyright"));
    }

    #[test]
    fn test_group_prefix_uses_base_name() {
        let policy = FieldMutabilityPolicy::standard();
        assert!(policy.is_read_only("EXIF:ImageWidth"));
        assert!(policy.is_read_only("System:File:FileSize"));
        assert!(!policy.is_read_only("EXIF:Make"));
        assert!(!policy.is_read_only("ImageWidth:"));
    }

    #[test]
    fn test_additional_names() {
        let policy = FieldMutabilityPolicy::standard().with_additional(["Software"]);
        assert!(policy.is_read_only("Software"));
        assert!(policy.is_read_only("ImageHeight"));
    }

    #[test]
    fn test_common_descriptive_fields() {
        assert!(is_common_descriptive_field("Artist"));
        assert!(is_common_descriptive_field("XMP:Title"));
        assert!(!is_common_descriptive_field("Make"));
    }
}
