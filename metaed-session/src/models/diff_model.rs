//! Original vs. edited metadata
//!
//! The diff model owns two independent mappings. `original` is set once per
//! extraction and never mutated afterwards; all edits land in `edited`. Change
//! status is always recomputed from the two mappings, never cached, so it
//! cannot go stale across an edit.

use super::metadata::{ChangeSet, MetadataMap};
use crate::error::{SessionError, SessionResult};

/// Result of a single field edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub key: String,
    /// Edited value differs from the original
    pub modified: bool,
    /// Any field differs from its original
    pub has_changes: bool,
}

/// Tracks original and edited metadata and derives diffs between them
#[derive(Debug, Clone, Default)]
pub struct MetadataDiffModel {
    original: MetadataMap,
    edited: MetadataMap,
}

impl MetadataDiffModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the original metadata and reset the working copy to it
    pub fn set_original(&mut self, map: MetadataMap) {
        self.edited = map.clone();
        self.original = map;
    }

    /// Start an edit from a fresh copy of the original
    ///
    /// Discards any working copy left behind by an earlier edit.
    pub fn begin_edit(&mut self) {
        self.edited = self.original.clone();
    }

    /// Set a field of the working copy
    ///
    /// Only keys present in the original are accepted.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> SessionResult<FieldChange> {
        if !self.original.contains_key(key) {
            return Err(SessionError::UnknownField(key.to_string()));
        }
        self.edited.insert(key, value);

        Ok(FieldChange {
            key: key.to_string(),
            modified: self.is_modified(key),
            has_changes: self.has_changes(),
        })
    }

    /// Whether the field's edited value differs from its original
    ///
    /// Absent values compare as the empty string.
    pub fn is_modified(&self, key: &str) -> bool {
        self.original.display_value(key) != self.edited.display_value(key)
    }

    /// Whether any original field is modified
    pub fn has_changes(&self) -> bool {
        self.original.keys().any(|k| self.is_modified(k))
    }

    /// Modified fields with their edited values, in original order
    pub fn change_set(&self) -> ChangeSet {
        self.original
            .keys()
            .filter(|k| self.is_modified(k))
            .map(|k| (k, self.edited.display_value(k)))
            .collect()
    }

    /// Reset the working copy to the original
    pub fn discard_edits(&mut self) {
        self.edited = self.original.clone();
    }

    /// Drop both mappings
    pub fn clear(&mut self) {
        self.original = MetadataMap::new();
        self.edited = MetadataMap::new();
    }

    pub fn original(&self) -> &MetadataMap {
        &self.original
    }

    pub fn edited(&self) -> &MetadataMap {
        &self.edited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> MetadataDiffModel {
        let mut model = MetadataDiffModel::new();
        model.set_original(
            [("Make", "Canon"), ("Model", "EOS R5"), ("Artist", "")]
                .into_iter()
                .collect(),
        );
        model
    }

    #[test]
    fn test_fresh_model_has_no_changes() {
        let model = sample();
        assert!(!model.has_changes());
        assert!(model.change_set().is_empty());
        assert_eq!(model.original(), model.edited());
    }

    #[test]
    fn test_set_field_reports_flags() {
        let mut model = sample();

        let change = model.set_field("Make", "Nikon").unwrap();
        assert_eq!(
            change,
            FieldChange {
                key: "Make".to_string(),
                modified: true,
                has_changes: true,
            }
        );
        assert!(model.is_modified("Make"));
        assert!(!model.is_modified("Model"));
        assert_eq!(model.original().get("Make"), Some("Canon"));
    }

    #[test]
    fn test_edit_back_to_original_is_unmodified() {
        let mut model = sample();
        model.set_field("Make", "Nikon").unwrap();

        let change = model.set_field("Make", "Canon").unwrap();
        assert!(!change.modified);
        assert!(!change.has_changes);
        assert!(model.change_set().is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut model = sample();
        let err = model.set_field("LensModel", "50mm").unwrap_err();
        assert!(matches!(err, SessionError::UnknownField(ref k) if k == "LensModel"));
        assert!(!model.edited().contains_key("LensModel"));
    }

    #[test]
    fn test_change_set_only_modified_in_original_order() {
        let mut model = sample();
        model.set_field("Artist", "Jane").unwrap();
        model.set_field("Make", "Nikon").unwrap();

        let changes = model.change_set();
        assert_eq!(changes.keys().collect::<Vec<_>>(), vec!["Make", "Artist"]);
        assert_eq!(changes.get("Artist"), Some("Jane"));
    }

    #[test]
    fn test_discard_and_begin_edit_reset_working_copy() {
        let mut model = sample();
        model.set_field("Make", "Nikon").unwrap();
        model.discard_edits();
        assert!(!model.has_changes());

        model.set_field("Model", "Z9").unwrap();
        model.begin_edit();
        assert_eq!(model.edited(), model.original());
    }

    #[test]
    fn test_set_original_does_not_alias() {
        let mut model = sample();
        model.set_field("Make", "Nikon").unwrap();
        assert_eq!(model.original().get("Make"), Some("Canon"));

        model.set_original([("Title", "Sunset")].into_iter().collect());
        assert!(!model.has_changes());
        assert_eq!(model.edited().get("Title"), Some("Sunset"));
        assert!(!model.edited().contains_key("Make"));
    }

    #[test]
    fn test_clear() {
        let mut model = sample();
        model.clear();
        assert!(model.original().is_empty());
        assert!(model.edited().is_empty());
    }

    fn field_names() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[A-Za-z]{1,8}", 1..8)
    }

    proptest! {
        #[test]
        fn prop_has_changes_matches_change_set(
            names in field_names(),
            edits in proptest::collection::vec((0usize..8, "[a-c]{0,2}"), 0..16),
        ) {
            let mut model = MetadataDiffModel::new();
            model.set_original(names.iter().map(|n| (n.clone(), "a".to_string())).collect());

            for (index, value) in edits {
                let key = &names[index % names.len()];
                let change = model.set_field(key, value.clone()).unwrap();
                prop_assert_eq!(change.modified, value != "a");
                prop_assert_eq!(change.has_changes, model.has_changes());
                prop_assert_eq!(model.has_changes(), !model.change_set().is_empty());
            }

            for key in model.original().keys() {
                prop_assert_eq!(model.is_modified(key), model.change_set().contains_key(key));
            }
        }
    }
}
