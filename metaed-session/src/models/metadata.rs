//! Metadata mappings
//!
//! [`MetadataMap`] holds field name → display string in extraction order.
//! [`ChangeSet`] is the minimal subset of fields whose edited value differs
//! from the original.

use indexmap::IndexMap;
use metaed_common::FieldMutabilityPolicy;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use metaed_common::api::coerce_value;

/// Field name → value mapping in extraction order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetadataMap(IndexMap<String, String>);

impl MetadataMap {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Build from raw engine values, coercing each to a string
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Self(
            values
                .into_iter()
                .map(|(k, v)| (k, coerce_value(&v)))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value for display and comparison: absent keys read as the empty string
    pub fn display_value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or replace; a new key is appended at the end of the order
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pretty-printed (2-space indent) JSON document of the mapping
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.0)
    }
}

impl<'de> Deserialize<'de> for MetadataMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_values(raw))
    }
}

impl<K, V> FromIterator<(K, V)> for MetadataMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Fields to rewrite, mapped to their new values
///
/// Built fresh for each submission and never persisted. Serializes as a flat
/// JSON object, which is the shape the modification endpoint expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet(IndexMap<String, String>);

impl ChangeSet {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove every key the policy classifies read-only
    ///
    /// Returns the names that were removed, in change-set order.
    pub fn strip_read_only(&mut self, policy: &FieldMutabilityPolicy) -> Vec<String> {
        let stripped: Vec<String> = self
            .0
            .keys()
            .filter(|k| policy.is_read_only(k))
            .cloned()
            .collect();
        self.0.retain(|k, _| !policy.is_read_only(k));
        stripped
    }

    /// Serialized form sent alongside the file
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }
}

impl<K, V> FromIterator<(K, V)> for ChangeSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_scalars() {
        assert_eq!(coerce_value(&Value::Null), "");
        assert_eq!(coerce_value(&json!("Canon")), "Canon");
        assert_eq!(coerce_value(&json!(4000)), "4000");
        assert_eq!(coerce_value(&json!(2.8)), "2.8");
        assert_eq!(coerce_value(&json!(true)), "true");
    }

    #[test]
    fn test_coerce_compound() {
        assert_eq!(coerce_value(&json!(["travel", "beach", 3])), "travel,beach,3");
        assert_eq!(coerce_value(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_deserialize_coerces_and_keeps_order() {
        let map: MetadataMap =
            serde_json::from_value(json!({"Make": "Canon", "ImageWidth": 4000, "Artist": null}))
                .unwrap();

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Make", "ImageWidth", "Artist"]);
        assert_eq!(map.get("ImageWidth"), Some("4000"));
        assert_eq!(map.get("Artist"), Some(""));
        assert_eq!(map.display_value("Missing"), "");
    }

    #[test]
    fn test_pretty_json_uses_two_space_indent() {
        let map: MetadataMap = [("Make", "Canon"), ("Model", "EOS R5")].into_iter().collect();
        assert_eq!(
            map.to_pretty_json().unwrap(),
            "{\n  \"Make\": \"Canon\",\n  \"Model\": \"EOS R5\"\n}"
        );
    }

    #[test]
    fn test_strip_read_only() {
        let policy = FieldMutabilityPolicy::standard();
        let mut changes: ChangeSet = [("ImageWidth", "1"), ("Make", "Nikon"), ("FileSize", "2")]
            .into_iter()
            .collect();

        let stripped = changes.strip_read_only(&policy);

        assert_eq!(stripped, vec!["ImageWidth".to_string(), "FileSize".to_string()]);
        assert_eq!(changes.keys().collect::<Vec<_>>(), vec!["Make"]);
        assert_eq!(changes.to_json().unwrap(), r#"{"Make":"Nikon"}"#);
    }
}
