//! Catalog items and the persisted snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One extension from the catalog with its download count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    /// Extension name, unique within a fetch
    pub name: String,

    /// Downloads reported by the catalog
    pub download_count: u64,
}

impl Item {
    pub fn new(name: impl Into<String>, download_count: u64) -> Self {
        Self {
            name: name.into(),
            download_count,
        }
    }
}

/// Last persisted download count per extension name.
///
/// Serialized as a flat JSON object; `BTreeMap` keeps key order stable
/// across writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, u64>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from the current fetch.
    pub fn from_items(items: &[Item]) -> Self {
        items
            .iter()
            .map(|item| (item.name.clone(), item.download_count))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.0.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, download_count: u64) {
        self.0.insert(name.into(), download_count);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all recorded downloads.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

impl FromIterator<(String, u64)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_items() {
        let items = vec![Item::new("B", 5), Item::new("A", 15)];
        let snapshot = Snapshot::from_items(&items);
        assert_eq!(snapshot.get("A"), Some(15));
        assert_eq!(snapshot.get("B"), Some(5));
        assert_eq!(snapshot.get("C"), None);
        assert_eq!(snapshot.total(), 20);
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("b-ext", 2);
        snapshot.insert("a-ext", 1);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"a-ext":1,"b-ext":2}"#);

        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_rejects_negative_counts() {
        assert!(serde_json::from_str::<Snapshot>(r#"{"a": -1}"#).is_err());
        assert!(serde_json::from_str::<Snapshot>(r#"["a"]"#).is_err());
    }
}
