//! Draft overlay of unsaved edits
//!
//! [`DraftStore`] holds at most one [`DraftEntry`] per row. Edits to a row
//! that already has an entry are merged into it, later fields winning, so
//! interleaved edits across rows and repeated edits to one field never
//! produce duplicates.

use crate::ids::RecordId;
use crate::value::FieldValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pending edits for one row: `{ Id, ...changed fields }`
///
/// Serializes flat, which is the shape handed to the persist collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEntry {
    /// Row the edits belong to
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Changed fields
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl DraftEntry {
    /// Entry with no changed fields
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// With a changed field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// Ordered, id-unique collection of draft entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftStore {
    entries: IndexMap<RecordId, BTreeMap<String, FieldValue>>,
}

impl DraftStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `changes` into the entry for `id`, creating it if needed
    pub fn upsert(&mut self, id: &RecordId, changes: impl IntoIterator<Item = (String, FieldValue)>) {
        let fields = self.entries.entry(id.clone()).or_default();
        for (field, value) in changes {
            fields.insert(field, value);
        }
    }

    /// Merge a whole entry
    #[inline]
    pub fn upsert_entry(&mut self, entry: DraftEntry) {
        self.upsert(&entry.id, entry.fields);
    }

    /// Changed fields of one row
    #[inline]
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&BTreeMap<String, FieldValue>> {
        self.entries.get(id)
    }

    /// Whether `id` has a pending change to `field`
    #[inline]
    #[must_use]
    pub fn contains_field(&self, id: &RecordId, field: &str) -> bool {
        self.entries.get(id).is_some_and(|fields| fields.contains_key(field))
    }

    /// All entries in first-edit order, for submission
    #[must_use]
    pub fn all(&self) -> Vec<DraftEntry> {
        self.entries
            .iter()
            .map(|(id, fields)| DraftEntry {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect()
    }

    /// Drop every entry
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of rows with drafts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn change(field: &str, value: &str) -> [(String, FieldValue); 1] {
        [(field.to_string(), FieldValue::from(value))]
    }

    #[test]
    fn upsert_creates_entry() {
        let mut drafts = DraftStore::new();
        drafts.upsert(&RecordId::new("1"), change("StageName", "Won"));

        assert_eq!(
            drafts.all(),
            vec![DraftEntry::new("1").with_field("StageName", "Won")]
        );
    }

    #[test]
    fn upsert_merges_fields_of_same_row() {
        let mut drafts = DraftStore::new();
        let id = RecordId::new("1");
        drafts.upsert(&id, change("StageName", "A"));
        drafts.upsert(&id, change("AccountId", "X"));

        assert_eq!(
            drafts.all(),
            vec![DraftEntry::new("1")
                .with_field("StageName", "A")
                .with_field("AccountId", "X")]
        );
    }

    #[test]
    fn later_value_wins() {
        let mut drafts = DraftStore::new();
        let id = RecordId::new("1");
        drafts.upsert(&id, change("StageName", "A"));
        drafts.upsert(&id, change("StageName", "B"));

        assert_eq!(drafts.len(), 1);
        assert_eq!(
            drafts.get(&id).and_then(|f| f.get("StageName")),
            Some(&FieldValue::from("B"))
        );
    }

    #[test]
    fn order_follows_first_edit() {
        let mut drafts = DraftStore::new();
        drafts.upsert(&RecordId::new("2"), change("StageName", "A"));
        drafts.upsert(&RecordId::new("1"), change("StageName", "B"));
        drafts.upsert(&RecordId::new("2"), change("AccountId", "X"));

        let ids: Vec<_> = drafts.all().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![RecordId::new("2"), RecordId::new("1")]);
    }

    #[test]
    fn clear_empties() {
        let mut drafts = DraftStore::new();
        drafts.upsert_entry(DraftEntry::new("1").with_field("Amount", 10.0));
        drafts.clear();
        assert!(drafts.is_empty());
        assert!(!drafts.contains_field(&RecordId::new("1"), "Amount"));
    }

    #[test]
    fn entry_serializes_flat() {
        let entry = DraftEntry::new("006A").with_field("StageName", "Won");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({ "Id": "006A", "StageName": "Won" }));

        let back: DraftEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
