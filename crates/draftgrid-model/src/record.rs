//! Fetched records and decorated rows

use crate::column::{ColumnDef, ColumnKind};
use crate::ids::RecordId;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record as returned by the fetch collaborator
///
/// Related-record fields are flattened with dotted keys (`Account.Name`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record identity
    pub id: RecordId,
    /// Field values
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Create a record with no fields
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// With a field value
    #[inline]
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// Edit-state annotation of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellClass {
    /// Editable, no pending change
    Clean,
    /// Popup open on the cell, no pending change yet
    Editing,
    /// A draft exists for the cell
    Dirty,
    /// Nothing to edit (e.g. an empty lookup)
    Hidden,
}

/// A decorated row owned by the grid controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Record identity
    pub id: RecordId,
    /// Current field values
    pub fields: BTreeMap<String, FieldValue>,
    /// Derived record links, keyed by column field
    pub links: BTreeMap<String, String>,
    /// Derived display names for lookup fields
    pub display_names: BTreeMap<String, String>,
    /// Cell annotations, keyed by field
    pub classes: BTreeMap<String, CellClass>,
}

impl Row {
    /// Decorate a fetched record for display under `columns`
    ///
    /// - url columns link to the record itself
    /// - lookup columns link to the referenced record and copy its display
    ///   name; an empty lookup is [`CellClass::Hidden`]
    /// - choice columns start [`CellClass::Clean`]
    #[must_use]
    pub fn decorate(record: Record, columns: &[ColumnDef]) -> Self {
        let mut row = Self {
            id: record.id,
            fields: record.fields,
            links: BTreeMap::new(),
            display_names: BTreeMap::new(),
            classes: BTreeMap::new(),
        };

        for column in columns {
            let field = column.field_name.clone();
            match &column.kind {
                ColumnKind::Url { .. } => {
                    row.links.insert(field, row.id.link());
                }
                ColumnKind::Lookup { display_field, .. } => {
                    let target = row
                        .fields
                        .get(&field)
                        .filter(|v| !v.is_empty())
                        .map(ToString::to_string);
                    if let Some(target) = target {
                        let name = row
                            .fields
                            .get(display_field)
                            .map(ToString::to_string)
                            .unwrap_or_default();
                        row.links.insert(field.clone(), format!("/{target}"));
                        row.display_names.insert(field.clone(), name);
                        row.classes.insert(field, CellClass::Clean);
                    } else {
                        row.classes.insert(field, CellClass::Hidden);
                    }
                }
                ColumnKind::Choice { .. } => {
                    row.classes.insert(field, CellClass::Clean);
                }
                ColumnKind::Text | ColumnKind::DateLocal => {}
            }
        }

        row
    }

    /// Get a field value
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Get a cell annotation
    #[inline]
    #[must_use]
    pub fn class(&self, field: &str) -> Option<CellClass> {
        self.classes.get(field).copied()
    }

    /// Set a cell annotation
    #[inline]
    pub fn set_class(&mut self, field: impl Into<String>, class: CellClass) {
        self.classes.insert(field.into(), class);
    }

    /// Remove a cell annotation
    #[inline]
    pub fn clear_class(&mut self, field: &str) {
        self.classes.remove(field);
    }

    /// Write field changes into the row
    pub fn apply<'a>(&mut self, changes: impl IntoIterator<Item = (&'a String, &'a FieldValue)>) {
        for (field, value) in changes {
            self.fields.insert(field.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::opportunity_columns;
    use pretty_assertions::assert_eq;

    fn record_with_account() -> Record {
        Record::new("006A")
            .with_field("Name", "Big deal")
            .with_field("StageName", "Open")
            .with_field("AccountId", "001X")
            .with_field("Account.Name", "Acme")
    }

    #[test]
    fn decorate_links_and_names() {
        let row = Row::decorate(record_with_account(), &opportunity_columns());

        assert_eq!(row.links.get("linkName").map(String::as_str), Some("/006A"));
        assert_eq!(row.links.get("AccountId").map(String::as_str), Some("/001X"));
        assert_eq!(row.display_names.get("AccountId").map(String::as_str), Some("Acme"));
        assert_eq!(row.class("AccountId"), Some(CellClass::Clean));
    }

    #[test]
    fn decorate_empty_lookup_hidden() {
        let record = Record::new("006B").with_field("StageName", "Open");
        let row = Row::decorate(record, &opportunity_columns());

        assert_eq!(row.class("AccountId"), Some(CellClass::Hidden));
        assert!(row.links.get("AccountId").is_none());
    }

    #[test]
    fn decorate_lookup_without_display_field() {
        let record = Record::new("006C").with_field("AccountId", "001Y");
        let row = Row::decorate(record, &opportunity_columns());
        assert_eq!(row.display_names.get("AccountId").map(String::as_str), Some(""));
    }

    #[test]
    fn decorate_choice_clean() {
        let mut columns = opportunity_columns();
        columns.push(crate::column::ColumnDef::choice("Stage", "StageName", vec![]));
        let row = Row::decorate(record_with_account(), &columns);
        assert_eq!(row.class("StageName"), Some(CellClass::Clean));
    }

    #[test]
    fn apply_changes() {
        let mut row = Row::decorate(record_with_account(), &opportunity_columns());
        let mut changes = BTreeMap::new();
        changes.insert("StageName".to_string(), FieldValue::from("Won"));
        row.apply(&changes);
        assert_eq!(row.field("StageName"), Some(&FieldValue::from("Won")));
    }
}
