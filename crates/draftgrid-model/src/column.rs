//! Column schema
//!
//! The schema is supplied by the host. [`opportunity_columns`] is the stock
//! layout; the choice column is spliced in later, once its options are known.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// One selectable value of a choice list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Label shown to the user
    pub label: String,
    /// Stored value
    pub value: String,
}

impl ChoiceOption {
    /// Option whose label and value are the same
    #[inline]
    #[must_use]
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// How a column renders and edits its cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnKind {
    /// Link to the row's own record, labelled by another field
    Url {
        /// Field holding the link label
        label_field: String,
    },
    /// Reference to another record, edited with a lookup popup
    Lookup {
        /// Dotted path of the related display field, e.g. `Account.Name`
        display_field: String,
        /// Object the lookup field belongs to
        object: String,
        /// Placeholder text
        placeholder: String,
    },
    /// Value from a fixed list, edited with a choice popup
    Choice {
        /// Selectable options
        options: Vec<ChoiceOption>,
        /// Placeholder text
        placeholder: String,
    },
    /// Free text edited inline by the grid
    Text,
    /// Local date edited inline by the grid
    DateLocal,
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Header label
    pub label: String,
    /// Row field shown in the column
    pub field_name: String,
    /// Render/edit kind
    pub kind: ColumnKind,
    /// Whether the grid edits the cell inline
    #[serde(default)]
    pub editable: bool,
}

impl ColumnDef {
    /// Create a non-editable column
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, field_name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            label: label.into(),
            field_name: field_name.into(),
            kind,
            editable: false,
        }
    }

    /// Mark as inline-editable
    #[inline]
    #[must_use]
    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// Choice column for `field_name`
    #[must_use]
    pub fn choice(
        label: impl Into<String>,
        field_name: impl Into<String>,
        options: Vec<ChoiceOption>,
    ) -> Self {
        let label = label.into();
        let placeholder = format!("Choose {label}");
        Self::new(label, field_name, ColumnKind::Choice { options, placeholder })
    }

    /// Whether cells are edited through a popup editor
    #[inline]
    #[must_use]
    pub fn uses_popup_editor(&self) -> bool {
        matches!(self.kind, ColumnKind::Lookup { .. } | ColumnKind::Choice { .. })
    }
}

/// Default opportunity layout: name link, account lookup, amount, close date
#[must_use]
pub fn opportunity_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new(
            "Opportunity Name",
            "linkName",
            ColumnKind::Url {
                label_field: "Name".to_string(),
            },
        ),
        ColumnDef::new(
            "Account Name",
            "AccountId",
            ColumnKind::Lookup {
                display_field: "Account.Name".to_string(),
                object: "Opportunity".to_string(),
                placeholder: "Choose Account".to_string(),
            },
        ),
        ColumnDef::new("Amount", "Amount", ColumnKind::Text).editable(),
        ColumnDef::new("Close Date", "CloseDate", ColumnKind::DateLocal).editable(),
    ]
}

/// Splice a choice column into the schema at `index`
///
/// A column for the same field is replaced in place instead of being added
/// twice. Returns `true` when a new column was inserted.
///
/// # Errors
/// `ModelError::ColumnOutOfRange` if `index` is past the end of the schema.
pub fn insert_choice_column(
    columns: &mut Vec<ColumnDef>,
    index: usize,
    column: ColumnDef,
) -> Result<bool, ModelError> {
    if let Some(existing) = columns.iter_mut().find(|c| c.field_name == column.field_name) {
        *existing = column;
        return Ok(false);
    }
    if index > columns.len() {
        return Err(ModelError::ColumnOutOfRange {
            index,
            len: columns.len(),
        });
    }
    columns.insert(index, column);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_column() -> ColumnDef {
        ColumnDef::choice(
            "Stage",
            "StageName",
            vec![ChoiceOption::plain("Open"), ChoiceOption::plain("Won")],
        )
    }

    #[test]
    fn default_layout() {
        let columns = opportunity_columns();
        assert_eq!(columns.len(), 4);
        assert!(columns[1].uses_popup_editor());
        assert!(columns[2].editable);
        assert!(!columns[0].editable);
    }

    #[test]
    fn choice_column_spliced_at_index() {
        let mut columns = opportunity_columns();
        assert_eq!(insert_choice_column(&mut columns, 2, stage_column()), Ok(true));
        assert_eq!(columns[2].field_name, "StageName");
        assert_eq!(columns.len(), 5);
    }

    #[test]
    fn choice_column_inserted_once() {
        let mut columns = opportunity_columns();
        insert_choice_column(&mut columns, 2, stage_column()).unwrap();
        let inserted = insert_choice_column(&mut columns, 2, stage_column()).unwrap();
        assert!(!inserted);
        assert_eq!(columns.len(), 5);
    }

    #[test]
    fn choice_column_out_of_range() {
        let mut columns = opportunity_columns();
        let err = insert_choice_column(&mut columns, 9, stage_column()).unwrap_err();
        assert_eq!(err, ModelError::ColumnOutOfRange { index: 9, len: 4 });
    }

    #[test]
    fn choice_placeholder() {
        match stage_column().kind {
            ColumnKind::Choice { placeholder, .. } => assert_eq!(placeholder, "Choose Stage"),
            other => panic!("unexpected kind {other:?}"),
        }
    }
}
