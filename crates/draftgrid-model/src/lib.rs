//! draftgrid data model
//!
//! Plain data shared by every layer of the grid:
//!
//! - [`RecordId`] and [`FieldValue`]: identity and cell values
//! - [`Record`]: a row as delivered by the fetch collaborator
//! - [`Row`]: a decorated row owned by the controller (links, display names, [`CellClass`] annotations)
//! - [`ColumnDef`]: the externally supplied column schema
//! - [`DraftEntry`] / [`DraftStore`]: the overlay of unsaved edits
//!
//! # Example
//!
//! ```rust
//! use draftgrid_model::{DraftStore, FieldValue, RecordId};
//!
//! let mut drafts = DraftStore::new();
//! let id = RecordId::new("006A");
//! drafts.upsert(&id, [("StageName".to_string(), FieldValue::from("Won"))]);
//! drafts.upsert(&id, [("AccountId".to_string(), FieldValue::from("001X"))]);
//!
//! assert_eq!(drafts.len(), 1);
//! assert!(drafts.contains_field(&id, "AccountId"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod column;
pub mod draft;
pub mod error;
pub mod ids;
pub mod record;
pub mod value;

pub use column::{insert_choice_column, opportunity_columns, ChoiceOption, ColumnDef, ColumnKind};
pub use draft::{DraftEntry, DraftStore};
pub use error::ModelError;
pub use ids::RecordId;
pub use record::{CellClass, Record, Row};
pub use value::FieldValue;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
