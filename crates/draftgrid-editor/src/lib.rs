//! draftgrid cell editors
//!
//! Popup-capable editors bound to one field of one row, and the machinery
//! that keeps at most one of them open.
//!
//! # Core Concepts
//!
//! - [`CellEditor`]: the editor capability (mount/open/confirm/blur/reset)
//! - [`ChoiceEditor`]: pick a value from a fixed list
//! - [`LookupEditor`]: reference another record, with a resolved display name
//! - [`EditorRegistry`]: live editors by kind and instance, dismissal broadcasts
//! - [`DismissalCoordinator`]: turns outside interactions into broadcasts
//! - [`RecordResolver`] / [`CachedResolver`]: display-name lookups for lookups
//!
//! # Example
//!
//! ```rust
//! use draftgrid_editor::{CellBinding, CellEditor, ChoiceEditor, ContextToken, EditorRegistry, EditorSignal};
//! use draftgrid_model::{ChoiceOption, FieldValue, RecordId};
//!
//! let registry = EditorRegistry::new();
//! let mut editor = ChoiceEditor::new(
//!     CellBinding::new("006A", "Stage", "Stage"),
//!     vec![ChoiceOption::plain("Open"), ChoiceOption::plain("Won")],
//!     FieldValue::from("Open"),
//! );
//!
//! if let Some(EditorSignal::Register(registration)) = editor.mount() {
//!     registry.register(registration);
//! }
//! editor.open();
//! registry.broadcast_reset_all(&ContextToken::ResetAll);
//! assert!(!editor.is_open());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod choice;
mod dismissal;
mod editor;
mod error;
mod lookup;
mod popup;
mod registry;
mod resolver;
mod signal;

pub use choice::ChoiceEditor;
pub use dismissal::{DismissalCoordinator, Interaction, InteractionHub, Subscription};
pub use editor::{CellBinding, CellEditor, EditorCore};
pub use error::{EditorError, ResolveError};
pub use lookup::LookupEditor;
pub use popup::{PopupState, ResetHandle};
pub use registry::{BroadcastReport, EditorRegistration, EditorRegistry};
pub use resolver::{CachedResolver, RecordResolver};
pub use signal::{ContextToken, EditorInstanceId, EditorKind, EditorPayload, EditorSignal};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
