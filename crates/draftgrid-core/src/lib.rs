//! draftgrid core
//!
//! The grid controller: phase machine, draft reconciliation, and save/cancel
//! against external collaborators.
//!
//! # Core Concepts
//!
//! - [`GridController`]: owns rows, snapshot, drafts and annotations
//! - [`GridPhase`]: Idle, Loading, Ready, Saving
//! - [`RecordSource`] / [`SchemaProvider`] / [`Notifier`]: collaborators
//! - [`GridConfig`]: field mapping, choice column, notification texts
//!
//! # Example
//!
//! ```rust
//! use draftgrid_core::memory::{CollectingNotifier, InMemoryRecordSource, InMemorySchema};
//! use draftgrid_core::{GridConfig, GridController};
//! use draftgrid_model::Record;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let source = InMemoryRecordSource::new()
//!     .with_rows("001P", vec![Record::new("006A").with_field("StageName", "Open")]);
//! let grid = GridController::new(
//!     GridConfig::default(),
//!     Arc::new(source),
//!     Arc::new(InMemorySchema::new()),
//!     Arc::new(CollectingNotifier::new()),
//! )
//! .unwrap();
//!
//! assert_eq!(grid.select_parent("001P").await.unwrap(), 1);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod collaborator;
mod config;
mod controller;
mod error;
pub mod memory;
mod phase;
mod signal;

pub use collaborator::{Ack, Notification, NotificationVariant, Notifier, RecordSource, SchemaProvider};
pub use config::{ConfigError, FieldMapping, GridConfig, Messages};
pub use controller::{Dispatched, GridController, SaveOutcome, SaveReport};
pub use error::{GridError, Result, SourceError};
pub use phase::{allowed_transitions, validate_transition, GridPhase, ViewState};
pub use signal::{GridSignal, Signal};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
