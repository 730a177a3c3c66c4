//! Error types for the grid controller
//!
//! Two families:
//! - [`GridError`]: misuse of the controller (wrong phase, unknown row)
//! - [`SourceError`]: collaborator failures, turned into notifications at the
//!   controller boundary and never returned as [`GridError`]

use crate::config::ConfigError;
use crate::phase::GridPhase;
use draftgrid_editor::EditorError;
use draftgrid_model::RecordId;

/// Controller operation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// A load or save is already in flight
    #[error("grid is busy ({phase})")]
    Busy {
        /// Phase the grid is in
        phase: GridPhase,
    },

    /// Phase change not allowed by the state machine
    #[error("illegal phase transition {from} -> {to}")]
    InvalidTransition {
        /// Current phase
        from: GridPhase,
        /// Requested phase
        to: GridPhase,
    },

    /// Operation needs a selected parent
    #[error("no parent record selected")]
    NoParentSelected,

    /// Edit targets a row that is not loaded
    #[error("row not loaded: {0}")]
    UnknownRow(RecordId),

    /// Editor rejected the interaction
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures reported by external collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Fetching the related rows failed
    #[error("fetch failed for {parent}: {message}")]
    FetchFailed {
        /// Parent whose rows were requested
        parent: RecordId,
        /// Collaborator detail
        message: String,
    },

    /// Persisting the drafts failed
    #[error("persist failed: {message}")]
    PersistFailed {
        /// Collaborator detail
        message: String,
    },

    /// Collaborator not reachable
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// User-facing failure detail
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::FetchFailed { message, .. } | Self::PersistFailed { message } => message,
            Self::Unavailable(message) => message,
        }
    }
}

/// Result alias for controller operations
pub type Result<T> = std::result::Result<T, GridError>;
