//! Grid phase machine
//!
//! ```text
//! Idle -> Loading -> Ready -> Saving -> Ready
//!                      |  ^
//!                      +--+ (Ready -> Loading on reselect, Ready -> Ready on cancel)
//! ```

use crate::error::GridError;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridPhase {
    /// No parent selected, table hidden
    #[default]
    Idle,
    /// Fetch in flight
    Loading,
    /// Table shown, drafts may be pending
    Ready,
    /// Persist in flight
    Saving,
}

impl GridPhase {
    /// Whether a collaborator call is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Loading | Self::Saving)
    }

    /// What the host should render in this phase
    #[must_use]
    pub fn view(self) -> ViewState {
        match self {
            Self::Idle => ViewState::new(false, false),
            Self::Loading | Self::Saving => ViewState::new(true, false),
            Self::Ready => ViewState::new(false, true),
        }
    }
}

impl std::fmt::Display for GridPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Saving => "saving",
        };
        f.write_str(name)
    }
}

/// Spinner and table visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Spinner visible
    pub show_spinner: bool,
    /// Table visible
    pub show_table: bool,
}

impl ViewState {
    const fn new(show_spinner: bool, show_table: bool) -> Self {
        Self {
            show_spinner,
            show_table,
        }
    }
}

/// Validate a phase transition
///
/// # Errors
/// `GridError::InvalidTransition` if `to` is not reachable from `from`.
pub fn validate_transition(from: GridPhase, to: GridPhase) -> Result<(), GridError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(GridError::InvalidTransition { from, to })
    }
}

/// Phases reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: GridPhase) -> &'static [GridPhase] {
    use GridPhase::{Idle, Loading, Ready, Saving};
    match from {
        Idle => &[Loading],
        Loading => &[Ready],
        Ready => &[Loading, Saving, Ready],
        Saving => &[Ready],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_only_loads() {
        assert!(validate_transition(GridPhase::Idle, GridPhase::Loading).is_ok());
        assert!(validate_transition(GridPhase::Idle, GridPhase::Ready).is_err());
        assert!(validate_transition(GridPhase::Idle, GridPhase::Saving).is_err());
    }

    #[test]
    fn saving_returns_to_ready() {
        assert!(validate_transition(GridPhase::Saving, GridPhase::Ready).is_ok());
        assert_eq!(
            validate_transition(GridPhase::Saving, GridPhase::Loading),
            Err(GridError::InvalidTransition {
                from: GridPhase::Saving,
                to: GridPhase::Loading,
            })
        );
    }

    #[test]
    fn view_per_phase() {
        assert_eq!(GridPhase::Idle.view(), ViewState::new(false, false));
        assert_eq!(GridPhase::Loading.view(), ViewState::new(true, false));
        assert_eq!(GridPhase::Ready.view(), ViewState::new(false, true));
        assert_eq!(GridPhase::Saving.view(), ViewState::new(true, false));
    }

    #[test]
    fn busy_phases() {
        assert!(GridPhase::Loading.is_busy());
        assert!(GridPhase::Saving.is_busy());
        assert!(!GridPhase::Ready.is_busy());
    }
}
