//! Signals the controller consumes

use draftgrid_editor::EditorSignal;
use draftgrid_model::DraftEntry;

/// Intents emitted by the host grid
#[derive(Debug, Clone, PartialEq)]
pub enum GridSignal {
    /// Inline edit of a plain column
    CellEdit(DraftEntry),
    /// Save request with the grid's own pending draft values
    Save(Vec<DraftEntry>),
    /// Discard request
    Cancel,
}

/// Anything the controller can be dispatched
#[derive(Debug, Clone)]
pub enum Signal {
    /// From a cell editor
    Editor(EditorSignal),
    /// From the host grid
    Grid(GridSignal),
}

impl From<EditorSignal> for Signal {
    fn from(signal: EditorSignal) -> Self {
        Self::Editor(signal)
    }
}

impl From<GridSignal> for Signal {
    fn from(signal: GridSignal) -> Self {
        Self::Grid(signal)
    }
}
