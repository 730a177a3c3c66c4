//! Popup state shared between an editor and its registration
//!
//! The editor owns the only strong reference. Its registration holds a
//! [`ResetHandle`] (a weak reference), so once the editor is dropped the
//! handle goes dead and the registry prunes it instead of calling into it.

use crate::signal::{ContextToken, EditorInstanceId};
use draftgrid_model::RecordId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Open/closed flag plus the binding the reset rule needs
#[derive(Debug)]
pub struct PopupState {
    instance: EditorInstanceId,
    row: Mutex<RecordId>,
    open: AtomicBool,
}

impl PopupState {
    pub(crate) fn new(instance: EditorInstanceId, row: RecordId) -> Arc<Self> {
        Arc::new(Self {
            instance,
            row: Mutex::new(row),
            open: AtomicBool::new(false),
        })
    }

    /// Whether the popup is open
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Row the editor is currently bound to
    #[inline]
    #[must_use]
    pub fn row(&self) -> RecordId {
        self.row.lock().clone()
    }

    /// Owning editor
    #[inline]
    #[must_use]
    pub fn instance(&self) -> EditorInstanceId {
        self.instance
    }

    pub(crate) fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::Release);
    }

    pub(crate) fn rebind(&self, row: RecordId) {
        *self.row.lock() = row;
    }

    /// Apply the dismissal rule; returns `true` if this call closed the popup
    pub fn reset(&self, context: &ContextToken) -> bool {
        let spared = context.spares(&self.row.lock(), self.instance);
        if spared {
            return false;
        }
        self.open.swap(false, Ordering::AcqRel)
    }
}

/// Weak reference to an editor's popup, stored in the registry
#[derive(Debug, Clone)]
pub struct ResetHandle(Weak<PopupState>);

impl ResetHandle {
    pub(crate) fn new(state: &Arc<PopupState>) -> Self {
        Self(Arc::downgrade(state))
    }

    /// Reset the editor; `None` if it has been dropped
    #[inline]
    pub fn reset(&self, context: &ContextToken) -> Option<bool> {
        self.0.upgrade().map(|state| state.reset(context))
    }

    /// Whether the editor is still mounted
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Whether the editor is mounted and open
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.0.upgrade().is_some_and(|state| state.is_open())
    }
}
