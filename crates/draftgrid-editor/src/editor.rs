//! The cell-editor capability
//!
//! Every editor kind shares one contract:
//!
//! - `mount` registers once, on first render
//! - `open` opens the popup and announces it
//! - `confirm` commits a value and (normally) closes the popup
//! - `blur` closes the popup without committing
//! - `reset` applies a dismissal broadcast
//!
//! Shared bookkeeping lives in [`EditorCore`]; variants only add what is
//! specific to them.

use crate::error::EditorError;
use crate::popup::{PopupState, ResetHandle};
use crate::registry::EditorRegistration;
use crate::signal::{ContextToken, EditorInstanceId, EditorKind, EditorPayload, EditorSignal};
use draftgrid_model::{FieldValue, RecordId};
use std::sync::Arc;

/// Where an editor sits: row, semantic label, editor name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellBinding {
    /// Row id (the editor's context)
    pub context: RecordId,
    /// Semantic field label, e.g. `Stage`
    pub label: String,
    /// Editor name
    pub name: String,
}

impl CellBinding {
    /// Create binding
    #[inline]
    #[must_use]
    pub fn new(
        context: impl Into<RecordId>,
        label: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            label: label.into(),
            name: name.into(),
        }
    }
}

/// State common to every editor kind
#[derive(Debug)]
pub struct EditorCore {
    kind: EditorKind,
    instance: EditorInstanceId,
    binding: CellBinding,
    value: FieldValue,
    popup: Arc<PopupState>,
    registered: bool,
}

impl EditorCore {
    /// New, unmounted core with a fresh instance id
    #[must_use]
    pub fn new(kind: EditorKind, binding: CellBinding, value: FieldValue) -> Self {
        let instance = EditorInstanceId::new();
        let popup = PopupState::new(instance, binding.context.clone());
        Self {
            kind,
            instance,
            binding,
            value,
            popup,
            registered: false,
        }
    }

    /// Registration signal on first call, `None` afterwards
    pub fn register_once(&mut self) -> Option<EditorSignal> {
        if self.registered {
            return None;
        }
        self.registered = true;
        tracing::debug!(kind = %self.kind, instance = %self.instance, "editor mounted");
        Some(EditorSignal::Register(EditorRegistration {
            kind: self.kind.clone(),
            instance: self.instance,
            handle: ResetHandle::new(&self.popup),
        }))
    }

    /// Open the popup and build the opened signal
    pub fn open_popup(&mut self) -> EditorSignal {
        self.popup.set_open(true);
        EditorSignal::Opened(self.payload())
    }

    /// Store `value`, set the popup flag and build the value-changed signal
    pub fn commit(&mut self, value: FieldValue, keep_open: bool) -> EditorSignal {
        self.value = value;
        self.popup.set_open(keep_open);
        EditorSignal::ValueChanged(self.payload())
    }

    /// Close the popup
    #[inline]
    pub fn close(&mut self) {
        self.popup.set_open(false);
    }

    /// Move a mounted editor to another cell; the popup closes
    pub fn rebind(&mut self, binding: CellBinding, value: FieldValue) {
        self.popup.set_open(false);
        self.popup.rebind(binding.context.clone());
        self.binding = binding;
        self.value = value;
    }

    /// Signal payload for the current state
    #[must_use]
    pub fn payload(&self) -> EditorPayload {
        EditorPayload {
            context: self.binding.context.clone(),
            instance: self.instance,
            value: self.value.clone(),
            label: self.binding.label.clone(),
            name: self.binding.name.clone(),
        }
    }

    /// Editor kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &EditorKind {
        &self.kind
    }

    /// Instance id
    #[inline]
    #[must_use]
    pub fn instance(&self) -> EditorInstanceId {
        self.instance
    }

    /// Cell binding
    #[inline]
    #[must_use]
    pub fn binding(&self) -> &CellBinding {
        &self.binding
    }

    /// Current value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Shared popup state
    #[inline]
    #[must_use]
    pub fn popup(&self) -> &Arc<PopupState> {
        &self.popup
    }
}

/// A popup-capable editor bound to one field of one row
pub trait CellEditor: Send + Sync {
    /// Shared state
    fn core(&self) -> &EditorCore;

    /// Shared state, mutably
    fn core_mut(&mut self) -> &mut EditorCore;

    /// Commit `value`
    ///
    /// # Errors
    /// Variant-specific validation failures.
    fn confirm(&mut self, value: FieldValue) -> Result<EditorSignal, EditorError>;

    /// First render: returns the registration signal once, then `None`
    fn mount(&mut self) -> Option<EditorSignal> {
        self.core_mut().register_once()
    }

    /// Open the popup
    fn open(&mut self) -> EditorSignal {
        self.core_mut().open_popup()
    }

    /// Close the popup without committing
    fn blur(&mut self) -> Option<EditorSignal> {
        self.core_mut().close();
        None
    }

    /// Apply a dismissal broadcast directly
    fn reset(&self, context: &ContextToken) -> bool {
        self.core().popup().reset(context)
    }

    /// Editor kind
    fn kind(&self) -> &EditorKind {
        self.core().kind()
    }

    /// Instance id
    fn instance_id(&self) -> EditorInstanceId {
        self.core().instance()
    }

    /// Cell binding
    fn binding(&self) -> &CellBinding {
        self.core().binding()
    }

    /// Current value
    fn value(&self) -> &FieldValue {
        self.core().value()
    }

    /// Whether the popup is open
    fn is_open(&self) -> bool {
        self.core().popup().is_open()
    }
}
