//! Choice-list editor

use crate::editor::{CellBinding, CellEditor, EditorCore};
use crate::error::EditorError;
use crate::signal::{EditorKind, EditorSignal};
use draftgrid_model::{ChoiceOption, FieldValue};

/// Picks one value from a fixed option list
///
/// Tracks whether a differing value was confirmed since the popup last
/// opened, so a close without change can be reported as such.
#[derive(Debug)]
pub struct ChoiceEditor {
    core: EditorCore,
    options: Vec<ChoiceOption>,
    placeholder: String,
    changed: bool,
}

impl ChoiceEditor {
    /// Create an unmounted choice editor
    #[must_use]
    pub fn new(binding: CellBinding, options: Vec<ChoiceOption>, value: FieldValue) -> Self {
        let placeholder = format!("Choose {}", binding.label);
        Self {
            core: EditorCore::new(EditorKind::CHOICE, binding, value),
            options,
            placeholder,
            changed: false,
        }
    }

    /// With placeholder text
    #[inline]
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Selectable options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    /// Placeholder text
    #[inline]
    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Whether a differing value was confirmed since the popup opened
    #[inline]
    #[must_use]
    pub fn value_changed(&self) -> bool {
        self.changed
    }

    fn is_option(&self, value: &FieldValue) -> bool {
        value.as_text().is_some_and(|v| self.options.iter().any(|o| o.value == v))
    }
}

impl CellEditor for ChoiceEditor {
    fn core(&self) -> &EditorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    fn open(&mut self) -> EditorSignal {
        self.changed = false;
        self.core.open_popup()
    }

    fn confirm(&mut self, value: FieldValue) -> Result<EditorSignal, EditorError> {
        if !value.is_null() && !self.is_option(&value) {
            return Err(EditorError::UnknownOption {
                value: value.to_string(),
                label: self.core.binding().label.clone(),
            });
        }
        if &value != self.core.value() {
            self.changed = true;
        }
        Ok(self.core.commit(value, false))
    }

    fn blur(&mut self) -> Option<EditorSignal> {
        self.core.close();
        if self.changed {
            None
        } else {
            Some(EditorSignal::BlurredWithoutChange(self.core.payload()))
        }
    }
}
