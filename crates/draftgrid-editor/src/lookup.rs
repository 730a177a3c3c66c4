//! Record-lookup editor

use crate::editor::{CellBinding, CellEditor, EditorCore};
use crate::error::EditorError;
use crate::resolver::RecordResolver;
use crate::signal::{EditorKind, EditorSignal};
use draftgrid_model::{FieldValue, RecordId};

/// References a single record and shows its display name
///
/// The display name is resolved from the first configured field path
/// (`Account.Name` resolves `Name` on the referenced record). While the
/// value is empty, or the field cannot be resolved, the name is empty.
#[derive(Debug)]
pub struct LookupEditor {
    core: EditorCore,
    object: String,
    fields: Vec<String>,
    placeholder: String,
    display_name: String,
}

impl LookupEditor {
    /// Create an unmounted lookup editor
    #[must_use]
    pub fn new(
        binding: CellBinding,
        object: impl Into<String>,
        fields: Vec<String>,
        value: FieldValue,
    ) -> Self {
        let placeholder = format!("Choose {}", binding.label);
        Self {
            core: EditorCore::new(EditorKind::LOOKUP, binding, value),
            object: object.into(),
            fields,
            placeholder,
            display_name: String::new(),
        }
    }

    /// With placeholder text
    #[inline]
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Object the lookup field belongs to
    #[inline]
    #[must_use]
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Placeholder text
    #[inline]
    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Field resolved on the referenced record: last segment of the first path
    #[must_use]
    pub fn display_field(&self) -> Option<&str> {
        self.fields
            .first()
            .map(|path| path.rsplit_once('.').map_or(path.as_str(), |(_, field)| field))
    }

    /// Last resolved display name
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// `/<id>` once a display name resolved, otherwise empty
    #[must_use]
    pub fn link(&self) -> String {
        if self.display_name.is_empty() {
            return String::new();
        }
        self.core.value().as_text().map(|id| format!("/{id}")).unwrap_or_default()
    }

    /// Re-resolve the display name for the current value
    pub async fn refresh_display<R>(&mut self, resolver: &R) -> &str
    where
        R: RecordResolver + ?Sized,
    {
        self.display_name = self.resolve_name(resolver).await;
        &self.display_name
    }

    async fn resolve_name<R>(&self, resolver: &R) -> String
    where
        R: RecordResolver + ?Sized,
    {
        let Some(id) = self.core.value().as_text().filter(|v| !v.is_empty()) else {
            return String::new();
        };
        let Some(field) = self.display_field() else {
            return String::new();
        };

        match resolver.resolve_field(&RecordId::new(id), field).await {
            Ok(Some(value)) => value.to_string(),
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!(record = %id, field, error = %e, "lookup display name unresolved");
                String::new()
            }
        }
    }
}

impl CellEditor for LookupEditor {
    fn core(&self) -> &EditorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    /// A cleared selection keeps the popup open; a chosen record closes it.
    fn confirm(&mut self, value: FieldValue) -> Result<EditorSignal, EditorError> {
        let keep_open = value.is_null();
        if &value != self.core.value() {
            self.display_name.clear();
        }
        Ok(self.core.commit(value, keep_open))
    }
}
