//! Signals exchanged between editors and their owner

use crate::registry::EditorRegistration;
use draftgrid_model::{FieldValue, RecordId};
use std::borrow::Cow;
use ulid::Ulid;

/// Editor kind, the first level of the registry
///
/// Open-ended so new editor kinds need no change to the owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditorKind(Cow<'static, str>);

impl EditorKind {
    /// Choice-list editor
    pub const CHOICE: Self = Self(Cow::Borrowed("choice"));

    /// Record-lookup editor
    pub const LOOKUP: Self = Self(Cow::Borrowed("lookup"));

    /// Custom kind
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Kind name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EditorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identity of one mounted editor (ULID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditorInstanceId(pub Ulid);

impl EditorInstanceId {
    /// Generate new instance id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for EditorInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EditorInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried by a dismissal broadcast
///
/// Each editor decides for itself whether the broadcast is about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextToken {
    /// Close every editor
    ResetAll,
    /// Close every editor not bound to this row
    Row(RecordId),
    /// Close every editor except the one that opened
    Origin {
        /// Row of the opening editor
        row: RecordId,
        /// The opening editor
        instance: EditorInstanceId,
    },
}

impl ContextToken {
    /// Whether an editor bound to `row` with identity `instance` stays open
    #[must_use]
    pub fn spares(&self, row: &RecordId, instance: EditorInstanceId) -> bool {
        match self {
            Self::ResetAll => false,
            Self::Row(context) => context == row,
            Self::Origin { instance: origin, .. } => *origin == instance,
        }
    }

    /// Row named by the token, if any
    #[inline]
    #[must_use]
    pub fn row(&self) -> Option<&RecordId> {
        match self {
            Self::ResetAll => None,
            Self::Row(row) | Self::Origin { row, .. } => Some(row),
        }
    }
}

/// Payload of editor-opened, value-changed and blurred signals
#[derive(Debug, Clone, PartialEq)]
pub struct EditorPayload {
    /// Row the editor is bound to
    pub context: RecordId,
    /// Emitting editor
    pub instance: EditorInstanceId,
    /// Current (or newly confirmed) value
    pub value: FieldValue,
    /// Semantic field label, e.g. `Stage`
    pub label: String,
    /// Editor name
    pub name: String,
}

/// Signals an editor emits upward
#[derive(Debug, Clone)]
pub enum EditorSignal {
    /// Join the registry (first render only)
    Register(EditorRegistration),
    /// Popup opened
    Opened(EditorPayload),
    /// Value confirmed
    ValueChanged(EditorPayload),
    /// Popup closed without a change
    BlurredWithoutChange(EditorPayload),
}

impl EditorSignal {
    /// Payload, for every signal except registration
    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&EditorPayload> {
        match self {
            Self::Register(_) => None,
            Self::Opened(p) | Self::ValueChanged(p) | Self::BlurredWithoutChange(p) => Some(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_all_spares_nobody() {
        let row = RecordId::new("1");
        assert!(!ContextToken::ResetAll.spares(&row, EditorInstanceId::new()));
    }

    #[test]
    fn row_token_spares_same_row() {
        let token = ContextToken::Row(RecordId::new("1"));
        assert!(token.spares(&RecordId::new("1"), EditorInstanceId::new()));
        assert!(!token.spares(&RecordId::new("2"), EditorInstanceId::new()));
    }

    #[test]
    fn origin_token_spares_only_origin() {
        let origin = EditorInstanceId::new();
        let token = ContextToken::Origin {
            row: RecordId::new("1"),
            instance: origin,
        };
        assert!(token.spares(&RecordId::new("1"), origin));
        assert!(!token.spares(&RecordId::new("1"), EditorInstanceId::new()));
    }

    #[test]
    fn kind_constants() {
        assert_eq!(EditorKind::CHOICE.as_str(), "choice");
        assert_eq!(EditorKind::new("date"), EditorKind::new(String::from("date")));
        assert_ne!(EditorKind::CHOICE, EditorKind::LOOKUP);
    }

    #[test]
    fn instance_ids_unique() {
        assert_ne!(EditorInstanceId::new(), EditorInstanceId::new());
    }
}
