//! Registry of mounted editors
//!
//! Two-level map `kind -> instance -> reset handle`. Registrations are never
//! required to be removed: a handle whose editor was dropped is pruned the
//! next time a broadcast reaches it, and its siblings are unaffected.

use crate::popup::ResetHandle;
use crate::signal::{ContextToken, EditorInstanceId, EditorKind};
use dashmap::DashMap;
use std::collections::HashMap;

/// Registration emitted by an editor on first render
#[derive(Debug, Clone)]
pub struct EditorRegistration {
    /// Editor kind
    pub kind: EditorKind,
    /// Editor identity
    pub instance: EditorInstanceId,
    /// Weak reset callback
    pub handle: ResetHandle,
}

/// Outcome of a reset broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Live editors that received the reset
    pub notified: usize,
    /// Editors whose popup this broadcast closed
    pub closed: usize,
    /// Dead registrations removed
    pub pruned: usize,
}

impl BroadcastReport {
    fn merge(&mut self, other: Self) {
        self.notified += other.notified;
        self.closed += other.closed;
        self.pruned += other.pruned;
    }
}

/// Live editors by kind and instance
#[derive(Debug, Default)]
pub struct EditorRegistry {
    entries: DashMap<EditorKind, HashMap<EditorInstanceId, ResetHandle>>,
}

impl EditorRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a registration, replacing any with the same kind and instance
    pub fn register(&self, registration: EditorRegistration) {
        tracing::debug!(
            kind = %registration.kind,
            instance = %registration.instance,
            "editor registered"
        );
        self.entries
            .entry(registration.kind)
            .or_default()
            .insert(registration.instance, registration.handle);
    }

    /// Remove a registration explicitly
    pub fn unregister(&self, kind: &EditorKind, instance: EditorInstanceId) -> bool {
        self.entries
            .get_mut(kind)
            .is_some_and(|mut editors| editors.remove(&instance).is_some())
    }

    /// Reset every editor of `kind` with `context`
    pub fn broadcast_reset(&self, kind: &EditorKind, context: &ContextToken) -> BroadcastReport {
        let report = self
            .entries
            .get_mut(kind)
            .map(|mut editors| reset_all(&mut editors, context))
            .unwrap_or_default();
        log_report(kind, context, report);
        report
    }

    /// Reset every editor of every known kind
    pub fn broadcast_reset_all(&self, context: &ContextToken) -> BroadcastReport {
        let mut total = BroadcastReport::default();
        for mut entry in self.entries.iter_mut() {
            let report = reset_all(entry.value_mut(), context);
            log_report(entry.key(), context, report);
            total.merge(report);
        }
        total
    }

    /// Known editor kinds
    #[must_use]
    pub fn kinds(&self) -> Vec<EditorKind> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Whether a registration exists (alive or not yet pruned)
    #[must_use]
    pub fn contains(&self, kind: &EditorKind, instance: EditorInstanceId) -> bool {
        self.entries
            .get(kind)
            .is_some_and(|editors| editors.contains_key(&instance))
    }

    /// Number of editors with an open popup
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.value().values().filter(|h| h.is_open()).count())
            .sum()
    }

    /// Number of stored registrations
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn reset_all(
    editors: &mut HashMap<EditorInstanceId, ResetHandle>,
    context: &ContextToken,
) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    editors.retain(|_, handle| match handle.reset(context) {
        Some(closed) => {
            report.notified += 1;
            report.closed += usize::from(closed);
            true
        }
        None => {
            report.pruned += 1;
            false
        }
    });
    report
}

fn log_report(kind: &EditorKind, context: &ContextToken, report: BroadcastReport) {
    tracing::debug!(
        %kind,
        ?context,
        notified = report.notified,
        closed = report.closed,
        pruned = report.pruned,
        "reset broadcast"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::ChoiceEditor;
    use crate::editor::{CellBinding, CellEditor};
    use crate::lookup::LookupEditor;
    use crate::signal::EditorSignal;
    use draftgrid_model::{ChoiceOption, FieldValue, RecordId};

    fn mounted_choice(registry: &EditorRegistry, row: &str) -> ChoiceEditor {
        let mut editor = ChoiceEditor::new(
            CellBinding::new(row, "Stage", "Stage"),
            vec![ChoiceOption::plain("Open")],
            FieldValue::from("Open"),
        );
        if let Some(EditorSignal::Register(registration)) = editor.mount() {
            registry.register(registration);
        }
        editor
    }

    fn mounted_lookup(registry: &EditorRegistry, row: &str) -> LookupEditor {
        let mut editor = LookupEditor::new(
            CellBinding::new(row, "Account", "Account"),
            "Opportunity",
            vec!["Account.Name".to_string()],
            FieldValue::Null,
        );
        if let Some(EditorSignal::Register(registration)) = editor.mount() {
            registry.register(registration);
        }
        editor
    }

    #[test]
    fn register_is_keyed_by_kind_and_instance() {
        let registry = EditorRegistry::new();
        let a = mounted_choice(&registry, "1");
        let b = mounted_lookup(&registry, "1");

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&EditorKind::CHOICE, a.instance_id()));
        assert!(registry.contains(&EditorKind::LOOKUP, b.instance_id()));
        assert!(!registry.contains(&EditorKind::LOOKUP, a.instance_id()));
    }

    #[test]
    fn re_register_overwrites() {
        let registry = EditorRegistry::new();
        let mut editor = ChoiceEditor::new(
            CellBinding::new("1", "Stage", "Stage"),
            vec![],
            FieldValue::Null,
        );
        let Some(EditorSignal::Register(registration)) = editor.mount() else {
            panic!("first mount must register");
        };
        registry.register(registration.clone());
        registry.register(registration);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn broadcast_is_scoped_to_kind() {
        let registry = EditorRegistry::new();
        let mut choice = mounted_choice(&registry, "1");
        let mut lookup = mounted_lookup(&registry, "2");
        choice.open();
        lookup.open();

        let report = registry.broadcast_reset(&EditorKind::CHOICE, &ContextToken::ResetAll);
        assert_eq!(report.closed, 1);
        assert!(!choice.is_open());
        assert!(lookup.is_open());
    }

    #[test]
    fn broadcast_reset_all_spares_context_row() {
        let registry = EditorRegistry::new();
        let mut first = mounted_choice(&registry, "1");
        let mut second = mounted_choice(&registry, "2");
        first.open();
        second.open();

        registry.broadcast_reset_all(&ContextToken::Row(RecordId::new("2")));
        assert!(!first.is_open());
        assert!(second.is_open());
        assert_eq!(registry.open_count(), 1);
    }

    #[test]
    fn stale_registration_pruned_silently() {
        let registry = EditorRegistry::new();
        let gone = mounted_choice(&registry, "1");
        let mut sibling = mounted_choice(&registry, "2");
        sibling.open();
        drop(gone);

        let report = registry.broadcast_reset(&EditorKind::CHOICE, &ContextToken::ResetAll);
        assert_eq!(report, BroadcastReport { notified: 1, closed: 1, pruned: 1 });
        assert!(!sibling.is_open());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_removes() {
        let registry = EditorRegistry::new();
        let editor = mounted_choice(&registry, "1");
        assert!(registry.unregister(&EditorKind::CHOICE, editor.instance_id()));
        assert!(!registry.unregister(&EditorKind::CHOICE, editor.instance_id()));
        assert!(registry.is_empty());
    }

    #[test]
    fn broadcast_to_unknown_kind_is_noop() {
        let registry = EditorRegistry::new();
        let report = registry.broadcast_reset(&EditorKind::new("date"), &ContextToken::ResetAll);
        assert_eq!(report, BroadcastReport::default());
    }

    #[test]
    fn kinds_lists_registered_kinds() {
        let registry = EditorRegistry::new();
        let _a = mounted_choice(&registry, "1");
        let _b = mounted_lookup(&registry, "1");
        let mut kinds: Vec<String> = registry.kinds().iter().map(ToString::to_string).collect();
        kinds.sort();
        assert_eq!(kinds, vec!["choice".to_string(), "lookup".to_string()]);
    }
}
