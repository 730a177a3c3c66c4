//! In-memory collaborators
//!
//! Backends for the simulator and for tests: a record source with failure
//! injection and call counters, a static schema provider, a map-backed
//! record resolver and a notifier that keeps what it was told.

use crate::collaborator::{Ack, Notification, Notifier, RecordSource, SchemaProvider};
use crate::error::SourceError;
use async_trait::async_trait;
use draftgrid_editor::{RecordResolver, ResolveError};
use draftgrid_model::{ChoiceOption, DraftEntry, FieldValue, Record, RecordId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Record source backed by a map of parent id to related records
///
/// A successful persist writes the drafts into the stored records, so the
/// follow-up reload sees them. Editing a reference field (`AccountId`) drops
/// the flattened fields of the old referenced record (`Account.*`).
#[derive(Debug, Default)]
pub struct InMemoryRecordSource {
    related: Mutex<HashMap<RecordId, Vec<Record>>>,
    fetch_failure: Mutex<Option<String>>,
    persist_failure: Mutex<Option<String>>,
    persist_gate: Option<Arc<Notify>>,
    fetch_calls: AtomicUsize,
    persist_calls: AtomicUsize,
    invalidations: AtomicUsize,
    persisted: Mutex<Vec<Vec<DraftEntry>>>,
}

impl InMemoryRecordSource {
    /// Empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With related records for `parent`
    #[must_use]
    pub fn with_rows(self, parent: impl Into<RecordId>, records: Vec<Record>) -> Self {
        self.related.lock().insert(parent.into(), records);
        self
    }

    /// Hold every persist until `gate` is notified
    #[must_use]
    pub fn with_persist_gate(mut self, gate: Arc<Notify>) -> Self {
        self.persist_gate = Some(gate);
        self
    }

    /// Make fetches fail with `message` (or succeed again with `None`)
    pub fn fail_fetch(&self, message: Option<&str>) {
        *self.fetch_failure.lock() = message.map(str::to_string);
    }

    /// Make persists fail with `message` (or succeed again with `None`)
    pub fn fail_persist(&self, message: Option<&str>) {
        *self.persist_failure.lock() = message.map(str::to_string);
    }

    /// Number of fetch calls so far
    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of persist calls so far
    #[must_use]
    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    /// Number of invalidate calls so far
    #[must_use]
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }

    /// Every batch handed to persist, accepted or not
    #[must_use]
    pub fn persisted(&self) -> Vec<Vec<DraftEntry>> {
        self.persisted.lock().clone()
    }

    /// Stored records of `parent`
    #[must_use]
    pub fn records(&self, parent: &RecordId) -> Vec<Record> {
        self.related.lock().get(parent).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn fetch_related_rows(&self, parent: &RecordId) -> Result<Vec<Record>, SourceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fetch_failure.lock().clone() {
            return Err(SourceError::FetchFailed {
                parent: parent.clone(),
                message,
            });
        }
        Ok(self.records(parent))
    }

    async fn persist_edits(&self, edits: &[DraftEntry]) -> Result<Ack, SourceError> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        self.persisted.lock().push(edits.to_vec());
        if let Some(gate) = &self.persist_gate {
            gate.notified().await;
        }
        if let Some(message) = self.persist_failure.lock().clone() {
            return Err(SourceError::PersistFailed { message });
        }

        let mut updated = Vec::new();
        let mut related = self.related.lock();
        for edit in edits {
            let record = related
                .values_mut()
                .flat_map(|records| records.iter_mut())
                .find(|record| record.id == edit.id);
            if let Some(record) = record {
                for field in edit.fields.keys() {
                    if let Some(relation) = field.strip_suffix("Id").filter(|r| !r.is_empty()) {
                        let prefix = format!("{relation}.");
                        record.fields.retain(|name, _| !name.starts_with(&prefix));
                    }
                }
                record.fields.extend(edit.fields.clone());
                updated.push(edit.id.clone());
            }
        }
        Ok(Ack { updated })
    }

    async fn invalidate(&self, _ids: &[RecordId]) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Schema provider answering from static tables
#[derive(Debug)]
pub struct InMemorySchema {
    record_type: String,
    options: HashMap<String, Vec<ChoiceOption>>,
    unavailable: bool,
}

impl InMemorySchema {
    /// Provider with the standard opportunity stages
    #[must_use]
    pub fn new() -> Self {
        let stages = ["Prospecting", "Qualification", "Open", "Won", "Closed"]
            .into_iter()
            .map(ChoiceOption::plain)
            .collect();
        Self {
            record_type: "012000000000000AAA".to_string(),
            options: HashMap::from([("StageName".to_string(), stages)]),
            unavailable: false,
        }
    }

    /// With options for `field`, replacing any defaults
    #[must_use]
    pub fn with_options(mut self, field: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        self.options.insert(field.into(), options);
        self
    }

    /// Every call fails
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

impl Default for InMemorySchema {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaProvider for InMemorySchema {
    async fn default_record_type(&self, object: &str) -> Result<String, SourceError> {
        if self.unavailable {
            return Err(SourceError::Unavailable(format!("no metadata for {object}")));
        }
        Ok(self.record_type.clone())
    }

    async fn choice_options(
        &self,
        object: &str,
        _record_type: &str,
        field: &str,
    ) -> Result<Vec<ChoiceOption>, SourceError> {
        if self.unavailable {
            return Err(SourceError::Unavailable(format!("no metadata for {object}")));
        }
        Ok(self.options.get(field).cloned().unwrap_or_default())
    }
}

/// Resolver answering from a `(record, field) -> value` map
#[derive(Debug, Default)]
pub struct InMemoryResolver {
    values: HashMap<(RecordId, String), FieldValue>,
    calls: AtomicUsize,
}

impl InMemoryResolver {
    /// Empty resolver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With `field` of record `id`
    #[must_use]
    pub fn with_value(
        mut self,
        id: impl Into<RecordId>,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.values.insert((id.into(), field.into()), value.into());
        self
    }

    /// Number of resolutions served
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordResolver for InMemoryResolver {
    async fn resolve_field(
        &self,
        id: &RecordId,
        field: &str,
    ) -> Result<Option<FieldValue>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.values.get(&(id.clone(), field.to_string())).cloned())
    }
}

/// Notifier that records every notification
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    /// Empty notifier
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications so far
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    /// Drain notifications
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.seen.lock())
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::info!(
            title = %notification.title,
            variant = ?notification.variant,
            "notification"
        );
        self.seen.lock().push(notification);
    }
}
