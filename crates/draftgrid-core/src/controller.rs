//! Grid controller
//!
//! Owns the canonical rows, the last-saved snapshot, the draft overlay and
//! the per-cell annotations, and reconciles them against the external
//! [`RecordSource`].
//!
//! All operations take `&self`. State lives behind a mutex that is released
//! before every collaborator call, so a second load or save polled while one
//! is in flight observes the busy phase and is rejected with
//! [`GridError::Busy`].

use crate::collaborator::{Ack, Notification, Notifier, RecordSource, SchemaProvider};
use crate::config::GridConfig;
use crate::error::{GridError, Result, SourceError};
use crate::phase::{validate_transition, GridPhase, ViewState};
use crate::signal::{GridSignal, Signal};
use draftgrid_editor::{
    BroadcastReport, CachedResolver, CellEditor, ContextToken, DismissalCoordinator,
    EditorPayload, EditorRegistration, EditorRegistry, EditorSignal, InteractionHub,
    LookupEditor, RecordResolver, Subscription,
};
use draftgrid_model::{
    insert_choice_column, opportunity_columns, CellClass, ChoiceOption, ColumnDef, ColumnKind,
    DraftEntry, DraftStore, Record, RecordId, Row,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a persist attempt ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Backend accepted the batch
    Persisted(Ack),
    /// Backend rejected the batch; user-facing detail
    Failed(String),
}

/// Result of one save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveReport {
    /// Drafts handed to the backend
    pub submitted: Vec<DraftEntry>,
    /// Persist outcome
    pub outcome: SaveOutcome,
    /// Whether the follow-up reload succeeded
    pub reloaded: bool,
}

impl SaveReport {
    /// Whether the backend accepted the batch
    #[inline]
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        matches!(self.outcome, SaveOutcome::Persisted(_))
    }
}

/// What a dispatched signal did
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// Editor joined the registry
    Registered,
    /// Popup opened; other editors were reset
    Opened(BroadcastReport),
    /// Draft recorded
    Edited,
    /// No-op close acknowledged
    Blurred,
    /// Save finished
    Saved(SaveReport),
    /// Drafts discarded
    Cancelled,
}

#[derive(Debug, Default)]
struct GridState {
    phase: GridPhase,
    parent: Option<RecordId>,
    columns: Vec<ColumnDef>,
    choice_options: Vec<ChoiceOption>,
    rows: Vec<Row>,
    snapshot: Vec<Row>,
    drafts: DraftStore,
    load_error: Option<String>,
}

impl GridState {
    fn transition(&mut self, to: GridPhase) -> Result<()> {
        validate_transition(self.phase, to)?;
        tracing::info!(from = %self.phase, %to, "grid phase");
        self.phase = to;
        Ok(())
    }

    fn ensure_idle_or_ready(&self) -> Result<()> {
        if self.phase.is_busy() {
            return Err(GridError::Busy { phase: self.phase });
        }
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.phase {
            GridPhase::Ready => Ok(()),
            GridPhase::Loading | GridPhase::Saving => Err(GridError::Busy { phase: self.phase }),
            GridPhase::Idle => Err(GridError::NoParentSelected),
        }
    }

    fn row_mut(&mut self, id: &RecordId) -> Result<&mut Row> {
        self.rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| GridError::UnknownRow(id.clone()))
    }

    fn is_lookup(&self, field: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.field_name == field && matches!(c.kind, ColumnKind::Lookup { .. }))
    }

    fn clear_editing(&mut self) {
        for row in &mut self.rows {
            for class in row.classes.values_mut() {
                if *class == CellClass::Editing {
                    *class = CellClass::Clean;
                }
            }
        }
    }
}

/// Puts the phase back if an in-flight operation is dropped before it finishes
struct InFlight<'a> {
    state: &'a Mutex<GridState>,
    fallback: GridPhase,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a Mutex<GridState>, fallback: GridPhase) -> Self {
        Self {
            state,
            fallback,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock();
            tracing::warn!(phase = %state.phase, fallback = %self.fallback, "in-flight operation dropped");
            state.phase = self.fallback;
        }
    }
}

/// Editor coordination and draft reconciliation for one grid
pub struct GridController {
    config: GridConfig,
    source: Arc<dyn RecordSource>,
    schema: Arc<dyn SchemaProvider>,
    notifier: Arc<dyn Notifier>,
    resolver: Option<CachedResolver<Arc<dyn RecordResolver>>>,
    registry: Arc<EditorRegistry>,
    coordinator: DismissalCoordinator,
    state: Mutex<GridState>,
    mounted: Mutex<Option<Subscription>>,
}

impl GridController {
    /// Create a controller in the Idle phase
    ///
    /// # Errors
    /// `GridError::Config` if `config` does not validate.
    pub fn new(
        config: GridConfig,
        source: Arc<dyn RecordSource>,
        schema: Arc<dyn SchemaProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(EditorRegistry::new());
        let state = GridState {
            columns: opportunity_columns(),
            ..GridState::default()
        };
        Ok(Self {
            config,
            source,
            schema,
            notifier,
            resolver: None,
            coordinator: DismissalCoordinator::new(Arc::clone(&registry)),
            registry,
            state: Mutex::new(state),
            mounted: Mutex::new(None),
        })
    }

    /// With a lookup display-name resolver (cached per config capacity)
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn RecordResolver>) -> Self {
        self.resolver = Some(CachedResolver::new(resolver, self.config.lookup_cache_capacity));
        self
    }

    /// With a custom column schema
    #[must_use]
    pub fn with_columns(self, columns: Vec<ColumnDef>) -> Self {
        self.state.lock().columns = columns;
        self
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start observing outside interactions on `hub`
    pub fn mount(&self, hub: &InteractionHub) {
        let subscription = self.coordinator.attach(hub);
        *self.mounted.lock() = Some(subscription);
        tracing::debug!("grid mounted");
    }

    /// Stop observing; detaches exactly the listener `mount` attached
    pub fn unmount(&self) {
        if self.mounted.lock().take().is_some() {
            tracing::debug!("grid unmounted");
        }
    }

    /// Whether an interaction listener is attached
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.lock().as_ref().is_some_and(Subscription::is_active)
    }

    /// Resolve the choice options and splice the choice column into the schema
    ///
    /// Returns `false` (columns unchanged) if metadata could not be resolved.
    pub async fn load_schema(&self) -> bool {
        let object = self.config.object_api_name.as_str();
        let field = self.config.choice_field.as_str();

        let options = match self.fetch_choice_options(object, field).await {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!(object, field, error = %e, "choice metadata unavailable");
                return false;
            }
        };

        let label = self
            .config
            .field_map
            .iter()
            .find(|m| m.field == field)
            .map_or(field, |m| m.label.as_str());
        let column = ColumnDef::choice(label, field, options.clone());

        let mut state = self.state.lock();
        let index = self.config.choice_column_index.min(state.columns.len());
        if let Err(e) = insert_choice_column(&mut state.columns, index, column) {
            tracing::warn!(error = %e, "choice column not inserted");
            return false;
        }
        state.choice_options = options;
        let GridState { rows, snapshot, .. } = &mut *state;
        for row in rows.iter_mut().chain(snapshot.iter_mut()) {
            row.classes.entry(field.to_string()).or_insert(CellClass::Clean);
        }
        tracing::debug!(field, index, "choice column ready");
        true
    }

    async fn fetch_choice_options(
        &self,
        object: &str,
        field: &str,
    ) -> std::result::Result<Vec<ChoiceOption>, SourceError> {
        let record_type = self.schema.default_record_type(object).await?;
        self.schema.choice_options(object, &record_type, field).await
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Select a parent record and load its related rows
    ///
    /// Drafts and open popups from the previous parent are discarded. A
    /// fetch failure leaves the grid Ready with no rows and sets
    /// [`GridController::load_error`]. Returns the number of rows loaded.
    ///
    /// # Errors
    /// `GridError::Busy` while a load or save is in flight.
    pub async fn select_parent(&self, parent: impl Into<RecordId>) -> Result<usize> {
        let parent = parent.into();
        let fallback = {
            let mut state = self.state.lock();
            state.ensure_idle_or_ready()?;
            let fallback = state.phase;
            state.transition(GridPhase::Loading)?;
            state.parent = Some(parent.clone());
            state.drafts.clear();
            fallback
        };
        let in_flight = InFlight::new(&self.state, fallback);
        self.registry.broadcast_reset_all(&ContextToken::ResetAll);

        let fetched = self.source.fetch_related_rows(&parent).await;

        let (loaded, notice) = {
            let mut state = self.state.lock();
            let outcome = self.apply_fetch(&mut state, &parent, fetched);
            state.transition(GridPhase::Ready)?;
            outcome
        };
        in_flight.disarm();
        if let Some(notice) = notice {
            self.notifier.notify(notice);
        }
        Ok(loaded.unwrap_or(0))
    }

    fn apply_fetch(
        &self,
        state: &mut GridState,
        parent: &RecordId,
        fetched: std::result::Result<Vec<Record>, SourceError>,
    ) -> (Option<usize>, Option<Notification>) {
        match fetched {
            Ok(records) => {
                let rows: Vec<Row> = records
                    .into_iter()
                    .map(|record| {
                        let mut row = Row::decorate(record, &state.columns);
                        for mapping in &self.config.field_map {
                            row.classes
                                .entry(mapping.class_slot.clone())
                                .or_insert(CellClass::Clean);
                        }
                        row
                    })
                    .collect();
                let count = rows.len();
                state.snapshot.clone_from(&rows);
                state.rows = rows;
                state.load_error = None;
                tracing::info!(%parent, rows = count, "related rows loaded");
                (Some(count), None)
            }
            Err(e) => {
                tracing::warn!(%parent, error = %e, "fetching related rows failed");
                state.rows.clear();
                state.snapshot.clear();
                state.load_error = Some(e.detail().to_string());
                let notice = self.config.notify_fetch_failures.then(|| {
                    Notification::warning(self.config.messages.error_title.clone(), e.detail())
                });
                (None, notice)
            }
        }
    }

    // ------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------

    /// Route any signal to its operation
    ///
    /// # Errors
    /// Whatever the routed operation returns.
    pub async fn dispatch(&self, signal: impl Into<Signal>) -> Result<Dispatched> {
        match signal.into() {
            Signal::Editor(EditorSignal::Register(registration)) => {
                self.register(registration);
                Ok(Dispatched::Registered)
            }
            Signal::Editor(EditorSignal::Opened(payload)) => {
                self.editor_opened(&payload).map(Dispatched::Opened)
            }
            Signal::Editor(EditorSignal::ValueChanged(payload)) => {
                self.editor_value_changed(&payload).map(|()| Dispatched::Edited)
            }
            Signal::Editor(EditorSignal::BlurredWithoutChange(payload)) => {
                self.editor_blurred(&payload);
                Ok(Dispatched::Blurred)
            }
            Signal::Grid(GridSignal::CellEdit(entry)) => {
                self.cell_grid_edit(entry).map(|()| Dispatched::Edited)
            }
            Signal::Grid(GridSignal::Save(entries)) => self.save(entries).await.map(Dispatched::Saved),
            Signal::Grid(GridSignal::Cancel) => self.cancel().map(|()| Dispatched::Cancelled),
        }
    }

    /// Add an editor to the registry
    pub fn register(&self, registration: EditorRegistration) {
        self.registry.register(registration);
    }

    /// An editor opened: close every other editor and highlight the cell
    ///
    /// The broadcast always runs; the highlight needs a loaded row. Cells
    /// that are dirty or hidden keep their class.
    ///
    /// # Errors
    /// `GridError::UnknownRow` if the editor's row is not loaded.
    pub fn editor_opened(&self, payload: &EditorPayload) -> Result<BroadcastReport> {
        let report = self.registry.broadcast_reset_all(&ContextToken::Origin {
            row: payload.context.clone(),
            instance: payload.instance,
        });
        tracing::debug!(row = %payload.context, label = %payload.label, "editor opened");

        let mut state = self.state.lock();
        state.row_mut(&payload.context)?;
        state.clear_editing();
        let row = state.row_mut(&payload.context)?;
        match self.config.mapping(&payload.label) {
            Some(mapping) => match row.class(&mapping.class_slot) {
                Some(CellClass::Dirty | CellClass::Hidden) => {}
                _ => row.set_class(mapping.class_slot.clone(), CellClass::Editing),
            },
            None => row.clear_class(&payload.label),
        }
        Ok(report)
    }

    /// An editor committed a value: record the draft and show it
    ///
    /// # Errors
    /// `GridError::Busy` outside Ready, `GridError::UnknownRow` for a row
    /// that is not loaded.
    pub fn editor_value_changed(&self, payload: &EditorPayload) -> Result<()> {
        let mut state = self.state.lock();
        state.ensure_ready()?;

        let mapping = self.config.mapping(&payload.label);
        let field = mapping.map_or(payload.label.as_str(), |m| m.field.as_str());
        let is_lookup = state.is_lookup(field);

        let row = state.row_mut(&payload.context)?;
        row.fields.insert(field.to_string(), payload.value.clone());
        if let Some(mapping) = mapping {
            row.set_class(mapping.class_slot.clone(), CellClass::Dirty);
        }
        if is_lookup {
            row.display_names.remove(field);
            match payload.value.as_text().filter(|v| !v.is_empty()) {
                Some(target) => {
                    row.links.insert(field.to_string(), format!("/{target}"));
                }
                None => {
                    row.links.remove(field);
                }
            }
        }

        state
            .drafts
            .upsert(&payload.context, [(field.to_string(), payload.value.clone())]);
        tracing::debug!(row = %payload.context, field, "draft recorded");
        Ok(())
    }

    /// A choice editor closed without a change: drop the pre-edit highlight
    pub fn editor_blurred(&self, payload: &EditorPayload) {
        let Some(mapping) = self.config.mapping(&payload.label) else {
            return;
        };
        let mut state = self.state.lock();
        if let Ok(row) = state.row_mut(&payload.context) {
            if row.class(&mapping.class_slot) == Some(CellClass::Editing) {
                row.set_class(mapping.class_slot.clone(), CellClass::Clean);
            }
        }
        tracing::debug!(row = %payload.context, label = %payload.label, "editor closed unchanged");
    }

    /// Native inline edit from the grid
    ///
    /// # Errors
    /// `GridError::Busy` outside Ready, `GridError::UnknownRow` for a row
    /// that is not loaded.
    pub fn cell_grid_edit(&self, entry: DraftEntry) -> Result<()> {
        let mut state = self.state.lock();
        state.ensure_ready()?;
        state.row_mut(&entry.id)?;
        tracing::debug!(row = %entry.id, fields = entry.fields.len(), "grid cell edit");
        state.drafts.upsert_entry(entry);
        Ok(())
    }

    /// Resolve a lookup editor's display name and show it on its row
    ///
    /// Without a resolver the editor's last resolution is returned unchanged.
    pub async fn refresh_lookup(&self, editor: &mut LookupEditor) -> String {
        let Some(resolver) = &self.resolver else {
            return editor.display_name().to_string();
        };
        let name = editor.refresh_display(resolver).await.to_string();
        let link = editor.link();

        let binding = editor.binding();
        let field = self
            .config
            .mapping(&binding.label)
            .map_or(binding.label.as_str(), |m| m.field.as_str());
        let mut state = self.state.lock();
        if let Ok(row) = state.row_mut(&binding.context) {
            if name.is_empty() {
                row.display_names.remove(field);
            } else {
                row.display_names.insert(field.to_string(), name.clone());
                row.links.insert(field.to_string(), link);
            }
        }
        name
    }

    // ------------------------------------------------------------------
    // Cancel / save
    // ------------------------------------------------------------------

    /// Discard every draft and restore the last-saved rows
    ///
    /// # Errors
    /// `GridError::Busy` while a load or save is in flight,
    /// `GridError::InvalidTransition` before any parent was loaded.
    pub fn cancel(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            state.ensure_idle_or_ready()?;
            state.transition(GridPhase::Ready)?;
            state.rows = state.snapshot.clone();
            state.drafts.clear();
        }
        self.registry.broadcast_reset_all(&ContextToken::ResetAll);
        tracing::info!("drafts discarded");
        Ok(())
    }

    /// Submit the drafts, then reload from the backend
    ///
    /// `grid_drafts` are the grid's own pending values; they are merged into
    /// the draft store first. Drafts are cleared before the persist call
    /// whatever its outcome, and the reload runs after it resolves.
    ///
    /// # Errors
    /// `GridError::Busy` while a load or save is in flight,
    /// `GridError::NoParentSelected` before any parent was selected.
    pub async fn save(&self, grid_drafts: Vec<DraftEntry>) -> Result<SaveReport> {
        let (parent, submitted) = {
            let mut state = self.state.lock();
            state.ensure_idle_or_ready()?;
            let parent = state.parent.clone().ok_or(GridError::NoParentSelected)?;
            state.transition(GridPhase::Saving)?;
            for entry in grid_drafts {
                state.drafts.upsert_entry(entry);
            }
            let submitted = state.drafts.all();
            state.drafts.clear();
            (parent, submitted)
        };
        let in_flight = InFlight::new(&self.state, GridPhase::Ready);
        self.registry.broadcast_reset_all(&ContextToken::ResetAll);
        tracing::info!(%parent, drafts = submitted.len(), "saving drafts");

        let outcome = match self.source.persist_edits(&submitted).await {
            Ok(ack) => {
                self.notifier.notify(Notification::success(
                    self.config.messages.success_title.clone(),
                    self.config.messages.success_message.clone(),
                ));
                let ids: Vec<RecordId> = submitted.iter().map(|e| e.id.clone()).collect();
                self.source.invalidate(&ids).await;
                if let Some(resolver) = &self.resolver {
                    resolver.invalidate_all();
                }
                SaveOutcome::Persisted(ack)
            }
            Err(e) => {
                tracing::warn!(%parent, error = %e, "persisting drafts failed");
                self.notifier.notify(Notification::error(
                    self.config.messages.error_title.clone(),
                    e.detail(),
                ));
                SaveOutcome::Failed(e.detail().to_string())
            }
        };

        let fetched = self.source.fetch_related_rows(&parent).await;
        let (loaded, notice) = {
            let mut state = self.state.lock();
            let outcome = self.apply_fetch(&mut state, &parent, fetched);
            state.transition(GridPhase::Ready)?;
            outcome
        };
        in_flight.disarm();
        if let Some(notice) = notice {
            self.notifier.notify(notice);
        }

        Ok(SaveReport {
            submitted,
            outcome,
            reloaded: loaded.is_some(),
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> GridPhase {
        self.state.lock().phase
    }

    /// Spinner and table visibility
    #[must_use]
    pub fn view(&self) -> ViewState {
        self.phase().view()
    }

    /// Selected parent
    #[must_use]
    pub fn parent(&self) -> Option<RecordId> {
        self.state.lock().parent.clone()
    }

    /// Displayed rows (a copy)
    #[must_use]
    pub fn rows(&self) -> Vec<Row> {
        self.state.lock().rows.clone()
    }

    /// One displayed row
    #[must_use]
    pub fn row(&self, id: &RecordId) -> Option<Row> {
        self.state.lock().rows.iter().find(|r| &r.id == id).cloned()
    }

    /// Last-saved rows (a copy)
    #[must_use]
    pub fn snapshot(&self) -> Vec<Row> {
        self.state.lock().snapshot.clone()
    }

    /// Pending drafts in first-edit order
    #[must_use]
    pub fn drafts(&self) -> Vec<DraftEntry> {
        self.state.lock().drafts.all()
    }

    /// Column schema
    #[must_use]
    pub fn columns(&self) -> Vec<ColumnDef> {
        self.state.lock().columns.clone()
    }

    /// Options of the choice column, once resolved
    #[must_use]
    pub fn choice_options(&self) -> Vec<ChoiceOption> {
        self.state.lock().choice_options.clone()
    }

    /// Detail of the last failed load, cleared by the next successful one
    #[must_use]
    pub fn load_error(&self) -> Option<String> {
        self.state.lock().load_error.clone()
    }

    /// Editor registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<EditorRegistry> {
        &self.registry
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }
}

impl std::fmt::Debug for GridController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("GridController")
            .field("phase", &state.phase)
            .field("parent", &state.parent)
            .field("rows", &state.rows.len())
            .field("drafts", &state.drafts.len())
            .field("editors", &self.registry.len())
            .finish_non_exhaustive()
    }
}
