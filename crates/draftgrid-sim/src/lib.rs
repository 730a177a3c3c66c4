//! Scripted grid sessions
//!
//! A [`Scenario`] describes the backend (rows, choice options, account
//! names, injected failures) and a list of user [`Step`]s. [`run`] builds
//! in-memory collaborators, mounts one stage editor and one account editor
//! per loaded row, replays the steps through a [`GridController`] and
//! returns the final [`Outcome`].

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use anyhow::{anyhow, Context};
use draftgrid_core::memory::{CollectingNotifier, InMemoryRecordSource, InMemoryResolver, InMemorySchema};
use draftgrid_core::{
    Dispatched, GridConfig, GridController, GridPhase, GridSignal, Notification, SaveReport,
};
use draftgrid_editor::{
    CellBinding, CellEditor, ChoiceEditor, Interaction, InteractionHub, LookupEditor,
};
use draftgrid_model::{ChoiceOption, DraftEntry, FieldValue, Record, RecordId, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Which popup editor of a row a step targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorSlot {
    /// Choice editor on the stage field
    Stage,
    /// Lookup editor on the account field
    Account,
}

/// One user action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Select the scenario's parent and load its rows
    Select,
    /// Open a popup editor
    Open {
        /// Row id
        row: String,
        /// Target editor
        editor: EditorSlot,
    },
    /// Confirm a value in a popup editor (absent value clears)
    Confirm {
        /// Row id
        row: String,
        /// Target editor
        editor: EditorSlot,
        /// New value
        #[serde(default)]
        value: Option<FieldValue>,
    },
    /// Close a popup editor without confirming
    Blur {
        /// Row id
        row: String,
        /// Target editor
        editor: EditorSlot,
    },
    /// Interaction outside every row and popup
    ClickOutside,
    /// Interaction on a row
    ClickRow {
        /// Row id
        row: String,
    },
    /// Inline edit of a plain column
    CellEdit {
        /// Row id
        row: String,
        /// Field name
        field: String,
        /// New value
        value: FieldValue,
    },
    /// Save the drafts
    Save,
    /// Discard the drafts
    Cancel,
}

/// A scripted session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Parent record whose rows are edited
    pub parent: String,
    /// Stage choice options
    #[serde(default)]
    pub choices: Vec<String>,
    /// Account id to display name
    #[serde(default)]
    pub accounts: BTreeMap<String, String>,
    /// Persist failure detail, if persisting should fail
    #[serde(default)]
    pub persist_fails: Option<String>,
    /// Fetch failure detail, if fetching should fail
    #[serde(default)]
    pub fetch_fails: Option<String>,
    /// Related rows held by the backend
    #[serde(default)]
    pub rows: Vec<Record>,
    /// Actions to replay
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Parse a TOML scenario
    ///
    /// # Errors
    /// Malformed TOML or an unknown step.
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        toml::from_str(source).context("invalid scenario")
    }

    /// Read and parse a TOML scenario file
    ///
    /// # Errors
    /// Unreadable file, otherwise as [`Scenario::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read scenario {}", path.display()))?;
        Self::from_toml_str(&source)
    }
}

/// Final grid state after a replay
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// Final phase
    pub phase: GridPhase,
    /// Displayed rows
    pub rows: Vec<Row>,
    /// Pending drafts
    pub drafts: Vec<DraftEntry>,
    /// Every notification raised
    pub notifications: Vec<Notification>,
    /// Report of every save
    pub saves: Vec<SaveReport>,
    /// Popups open at the end
    pub open_editors: usize,
    /// Detail of the last failed load
    pub load_error: Option<String>,
}

struct Session {
    parent: RecordId,
    controller: GridController,
    notifier: Arc<CollectingNotifier>,
    hub: InteractionHub,
    options: Vec<ChoiceOption>,
    stage: BTreeMap<RecordId, ChoiceEditor>,
    account: BTreeMap<RecordId, LookupEditor>,
    saves: Vec<SaveReport>,
}

impl Session {
    fn new(scenario: &Scenario, config: GridConfig) -> anyhow::Result<Self> {
        let source = InMemoryRecordSource::new().with_rows(scenario.parent.as_str(), scenario.rows.clone());
        source.fail_fetch(scenario.fetch_fails.as_deref());
        source.fail_persist(scenario.persist_fails.as_deref());

        let options: Vec<ChoiceOption> = scenario.choices.iter().map(ChoiceOption::plain).collect();
        let schema = InMemorySchema::new().with_options(config.choice_field.clone(), options.clone());
        let resolver = scenario
            .accounts
            .iter()
            .fold(InMemoryResolver::new(), |resolver, (id, name)| {
                resolver.with_value(id.as_str(), "Name", name.as_str())
            });
        let notifier = Arc::new(CollectingNotifier::new());

        let controller = GridController::new(
            config,
            Arc::new(source),
            Arc::new(schema),
            notifier.clone(),
        )?
        .with_resolver(Arc::new(resolver));

        let hub = InteractionHub::new();
        controller.mount(&hub);

        Ok(Self {
            parent: RecordId::new(scenario.parent.as_str()),
            controller,
            notifier,
            hub,
            options,
            stage: BTreeMap::new(),
            account: BTreeMap::new(),
            saves: Vec::new(),
        })
    }

    /// Replace every editor with fresh ones bound to the current rows
    async fn remount(&mut self) -> anyhow::Result<()> {
        self.stage.clear();
        self.account.clear();
        let choice_field = self.controller.config().choice_field.clone();

        for row in self.controller.rows() {
            let stage_value = row.field(&choice_field).cloned().unwrap_or_default();
            let mut stage = ChoiceEditor::new(
                CellBinding::new(row.id.clone(), "Stage", "Stage"),
                self.options.clone(),
                stage_value,
            );
            let account_value = row.field("AccountId").cloned().unwrap_or_default();
            let mut account = LookupEditor::new(
                CellBinding::new(row.id.clone(), "Account", "Account"),
                self.controller.config().object_api_name.clone(),
                vec!["Account.Name".to_string()],
                account_value,
            );

            if let Some(signal) = stage.mount() {
                self.controller.dispatch(signal).await?;
            }
            if let Some(signal) = account.mount() {
                self.controller.dispatch(signal).await?;
            }
            self.stage.insert(row.id.clone(), stage);
            self.account.insert(row.id, account);
        }
        Ok(())
    }

    fn editor(&mut self, row: &str, slot: EditorSlot) -> anyhow::Result<&mut dyn CellEditor> {
        let id = RecordId::new(row);
        let editor: Option<&mut dyn CellEditor> = match slot {
            EditorSlot::Stage => self.stage.get_mut(&id).map(|e| e as &mut dyn CellEditor),
            EditorSlot::Account => self.account.get_mut(&id).map(|e| e as &mut dyn CellEditor),
        };
        editor.ok_or_else(|| anyhow!("no {slot:?} editor on row {row}"))
    }

    async fn step(&mut self, step: &Step) -> anyhow::Result<()> {
        tracing::debug!(?step, "replaying step");
        match step {
            Step::Select => {
                self.controller.select_parent(self.parent.clone()).await?;
                self.remount().await?;
            }
            Step::Open { row, editor } => {
                let signal = self.editor(row, *editor)?.open();
                self.controller.dispatch(signal).await?;
            }
            Step::Confirm { row, editor, value } => {
                let value = value.clone().unwrap_or_default();
                let signal = self.editor(row, *editor)?.confirm(value)?;
                self.controller.dispatch(signal).await?;
                if *editor == EditorSlot::Account {
                    if let Some(lookup) = self.account.get_mut(&RecordId::new(row.as_str())) {
                        self.controller.refresh_lookup(lookup).await;
                    }
                }
            }
            Step::Blur { row, editor } => {
                if let Some(signal) = self.editor(row, *editor)?.blur() {
                    self.controller.dispatch(signal).await?;
                }
            }
            Step::ClickOutside => {
                self.hub.dispatch(&Interaction::Outside);
            }
            Step::ClickRow { row } => {
                self.hub.dispatch(&Interaction::Row(RecordId::new(row.as_str())));
            }
            Step::CellEdit { row, field, value } => {
                let entry = DraftEntry::new(row.as_str()).with_field(field.as_str(), value.clone());
                self.controller.dispatch(GridSignal::CellEdit(entry)).await?;
            }
            Step::Save => {
                if let Dispatched::Saved(report) = self.controller.dispatch(GridSignal::Save(Vec::new())).await? {
                    self.saves.push(report);
                }
                self.remount().await?;
            }
            Step::Cancel => {
                self.controller.dispatch(GridSignal::Cancel).await?;
                self.remount().await?;
            }
        }
        Ok(())
    }

    fn outcome(self) -> Outcome {
        let open_editors = self.stage.values().filter(|e| e.is_open()).count()
            + self.account.values().filter(|e| e.is_open()).count();
        Outcome {
            phase: self.controller.phase(),
            rows: self.controller.rows(),
            drafts: self.controller.drafts(),
            notifications: self.notifier.notifications(),
            saves: self.saves,
            open_editors,
            load_error: self.controller.load_error(),
        }
    }
}

/// Replay `scenario` and report the final state
///
/// # Errors
/// An invalid config, a step naming a missing editor, or a controller
/// operation rejected by the grid.
pub async fn run(scenario: &Scenario, config: GridConfig) -> anyhow::Result<Outcome> {
    let mut session = Session::new(scenario, config)?;
    session.controller.load_schema().await;

    for (index, step) in scenario.steps.iter().enumerate() {
        session
            .step(step)
            .await
            .with_context(|| format!("step {} ({step:?}) failed", index + 1))?;
    }

    session.controller.unmount();
    Ok(session.outcome())
}
