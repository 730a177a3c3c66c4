//! Testing utilities for the draftgrid workspace
//!
//! Shared fixtures and controller setup.

#![allow(missing_docs)]

use draftgrid_core::memory::{CollectingNotifier, InMemoryRecordSource, InMemoryResolver, InMemorySchema};
use draftgrid_core::{GridConfig, GridController};
use draftgrid_editor::{CellBinding, ChoiceEditor, EditorInstanceId, EditorPayload, LookupEditor};
use draftgrid_model::{ChoiceOption, FieldValue, Record, RecordId};
use std::sync::Arc;

pub const PARENT: &str = "001P";

pub fn opportunity(id: &str, stage: &str) -> Record {
    Record::new(id)
        .with_field("Name", format!("Deal {id}"))
        .with_field("StageName", stage)
}

pub fn two_opportunities() -> Vec<Record> {
    vec![opportunity("1", "Open"), opportunity("2", "Closed")]
}

pub fn stage_options() -> Vec<ChoiceOption> {
    ["Open", "Won", "Closed"].into_iter().map(ChoiceOption::plain).collect()
}

/// Controller plus handles on its in-memory collaborators
pub struct TestGrid {
    pub controller: GridController,
    pub source: Arc<InMemoryRecordSource>,
    pub notifier: Arc<CollectingNotifier>,
    pub resolver: Arc<InMemoryResolver>,
}

pub fn setup_controller() -> TestGrid {
    setup_controller_with(InMemoryRecordSource::new(), GridConfig::default())
}

pub fn setup_controller_with(source: InMemoryRecordSource, config: GridConfig) -> TestGrid {
    let source = Arc::new(source.with_rows(PARENT, two_opportunities()));
    let notifier = Arc::new(CollectingNotifier::new());
    let resolver = Arc::new(InMemoryResolver::new().with_value("001X", "Name", "Acme"));
    let controller = GridController::new(
        config,
        source.clone(),
        Arc::new(InMemorySchema::new().with_options("StageName", stage_options())),
        notifier.clone(),
    )
    .unwrap()
    .with_resolver(resolver.clone());
    TestGrid {
        controller,
        source,
        notifier,
        resolver,
    }
}

pub fn stage_payload(row: &str, value: &str) -> EditorPayload {
    EditorPayload {
        context: RecordId::new(row),
        instance: EditorInstanceId::new(),
        value: FieldValue::from(value),
        label: "Stage".to_string(),
        name: "Stage".to_string(),
    }
}

pub fn stage_editor(row: &str, value: &str) -> ChoiceEditor {
    ChoiceEditor::new(
        CellBinding::new(row, "Stage", "Stage"),
        stage_options(),
        FieldValue::from(value),
    )
}

pub fn account_editor(row: &str, value: FieldValue) -> LookupEditor {
    LookupEditor::new(
        CellBinding::new(row, "Account", "Account"),
        "Opportunity",
        vec!["Account.Name".to_string()],
        value,
    )
}
