use draftgrid_editor::{
    CellBinding, CellEditor, ChoiceEditor, ContextToken, DismissalCoordinator, EditorRegistry,
    EditorSignal, Interaction, InteractionHub, LookupEditor,
};
use draftgrid_model::{ChoiceOption, FieldValue, RecordId};
use proptest::prelude::*;
use std::sync::Arc;

/// Editors on three rows, two fields each (one choice, one lookup per row)
fn grid_editors(registry: &EditorRegistry) -> Vec<Box<dyn CellEditor>> {
    let mut editors: Vec<Box<dyn CellEditor>> = Vec::new();
    for row in ["1", "2", "3"] {
        editors.push(Box::new(ChoiceEditor::new(
            CellBinding::new(row, "Stage", "Stage"),
            vec![ChoiceOption::plain("Open"), ChoiceOption::plain("Won")],
            FieldValue::from("Open"),
        )));
        editors.push(Box::new(LookupEditor::new(
            CellBinding::new(row, "Account", "Account"),
            "Opportunity",
            vec!["Account.Name".to_string()],
            FieldValue::Null,
        )));
    }
    for editor in &mut editors {
        if let Some(EditorSignal::Register(registration)) = editor.mount() {
            registry.register(registration);
        }
    }
    editors
}

/// Open editor `index` the way the grid owner does it
fn open_with_origin(editors: &mut [Box<dyn CellEditor>], registry: &EditorRegistry, index: usize) {
    let signal = editors[index].open();
    let payload = signal.payload().cloned().unwrap();
    registry.broadcast_reset_all(&ContextToken::Origin {
        row: payload.context,
        instance: payload.instance,
    });
}

#[derive(Debug, Clone)]
enum Step {
    Open(usize),
    ClickOutside,
    ClickRow(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..6).prop_map(Step::Open),
        Just(Step::ClickOutside),
        (0usize..3).prop_map(Step::ClickRow),
    ]
}

proptest! {
    #[test]
    fn at_most_one_editor_open(steps in proptest::collection::vec(step(), 1..40)) {
        let registry = Arc::new(EditorRegistry::new());
        let mut editors = grid_editors(&registry);
        let hub = InteractionHub::new();
        let _guard = DismissalCoordinator::new(Arc::clone(&registry)).attach(&hub);

        for step in steps {
            match step {
                Step::Open(i) => open_with_origin(&mut editors, &registry, i),
                Step::ClickOutside => {
                    hub.dispatch(&Interaction::Outside);
                }
                Step::ClickRow(r) => {
                    hub.dispatch(&Interaction::Row(RecordId::new((r + 1).to_string())));
                }
            }
            let open = editors.iter().filter(|e| e.is_open()).count();
            prop_assert!(open <= 1);
            prop_assert_eq!(registry.open_count(), open);
        }
    }

    #[test]
    fn dropped_editors_never_block_broadcasts(drop_mask in proptest::collection::vec(any::<bool>(), 6)) {
        let registry = EditorRegistry::new();
        let editors = grid_editors(&registry);
        let mut kept = Vec::new();
        for (editor, dropped) in editors.into_iter().zip(&drop_mask) {
            if !*dropped {
                kept.push(editor);
            }
        }
        for editor in &mut kept {
            editor.open();
        }

        let report = registry.broadcast_reset_all(&ContextToken::ResetAll);
        prop_assert_eq!(report.notified, kept.len());
        prop_assert_eq!(report.closed, kept.len());
        prop_assert_eq!(report.pruned, 6 - kept.len());
        prop_assert_eq!(registry.len(), kept.len());
        prop_assert!(kept.iter().all(|e| !e.is_open()));
    }
}

#[test]
fn two_editors_on_same_row_cannot_both_stay_open() {
    let registry = EditorRegistry::new();
    let mut editors = grid_editors(&registry);

    open_with_origin(&mut editors, &registry, 0);
    open_with_origin(&mut editors, &registry, 1);

    assert!(!editors[0].is_open());
    assert!(editors[1].is_open());
}

#[test]
fn remounting_after_unmount_reattaches_one_listener() {
    let registry = Arc::new(EditorRegistry::new());
    let hub = InteractionHub::new();
    let coordinator = DismissalCoordinator::new(registry);

    let first = coordinator.attach(&hub);
    drop(first);
    let _second = coordinator.attach(&hub);
    assert_eq!(hub.listener_count(), 1);
}
