use draftgrid_core::{GridConfig, GridPhase, NotificationVariant, SaveOutcome};
use draftgrid_model::{CellClass, FieldValue, RecordId};
use draftgrid_sim::{run, EditorSlot, Scenario, Step};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::PathBuf;

fn scenario(name: &str) -> Scenario {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name);
    Scenario::load(path).unwrap()
}

#[tokio::test]
async fn stage_and_account_edits_are_saved() {
    let outcome = run(&scenario("stage_edit_save.toml"), GridConfig::default())
        .await
        .unwrap();

    assert_eq!(outcome.phase, GridPhase::Ready);
    assert!(outcome.drafts.is_empty());
    assert_eq!(outcome.saves.len(), 1);

    let save = &outcome.saves[0];
    assert!(save.is_persisted());
    assert!(save.reloaded);
    assert_eq!(save.submitted.len(), 2);

    let a = outcome.rows.iter().find(|r| r.id == RecordId::new("006A")).unwrap();
    assert_eq!(a.field("StageName"), Some(&FieldValue::from("Won")));
    assert_eq!(a.class("StageName"), Some(CellClass::Clean));
    let b = outcome.rows.iter().find(|r| r.id == RecordId::new("006B")).unwrap();
    assert_eq!(b.field("AccountId"), Some(&FieldValue::from("001B")));
    assert_ne!(b.display_names.get("AccountId").map(String::as_str), Some("Acme"));

    assert_eq!(outcome.notifications.len(), 1);
    assert_eq!(outcome.notifications[0].variant, NotificationVariant::Success);
}

#[tokio::test]
async fn rejected_save_reloads_stored_rows() {
    let outcome = run(&scenario("persist_failure.toml"), GridConfig::default())
        .await
        .unwrap();

    let save = &outcome.saves[0];
    assert_eq!(
        save.outcome,
        SaveOutcome::Failed("FIELD_CUSTOM_VALIDATION_EXCEPTION".to_string())
    );
    assert!(outcome.drafts.is_empty());
    assert_eq!(
        outcome.rows[0].field("StageName"),
        Some(&FieldValue::from("Open"))
    );
    assert_eq!(outcome.notifications[0].variant, NotificationVariant::Error);
    assert_eq!(outcome.notifications[0].message, "FIELD_CUSTOM_VALIDATION_EXCEPTION");
}

#[tokio::test]
async fn second_popup_and_outside_click_close_editors() {
    let mut script = scenario("dismissal.toml");
    let outside = script.steps.pop().unwrap();
    assert_eq!(outside, Step::ClickOutside);

    let before = run(&script, GridConfig::default()).await.unwrap();
    assert_eq!(before.open_editors, 1);

    script.steps.push(outside);
    let after = run(&script, GridConfig::default()).await.unwrap();
    assert_eq!(after.open_editors, 0);
}

#[tokio::test]
async fn cancel_discards_pending_edit() {
    let mut script = scenario("persist_failure.toml");
    script.steps.pop();
    script.steps.push(Step::Cancel);

    let outcome = run(&script, GridConfig::default()).await.unwrap();
    assert!(outcome.saves.is_empty());
    assert!(outcome.drafts.is_empty());
    assert_eq!(
        outcome.rows[0].field("StageName"),
        Some(&FieldValue::from("Open"))
    );
    assert_eq!(outcome.rows[0].class("StageName"), Some(CellClass::Clean));
}

#[tokio::test]
async fn unsaved_edit_stays_as_draft() {
    let mut script = scenario("persist_failure.toml");
    script.steps.pop();

    let outcome = run(&script, GridConfig::default()).await.unwrap();
    assert_eq!(outcome.drafts.len(), 1);
    assert_eq!(outcome.rows[0].class("StageName"), Some(CellClass::Dirty));
    assert_eq!(outcome.open_editors, 0);
}

#[tokio::test]
async fn failed_fetch_is_reported_in_outcome() {
    let script = Scenario::from_toml_str(
        r#"
parent = "001P"
fetch_fails = "INSUFFICIENT_ACCESS"

[[steps]]
action = "select"
"#,
    )
    .unwrap();

    let outcome = run(&script, GridConfig::default()).await.unwrap();
    assert!(outcome.rows.is_empty());
    assert!(outcome.load_error.unwrap().contains("INSUFFICIENT_ACCESS"));
    assert!(outcome.notifications.is_empty());
}

#[tokio::test]
async fn step_on_missing_row_names_the_step() {
    let mut script = scenario("dismissal.toml");
    script.steps.push(Step::Open {
        row: "006Z".to_string(),
        editor: EditorSlot::Account,
    });

    let err = run(&script, GridConfig::default()).await.unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("step 6"), "{message}");
    assert!(message.contains("006Z"), "{message}");
}

#[tokio::test]
async fn edit_before_select_is_rejected() {
    let script = Scenario::from_toml_str(
        r#"
parent = "001P"

[[steps]]
action = "save"
"#,
    )
    .unwrap();

    assert!(run(&script, GridConfig::default()).await.is_err());
}

#[test]
fn scenario_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
parent = "001P"
choices = ["Open"]

[[steps]]
action = "cell_edit"
row = "006A"
field = "Amount"
value = 1200.5

[[steps]]
action = "confirm"
row = "006A"
editor = "stage"
"#
    )
    .unwrap();

    let script = Scenario::load(file.path()).unwrap();
    assert_eq!(script.choices, vec!["Open".to_string()]);
    assert_eq!(
        script.steps,
        vec![
            Step::CellEdit {
                row: "006A".to_string(),
                field: "Amount".to_string(),
                value: FieldValue::from(1200.5),
            },
            Step::Confirm {
                row: "006A".to_string(),
                editor: EditorSlot::Stage,
                value: None,
            },
        ]
    );
}

#[test]
fn unknown_action_is_rejected() {
    let err = Scenario::from_toml_str(
        r#"
parent = "001P"

[[steps]]
action = "teleport"
"#,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("invalid scenario"));
}
