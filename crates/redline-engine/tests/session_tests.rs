// Test suite for the analyze → apply session and engine commands

use redline_core::config::RedlineConfig;
use redline_core::errors::ExErrorKind;
use redline_core::model::{Action, Row, Snapshot, Target};
use redline_core_types::{RunContext, TraceId};
use redline_engine::commands::engine_command::{
    apply_engine_command, EngineCommand, EngineCommandResult,
};
use redline_engine::commands::session::Session;
use redline_engine::commands::update::SourceKind;
use redline_store::workbook::Workbook;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn setup_v1(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("tracker.json");
    let mut v1 = Snapshot::skeleton("Log_ID");
    v1.version = 1;
    v1.columns.push("Status".to_string());
    v1.rows.push(Row::from([
        ("Log_ID".to_string(), "A1".to_string()),
        ("Status".to_string(), "Open".to_string()),
    ]));
    let mut workbook = Workbook::new();
    workbook.append_snapshot(&v1).unwrap();
    workbook.write_new(&path).unwrap();
    path
}

fn write_changes(dir: &TempDir, value: serde_json::Value) -> PathBuf {
    let path = dir.path().join("changes.json");
    fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();
    path
}

#[test]
fn test_analyze_then_apply() {
    // GIVEN a session that analyzed one change
    let dir = TempDir::new().unwrap();
    let dest = setup_v1(&dir);
    let source = write_changes(
        &dir,
        json!([{"Log_ID": "A1", "column": "Status", "new_value": "Closed", "action": "ADD_UPDATE"}]),
    );
    let mut session = Session::new(RedlineConfig::default());

    let records = session.analyze(&source, SourceKind::ChangeList).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].target, Target::Cell("Status".to_string()));
    assert_eq!(records[0].action, Action::AddUpdate);
    let first_run = session.context().run_id.clone();

    // WHEN the analysis is applied
    let outcome = session.apply(&dest).unwrap();

    // THEN V2 exists, the analysis is consumed and a new run begins
    assert_eq!(outcome.status.version(), 2);
    assert_eq!(outcome.run_id, first_run);
    assert!(session.analysis().is_none());
    assert!(session.pending().is_empty());
    assert_ne!(session.context().run_id, first_run);
}

#[test]
fn test_apply_without_analyze_is_rejected() {
    let dir = TempDir::new().unwrap();
    let dest = setup_v1(&dir);
    let mut session = Session::new(RedlineConfig::default());

    let err = session.apply(&dest).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(Workbook::load(&dest).unwrap().snapshot_versions(), vec![1]);
}

#[test]
fn test_failed_analyze_clears_previous_analysis() {
    // GIVEN a session holding an analysis
    let dir = TempDir::new().unwrap();
    let good = write_changes(&dir, json!([{"Log_ID": "A1", "action": "DELETE"}]));
    let mut session = Session::new(RedlineConfig::default());
    session.analyze(&good, SourceKind::ChangeList).unwrap();
    assert_eq!(session.pending().len(), 1);

    // WHEN a second analyze fails
    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"[{"Log_ID": "A1", "action": "RENAME"}]"#).unwrap();
    let err = session.analyze(&bad, SourceKind::ChangeList).unwrap_err();

    // THEN nothing is pending
    assert_eq!(err.kind(), ExErrorKind::InvalidChangeRecord);
    assert!(session.analysis().is_none());
}

#[test]
fn test_errors_carry_trace_id() {
    let dir = TempDir::new().unwrap();
    let trace = TraceId::new();
    let ctx = RunContext::new().with_trace_id(trace.clone());
    let mut session = Session::with_context(RedlineConfig::default(), ctx);

    let err = session
        .analyze(&dir.path().join("missing.json"), SourceKind::Table)
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InputMissing);
    assert_eq!(err.trace_id(), Some(&trace));
}

#[test]
fn test_reset_drops_pending_changes() {
    let dir = TempDir::new().unwrap();
    let source = write_changes(&dir, json!([{"Log_ID": "A1", "action": "DELETE"}]));
    let mut session = Session::new(RedlineConfig::default());
    session.analyze(&source, SourceKind::ChangeList).unwrap();

    session.reset();

    assert!(session.pending().is_empty());
}

#[test]
fn test_preview_command_does_not_touch_workbook() {
    // GIVEN a workbook and a change list
    let dir = TempDir::new().unwrap();
    let dest = setup_v1(&dir);
    let before = fs::read_to_string(&dest).unwrap();
    let source = write_changes(&dir, json!([{"Log_ID": "A1", "action": "DELETE"}]));

    // WHEN previewing
    let result = apply_engine_command(
        EngineCommand::Preview {
            source,
            kind: SourceKind::ChangeList,
        },
        &RedlineConfig::default(),
        &RunContext::new(),
    )
    .unwrap();

    // THEN the records come back and the workbook is unchanged
    match result {
        EngineCommandResult::Preview(records) => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].target, Target::Row);
            assert_eq!(records[0].action, Action::Delete);
        }
        other => panic!("expected preview, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(&dest).unwrap(), before);
}
