// Integration tests for reading pipeline inputs

use redline_core::config::ExtractionMode;
use redline_core::errors::ExErrorKind;
use redline_core::model::Action;
use redline_store::source::{
    load_config_or_default, read_change_records, read_source_table,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

#[test]
fn test_read_yaml_source_table() {
    // Given: a YAML source with mixed bare and structured cells
    let path = fixtures_dir().join("source_cells.yaml");

    // When: we read it
    let table = read_source_table(&path).unwrap();

    // Then: header and highlights survive
    assert_eq!(table.header, vec!["Log_ID", "Status", "Owner"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][0].text, "A1");
    assert_eq!(table.rows[0][1].highlight(), Some("RED"));
    assert_eq!(table.rows[1][0].highlight(), None);
}

#[test]
fn test_read_json_source_table() {
    let table = read_source_table(&fixtures_dir().join("source_rows.json")).unwrap();

    assert_eq!(table.rows[0][1].highlight(), Some("PINK"));
}

#[test]
fn test_missing_source_is_input_missing() {
    let err = read_source_table(&fixtures_dir().join("does_not_exist.json")).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InputMissing);
    assert!(err.path().is_some());
}

#[test]
fn test_malformed_source_is_invalid_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{not json").unwrap();

    let err = read_source_table(&path).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_read_change_records_preserves_order_and_shapes() {
    let records = read_change_records(&fixtures_dir().join("changes.json"), "Log_ID").unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].key, "A1");
    assert!(!records[0].is_whole_row());
    assert!(records[1].is_whole_row());
    assert_eq!(records[1].fields.get("Status").map(String::as_str), Some("New"));
    assert_eq!(records[2].action, Action::Delete);
    assert!(records[2].is_whole_row());
}

#[test]
fn test_bad_action_is_invalid_change_record() {
    let err = read_change_records(&fixtures_dir().join("changes_bad_action.yaml"), "Log_ID")
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidChangeRecord);
    assert_eq!(err.row(), Some(1));
}

#[test]
fn test_config_defaults_without_file() {
    let dir = TempDir::new().unwrap();

    let config = load_config_or_default(None, dir.path()).unwrap();

    assert_eq!(config.key_column, "Log_ID");
    assert_eq!(config.mode, ExtractionMode::Cell);
}

#[test]
fn test_config_picked_up_from_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("redline.toml"), "mode = \"row\"\n").unwrap();

    let config = load_config_or_default(None, dir.path()).unwrap();

    assert_eq!(config.mode, ExtractionMode::Row);
}

#[test]
fn test_explicit_config_must_exist() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("custom.toml");

    let err = load_config_or_default(Some(&missing), dir.path()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InputMissing);
}

#[test]
fn test_invalid_config_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("redline.toml");
    fs::write(&path, "[colors]\nRED = \"UPSERT\"\n").unwrap();

    let err = load_config_or_default(None, dir.path()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
    assert_eq!(err.path(), Some(path.as_path()));
}
