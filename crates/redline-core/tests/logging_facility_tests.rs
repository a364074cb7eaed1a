#![allow(clippy::unwrap_used, clippy::expect_used)]

use redline_core::errors::{ExError, ExErrorKind, RedlineError};
use redline_core::logging_facility::test_capture::init_test_capture;
use redline_core::{log_op_end, log_op_error, log_op_start};
use redline_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    capture.assert_event_exists(op_name, EVENT_START);
}

#[test]
fn test_log_op_end_carries_duration() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one end event");
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_converts_domain_error() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = RedlineError::KeyColumnMissing {
        column: "Log_ID".to_string(),
        header: vec!["ID".to_string()],
    };
    log_op_error!(op_name, err, duration_ms = 7);

    let events = capture.events_for_op(op_name);
    let error_event = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");
    assert_eq!(error_event.field("err.code"), Some("ERR_KEY_COLUMN_MISSING"));
    assert_eq!(error_event.field("err.kind"), Some("KeyColumnMissing"));
}

#[test]
fn test_log_op_error_accepts_ex_error() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_4";

    let err = ExError::new(ExErrorKind::ChainLocked).with_message("held by another run");
    log_op_error!(op_name, err, duration_ms = 1, destination = "book.json");

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].field("err.code"), Some("ERR_CHAIN_LOCKED"));
    assert_eq!(events[0].field("destination"), Some("book.json"));
}

#[test]
fn test_start_end_pair_with_fields() {
    let capture = init_test_capture();
    let op_name = "test_start_end_unique_5";

    log_op_start!(op_name, change_count = 3);
    log_op_end!(op_name, duration_ms = 10, version = 2);

    let starts = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START)
    });
    let ends = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END)
    });
    assert_eq!(starts, 1);
    assert_eq!(ends, 1);

    let start = &capture.events_for_op(op_name)[0];
    assert_eq!(start.field("change_count"), Some("3"));
    assert!(start.field("component").is_some());
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_assert_event_exists_fails_for_unknown_op() {
    let capture = init_test_capture();

    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}
