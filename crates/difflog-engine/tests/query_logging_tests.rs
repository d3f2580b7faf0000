#![allow(clippy::unwrap_used, clippy::expect_used)]

// Log events emitted by the engine, captured in memory. Engines here are
// built with from_parts so the capture subscriber stays installed.

use difflog_core::logging_facility::test_capture::init_test_capture;
use difflog_core::logging_facility::CapturedEvent;
use difflog_core::model::ExecutionMode;
use difflog_core::snapshot::MemorySnapshotStore;
use difflog_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use difflog_engine::{Config, Engine, FixedHostIdentity, SqliteQueryExecutor};
use std::sync::Arc;

fn engine() -> Engine {
    Engine::from_parts(
        Config::default(),
        Arc::new(SqliteQueryExecutor::open_in_memory().unwrap()),
        Arc::new(MemorySnapshotStore::new()),
        Arc::new(FixedHostIdentity::new("h")),
    )
}

fn events_for(op: &str, query_name: &str) -> Vec<CapturedEvent> {
    init_test_capture().events_for_query(op, query_name)
}

#[test]
fn test_query_json_logs_start_and_end() {
    init_test_capture();
    let name = "logging_ok_unique_1";
    engine()
        .query(name, "SELECT 1 AS x", ExecutionMode::Differential)
        .unwrap();

    let events = events_for("query_json", name);
    assert!(events.iter().any(|e| e.is("query_json", EVENT_START)));
    let end = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END))
        .expect("end event");
    assert!(end.field("request_id").is_some());
    assert!(end.field("duration_ms").is_some());

    let diff_end = events_for("differential", name)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END))
        .expect("differential end event");
    assert_eq!(diff_end.field("counter"), Some("0"));
    assert_eq!(diff_end.field("added_len"), Some("1"));
    assert_eq!(diff_end.field("removed_len"), Some("0"));
}

#[test]
fn test_query_failure_logs_error_with_code() {
    init_test_capture();
    let name = "logging_err_unique_2";
    let out = engine().query_json(name, "SELECT * FROM nowhere", ExecutionMode::Differential);
    assert!(!out.is_ok());

    let error = events_for("query_json", name)
        .into_iter()
        .find(|e| e.is("query_json", EVENT_END_ERROR))
        .expect("error event");
    assert_eq!(error.field("err_code"), Some("ERR_QUERY_FAILED"));
    assert_eq!(error.status(), Some(out.status));
    // The missing table is reported by SQLite itself
    assert_eq!(error.field("engine_status"), Some("1"));
}

#[test]
fn test_row_values_are_not_logged() {
    let capture = init_test_capture();
    let name = "logging_values_unique_3";
    engine()
        .query(
            name,
            "SELECT 'very-secret-value' AS token",
            ExecutionMode::Snapshot,
        )
        .unwrap();

    let leaked = capture.count_events(|e| {
        e.fields.values().any(|v| v.contains("very-secret-value"))
    });
    assert_eq!(leaked, 0);
    assert!(!events_for("snapshot_query", name).is_empty());
}
