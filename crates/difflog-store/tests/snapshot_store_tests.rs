// Test suite for the SQLite snapshot store
// Tests persistence across reopen, atomic replacement and corruption detection

use difflog_core::diff::DiffEngine;
use difflog_core::model::Row;
use difflog_core::snapshot::{Snapshot, SnapshotStore};
use difflog_core::ExErrorKind;
use difflog_store::SqliteSnapshotStore;
use rusqlite::Connection;
use tempfile::TempDir;

fn rows() -> Vec<Row> {
    vec![
        Row::new().with("pid", "1").with("name", "a"),
        Row::new().with("pid", "2").with("name", "b"),
    ]
}

#[test]
fn test_load_missing_is_none() {
    let store = SqliteSnapshotStore::open_in_memory().unwrap();
    assert!(store.load("procs").unwrap().is_none());
}

#[test]
fn test_store_then_load_preserves_order_and_bookkeeping() {
    let store = SqliteSnapshotStore::open_in_memory().unwrap();
    let snapshot = Snapshot::new(rows(), 5, 2);

    store.store("procs", &snapshot).unwrap();

    assert_eq!(store.load("procs").unwrap(), Some(snapshot));
}

#[test]
fn test_store_replaces_previous_rows() {
    let store = SqliteSnapshotStore::open_in_memory().unwrap();
    store.store("procs", &Snapshot::new(rows(), 0, 0)).unwrap();

    let replacement = Snapshot::new(vec![Row::new().with("pid", "9")], 1, 0);
    store.store("procs", &replacement).unwrap();

    assert_eq!(store.load("procs").unwrap(), Some(replacement));
}

#[test]
fn test_names_are_isolated() {
    let store = SqliteSnapshotStore::open_in_memory().unwrap();
    store.store("procs", &Snapshot::new(rows(), 3, 0)).unwrap();
    store.store("users", &Snapshot::new(vec![], 7, 0)).unwrap();

    assert_eq!(store.load("procs").unwrap().unwrap().rows.len(), 2);
    assert_eq!(store.load("users").unwrap().unwrap().counter, 7);
}

#[test]
fn test_snapshot_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("snapshots.db");

    {
        let store = SqliteSnapshotStore::open(&db_path).unwrap();
        store.store("procs", &Snapshot::new(rows(), 4, 1)).unwrap();
        store.flush().unwrap();
    }

    let reopened = SqliteSnapshotStore::open(&db_path).unwrap();
    let loaded = reopened.load("procs").unwrap().unwrap();
    assert_eq!(loaded.counter, 4);
    assert_eq!(loaded.epoch, 1);
    assert_eq!(loaded.rows, rows());
}

#[test]
fn test_tampered_row_is_detected() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("snapshots.db");

    let store = SqliteSnapshotStore::open(&db_path).unwrap();
    store.store("procs", &Snapshot::new(rows(), 0, 0)).unwrap();

    let conn = Connection::open(&db_path).unwrap();
    conn.execute(
        "UPDATE snapshot_rows SET row_json = '{\"name\":\"x\",\"pid\":\"1\"}' WHERE ordinal = 0",
        [],
    )
    .unwrap();

    let err = store.load("procs").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.query_name(), Some("procs"));
}

#[test]
fn test_missing_row_is_detected() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("snapshots.db");

    let store = SqliteSnapshotStore::open(&db_path).unwrap();
    store.store("procs", &Snapshot::new(rows(), 0, 0)).unwrap();

    let conn = Connection::open(&db_path).unwrap();
    conn.execute("DELETE FROM snapshot_rows WHERE ordinal = 1", [])
        .unwrap();

    assert_eq!(
        store.load("procs").unwrap_err().kind(),
        ExErrorKind::Persistence
    );
}

#[test]
fn test_diff_engine_over_sqlite_store() {
    let store = SqliteSnapshotStore::open_in_memory().unwrap();
    let engine = DiffEngine::new(&store, 0);

    let first = engine.prepare("procs", rows()).unwrap();
    engine.commit("procs", &first.next).unwrap();

    let second = engine
        .prepare("procs", vec![rows()[1].clone()])
        .unwrap();
    assert_eq!(second.counter, 1);
    assert!(second.diff.added.is_empty());
    assert_eq!(second.diff.removed.len(), 1);
    assert_eq!(second.diff.removed[0].get("pid"), Some("1"));
}
