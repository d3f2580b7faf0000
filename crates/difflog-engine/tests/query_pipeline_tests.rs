#![allow(clippy::unwrap_used, clippy::expect_used)]

// Pipeline tests over scripted collaborators: the executor returns queued
// results and the store counts every load and store it serves.

use difflog_core::errors::{ExError, ExErrorKind, Result};
use difflog_core::model::{ExecutionMode, LogFormat, ResultSet, Row, HASH_COLUMN};
use difflog_core::serialize::{parse_log_item, parse_rows};
use difflog_core::snapshot::digest::row_identity;
use difflog_core::snapshot::{MemorySnapshotStore, Snapshot, SnapshotStore};
use difflog_engine::{Config, Engine, FixedHostIdentity, QueryExecutor};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ScriptedExecutor {
    results: Mutex<VecDeque<Result<ResultSet>>>,
}

impl ScriptedExecutor {
    fn push_rows(&self, rows: Vec<Row>) {
        self.results.lock().unwrap().push_back(Ok(rows));
    }

    fn push_err(&self, err: ExError) {
        self.results.lock().unwrap().push_back(Err(err));
    }
}

impl QueryExecutor for ScriptedExecutor {
    fn execute(&self, _sql: &str) -> Result<ResultSet> {
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Default)]
struct CountingStore {
    inner: MemorySnapshotStore,
    loads: AtomicUsize,
    stores: AtomicUsize,
    fail_stores: AtomicBool,
}

impl SnapshotStore for CountingStore {
    fn load(&self, query_name: &str) -> Result<Option<Snapshot>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(query_name)
    }

    fn store(&self, query_name: &str, snapshot: &Snapshot) -> Result<()> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        if self.fail_stores.load(Ordering::SeqCst) {
            return Err(ExError::new(ExErrorKind::Persistence).with_message("disk full"));
        }
        self.inner.store(query_name, snapshot)
    }
}

struct Fixture {
    executor: Arc<ScriptedExecutor>,
    store: Arc<CountingStore>,
    engine: Engine,
}

fn fixture(config: Config) -> Fixture {
    let executor = Arc::new(ScriptedExecutor::default());
    let store = Arc::new(CountingStore::default());
    let engine = Engine::from_parts(
        config,
        executor.clone(),
        store.clone(),
        Arc::new(FixedHostIdentity::new("host-1")),
    );
    Fixture {
        executor,
        store,
        engine,
    }
}

fn proc_row(pid: &str, name: &str) -> Row {
    Row::new().with("pid", pid).with("name", name)
}

fn tagged(row: &Row) -> Row {
    row.clone().with(HASH_COLUMN, row_identity(row))
}

const PROCS_SQL: &str = "SELECT pid, name FROM processes";

#[test]
fn test_procs_three_executions() {
    let f = fixture(Config::default());
    let r1 = proc_row("1", "a");
    let r2 = proc_row("2", "b");

    f.executor.push_rows(vec![r1.clone()]);
    let first = f.engine.query_json("procs", PROCS_SQL, ExecutionMode::Differential);
    assert!(first.is_ok());
    let first = parse_log_item(first.text.as_deref().unwrap()).unwrap();
    assert_eq!(first.name, "procs");
    assert_eq!(first.host_identifier, "host-1");
    assert_eq!(first.counter, 0);
    assert!(!first.snapshot);
    assert_eq!(first.diff_results.added, vec![tagged(&r1)]);
    assert!(first.diff_results.removed.is_empty());

    f.executor.push_rows(vec![r1.clone()]);
    let second = f.engine.query_json("procs", PROCS_SQL, ExecutionMode::Differential);
    let second = parse_log_item(second.text.as_deref().unwrap()).unwrap();
    assert!(second.is_empty());
    assert_eq!(second.counter, 1);

    f.executor.push_rows(vec![r2.clone()]);
    let third = f.engine.query_json("procs", PROCS_SQL, ExecutionMode::Differential);
    let third = parse_log_item(third.text.as_deref().unwrap()).unwrap();
    assert_eq!(third.diff_results.added, vec![tagged(&r2)]);
    assert_eq!(third.diff_results.removed, vec![tagged(&r1)]);
    assert_eq!(third.counter, 2);

    assert_eq!(f.store.stores.load(Ordering::SeqCst), 3);
}

#[test]
fn test_upstream_failure_skips_store_and_surfaces_engine_status() {
    let f = fixture(Config::default());
    f.executor.push_err(
        ExError::new(ExErrorKind::QueryFailed)
            .with_engine_status(17)
            .with_message("no such table: processes"),
    );

    let out = f.engine.query_json("procs", PROCS_SQL, ExecutionMode::Differential);
    assert_eq!(out.text, None);
    assert_eq!(out.status, 17);
    assert_eq!(f.store.loads.load(Ordering::SeqCst), 0);
    assert_eq!(f.store.stores.load(Ordering::SeqCst), 0);
}

#[test]
fn test_failed_commit_leaves_previous_snapshot() {
    let f = fixture(Config::default());
    let r1 = proc_row("1", "a");

    f.executor.push_rows(vec![r1.clone()]);
    assert!(f
        .engine
        .query_json("procs", PROCS_SQL, ExecutionMode::Differential)
        .is_ok());

    f.store.fail_stores.store(true, Ordering::SeqCst);
    f.executor.push_rows(vec![proc_row("2", "b")]);
    let out = f.engine.query_json("procs", PROCS_SQL, ExecutionMode::Differential);
    assert_eq!(out.text, None);
    assert_eq!(out.status, ExErrorKind::Persistence.status());

    let stored = f.store.inner.load("procs").unwrap().unwrap();
    assert_eq!(stored.rows, vec![r1]);
    assert_eq!(stored.counter, 0);
}

#[test]
fn test_snapshot_mode_tags_rows_without_store() {
    let f = fixture(Config::default());
    let rows = vec![proc_row("1", "a"), proc_row("2", "b")];
    f.executor.push_rows(rows.clone());

    let out = f.engine.query_json("procs", PROCS_SQL, ExecutionMode::Snapshot);
    assert!(out.is_ok());
    let parsed = parse_rows(out.text.as_deref().unwrap()).unwrap();
    assert_eq!(parsed, vec![tagged(&rows[0]), tagged(&rows[1])]);
    assert_eq!(f.store.loads.load(Ordering::SeqCst), 0);
    assert_eq!(f.store.stores.load(Ordering::SeqCst), 0);
}

#[test]
fn test_snapshot_mode_allows_unnamed_query() {
    let f = fixture(Config::default());
    f.executor.push_rows(vec![]);
    let out = f.engine.query_json("", "SELECT 1", ExecutionMode::Snapshot);
    assert_eq!(out.text.as_deref(), Some("[]"));
    assert_eq!(out.status, 0);
}

#[test]
fn test_snapshot_mode_event_format() {
    let f = fixture(Config {
        log_format: LogFormat::Event,
        ..Config::default()
    });
    f.executor.push_rows(vec![proc_row("1", "a")]);

    let out = f.engine.query_json("procs", PROCS_SQL, ExecutionMode::Snapshot);
    let events: serde_json::Value = serde_json::from_str(out.text.as_deref().unwrap()).unwrap();
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["action"], "snapshot");
    assert_eq!(events[0]["columns"]["pid"], "1");
    assert!(events[0]["columns"][HASH_COLUMN].is_string());
    assert_eq!(f.store.stores.load(Ordering::SeqCst), 0);
}

#[test]
fn test_invalid_input_is_rejected_before_execution() {
    let f = fixture(Config::default());
    f.executor.push_rows(vec![proc_row("1", "a")]);

    let empty_sql = f.engine.query_json("procs", "  ", ExecutionMode::Differential);
    assert_eq!(empty_sql.text, None);
    assert_eq!(empty_sql.status, ExErrorKind::InvalidInput.status());

    let empty_name = f.engine.query_json("", PROCS_SQL, ExecutionMode::Differential);
    assert_eq!(empty_name.status, ExErrorKind::InvalidInput.status());

    assert_eq!(f.executor.results.lock().unwrap().len(), 1);
    assert_eq!(f.store.loads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_event_format_differential() {
    let f = fixture(Config {
        log_format: LogFormat::Event,
        ..Config::default()
    });
    f.executor.push_rows(vec![proc_row("1", "a")]);
    f.engine
        .query(
            "procs",
            PROCS_SQL,
            ExecutionMode::Differential,
        )
        .unwrap();

    f.executor.push_rows(vec![proc_row("2", "b")]);
    let text = f
        .engine
        .query("procs", PROCS_SQL, ExecutionMode::Differential)
        .unwrap();
    let events: serde_json::Value = serde_json::from_str(&text).unwrap();
    let actions: Vec<_> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(actions, vec!["added", "removed"]);

    f.executor.push_rows(vec![proc_row("2", "b")]);
    let unchanged = f
        .engine
        .query("procs", PROCS_SQL, ExecutionMode::Differential)
        .unwrap();
    assert_eq!(unchanged, "[]");
}

#[test]
fn test_decorations_and_epoch_are_carried() {
    let mut decorations = BTreeMap::new();
    decorations.insert("datacenter".to_string(), "eu-west".to_string());
    let f = fixture(Config {
        epoch: 4,
        decorations,
        ..Config::default()
    });
    f.executor.push_rows(vec![proc_row("1", "a")]);

    let text = f
        .engine
        .query("procs", PROCS_SQL, ExecutionMode::Differential)
        .unwrap();
    let item = parse_log_item(&text).unwrap();
    assert_eq!(item.epoch, 4);
    assert_eq!(
        item.decorations.get("datacenter").map(String::as_str),
        Some("eu-west")
    );
}

#[test]
fn test_epoch_change_resets_counter_and_baseline() {
    let executor = Arc::new(ScriptedExecutor::default());
    let store = Arc::new(CountingStore::default());
    let host = Arc::new(FixedHostIdentity::new("host-1"));
    let rows = vec![proc_row("1", "a")];

    let epoch0 = Engine::from_parts(Config::default(), executor.clone(), store.clone(), host.clone());
    for _ in 0..3 {
        executor.push_rows(rows.clone());
        epoch0
            .query("procs", PROCS_SQL, ExecutionMode::Differential)
            .unwrap();
    }

    let epoch1 = Engine::from_parts(
        Config {
            epoch: 1,
            ..Config::default()
        },
        executor.clone(),
        store.clone(),
        host,
    );
    executor.push_rows(rows.clone());
    let text = epoch1
        .query("procs", PROCS_SQL, ExecutionMode::Differential)
        .unwrap();
    let item = parse_log_item(&text).unwrap();
    assert_eq!(item.epoch, 1);
    assert_eq!(item.counter, 0);
    assert_eq!(item.diff_results.added, vec![tagged(&rows[0])]);
}

#[test]
fn test_names_are_isolated() {
    let f = fixture(Config::default());
    f.executor.push_rows(vec![proc_row("1", "a")]);
    f.engine
        .query("procs", PROCS_SQL, ExecutionMode::Differential)
        .unwrap();

    f.executor.push_rows(vec![proc_row("1", "a")]);
    let text = f
        .engine
        .query("procs_copy", PROCS_SQL, ExecutionMode::Differential)
        .unwrap();
    let item = parse_log_item(&text).unwrap();
    assert_eq!(item.counter, 0);
    assert_eq!(item.diff_results.added.len(), 1);
}
