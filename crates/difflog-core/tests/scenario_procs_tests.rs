// Scenario tests: three successive executions of the "procs" query
// against an in-memory snapshot store

use difflog_core::diff::{DiffEngine, NEW_EPOCH_COUNTER};
use difflog_core::log_item::LogItemBuilder;
use difflog_core::model::Row;
use difflog_core::serialize::{parse_log_item, serialize_log_item};
use difflog_core::snapshot::digest::row_identity;
use difflog_core::snapshot::{MemorySnapshotStore, SnapshotStore};
use difflog_core::LogItem;

fn run(store: &dyn SnapshotStore, rows: Vec<Row>) -> LogItem {
    let engine = DiffEngine::new(store, 0);
    let pending = engine.prepare("procs", rows).unwrap();
    let item = LogItemBuilder::new("host-1").build("procs", pending.diff, pending.counter, pending.epoch);
    let text = serialize_log_item(&item).unwrap();
    engine.commit("procs", &pending.next).unwrap();
    parse_log_item(&text).unwrap()
}

#[test]
fn test_procs_three_executions() {
    let store = MemorySnapshotStore::new();
    let r1 = Row::new().with("pid", "1").with("name", "a");
    let r2 = Row::new().with("pid", "2").with("name", "b");
    let h1 = row_identity(&r1);
    let h2 = row_identity(&r2);

    // First execution: everything added, new-epoch counter
    let first = run(&store, vec![r1.clone()]);
    assert_eq!(first.counter, NEW_EPOCH_COUNTER);
    assert_eq!(first.diff_results.added, vec![r1.clone().with("Hash", h1.clone())]);
    assert!(first.diff_results.removed.is_empty());

    // Second execution, identical rows: empty diff, counter advanced
    let second = run(&store, vec![r1.clone()]);
    assert!(second.is_empty());
    assert_eq!(second.counter, first.counter + 1);

    // Third execution: replacement
    let third = run(&store, vec![r2.clone()]);
    assert_eq!(third.diff_results.added, vec![r2.with("Hash", h2)]);
    assert_eq!(third.diff_results.removed, vec![r1.with("Hash", h1)]);
    assert_eq!(third.counter, second.counter + 1);
}

#[test]
fn test_counter_strictly_increases_until_eviction() {
    let store = MemorySnapshotStore::new();
    let rows = vec![Row::new().with("pid", "1")];

    let mut last = None;
    for _ in 0..5 {
        let item = run(&store, rows.clone());
        if let Some(prev) = last {
            assert!(item.counter > prev);
        }
        last = Some(item.counter);
    }

    store.evict("procs").unwrap();
    let after = run(&store, rows);
    assert_eq!(after.counter, NEW_EPOCH_COUNTER);
    assert_eq!(after.diff_results.added.len(), 1);
}
