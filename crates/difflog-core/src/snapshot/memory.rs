//! In-memory snapshot store.
//!
//! Snapshots live only as long as the store value. Useful for embedding the
//! engine without a database and as the default store in tests.

use crate::errors::Result;
use crate::snapshot::store::{Snapshot, SnapshotStore};
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: DashMap<String, Snapshot>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of query names with a stored snapshot.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Drop the snapshot for a name, as an external eviction would.
    pub fn evict(&self, query_name: &str) -> Result<Option<Snapshot>> {
        Ok(self.snapshots.remove(query_name).map(|(_, snapshot)| snapshot))
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, query_name: &str) -> Result<Option<Snapshot>> {
        Ok(self
            .snapshots
            .get(query_name)
            .map(|entry| entry.value().clone()))
    }

    fn store(&self, query_name: &str, snapshot: &Snapshot) -> Result<()> {
        self.snapshots
            .insert(query_name.to_string(), snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;

    #[test]
    fn test_load_missing_is_none() {
        let store = MemorySnapshotStore::new();
        assert!(store.load("procs").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_then_load() {
        let store = MemorySnapshotStore::new();
        let snapshot = Snapshot::new(vec![Row::new().with("pid", "1")], 4, 0);
        store.store("procs", &snapshot).unwrap();
        assert_eq!(store.load("procs").unwrap(), Some(snapshot));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_evict() {
        let store = MemorySnapshotStore::new();
        store.store("procs", &Snapshot::default()).unwrap();
        assert!(store.evict("procs").unwrap().is_some());
        assert!(store.load("procs").unwrap().is_none());
    }
}
