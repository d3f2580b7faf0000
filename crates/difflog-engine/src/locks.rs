//! Per-name exclusive sections.

use dashmap::DashMap;
use difflog_core::errors::Result;
use std::sync::{Arc, Mutex, PoisonError};

/// A lock per key, created on first use and dropped once no caller holds
/// or waits on it.
///
/// The shard lock is held only to look up or prune an entry, never while
/// the caller's closure runs, so different keys proceed in parallel.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    ///
    /// A panic inside an earlier section for the same key does not wedge
    /// the key: the guarded state is `()`, so poisoning is ignored.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns.
    pub fn with_lock<T, F>(&self, key: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        // Dropped last, after the guard and our clone, so it also prunes
        // when `f` unwinds.
        let _prune = PruneOnDrop { locks: self, key };
        let entry = Arc::clone(self.locks.entry(key.to_string()).or_default().value());
        let _guard = entry.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn prune(&self, key: &str) {
        // Clones are only taken under the shard lock, so a count of one
        // means nobody else holds or waits on this entry.
        self.locks.remove_if(key, |_, entry| Arc::strong_count(entry) == 1);
    }
}

struct PruneOnDrop<'a> {
    locks: &'a KeyedLocks,
    key: &'a str,
}

impl Drop for PruneOnDrop<'_> {
    fn drop(&mut self) {
        self.locks.prune(self.key);
    }
}
