//! Diff computation and snapshot bookkeeping.

use crate::diff::model::DiffResult;
use crate::errors::Result;
use crate::model::{ResultSet, Row, HASH_COLUMN};
use crate::snapshot::store::{Snapshot, SnapshotStore};
use std::collections::BTreeMap;

/// Counter value of the first execution in an epoch.
pub const NEW_EPOCH_COUNTER: u64 = 0;

/// Compute the net change from `previous` to `current`.
///
/// Rows compare by full content. Duplicates are matched one-for-one, so a
/// row appearing twice now and once before is reported as added once.
pub fn compute_diff(current: &[Row], previous: &[Row]) -> DiffResult {
    DiffResult {
        added: multiset_delta(current, previous),
        removed: multiset_delta(previous, current),
    }
}

/// Rows of `a` left over after cancelling each against one equal row of `b`,
/// in `a`'s order.
fn multiset_delta(a: &[Row], b: &[Row]) -> ResultSet {
    let mut remaining: BTreeMap<&Row, usize> = BTreeMap::new();
    for row in b {
        *remaining.entry(row).or_insert(0) += 1;
    }

    let mut delta = Vec::new();
    for row in a {
        match remaining.get_mut(row) {
            Some(count) if *count > 0 => *count -= 1,
            _ => delta.push(row.clone()),
        }
    }
    delta
}

/// Resolve the diff baseline and counter for an execution.
///
/// A snapshot recorded under the current epoch continues the sequence. A
/// missing snapshot, or one recorded under a different epoch, starts a new
/// epoch: the baseline is empty and the counter resets to
/// [`NEW_EPOCH_COUNTER`].
///
/// Returns `(baseline rows, counter, new_epoch)`.
pub fn baseline(previous: Option<Snapshot>, epoch: u64) -> (ResultSet, u64, bool) {
    match previous {
        Some(snapshot) if snapshot.epoch == epoch => {
            (snapshot.rows, snapshot.counter.saturating_add(1), false)
        }
        _ => (Vec::new(), NEW_EPOCH_COUNTER, true),
    }
}

/// A computed diff whose snapshot has not been committed yet.
#[derive(Debug, Clone)]
pub struct PendingDiff {
    /// Added/removed rows, tagged with identity digests
    pub diff: DiffResult,
    pub counter: u64,
    pub epoch: u64,
    /// True when this execution started a new epoch
    pub new_epoch: bool,
    /// Snapshot to persist once the record has been produced
    pub next: Snapshot,
}

/// Runs diffs for named queries against a snapshot store.
///
/// The engine does not lock. Callers must hold a per-name exclusive section
/// from [`DiffEngine::prepare`] through [`DiffEngine::commit`].
pub struct DiffEngine<'a> {
    store: &'a dyn SnapshotStore,
    epoch: u64,
}

impl<'a> DiffEngine<'a> {
    pub fn new(store: &'a dyn SnapshotStore, epoch: u64) -> Self {
        Self { store, epoch }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Load the previous snapshot for `query_name` and diff `current` against it.
    ///
    /// A source column named [`HASH_COLUMN`] is dropped from `current` before
    /// comparing, so it never takes part in equality or storage. Nothing is
    /// written. The returned [`PendingDiff`] holds the snapshot
    /// to commit after the record has been serialized.
    ///
    /// # Errors
    ///
    /// Propagates `ExErrorKind::Persistence` from the store's `load`.
    pub fn prepare(&self, query_name: &str, current: ResultSet) -> Result<PendingDiff> {
        let previous = self
            .store
            .load(query_name)
            .map_err(|e| e.with_query_name(query_name))?;
        let (baseline_rows, counter, new_epoch) = baseline(previous, self.epoch);

        let current: ResultSet = current
            .into_iter()
            .map(|mut row| {
                row.remove(HASH_COLUMN);
                row
            })
            .collect();
        let mut diff = compute_diff(&current, &baseline_rows);
        diff.tag_rows();

        tracing::debug!(
            query_name = query_name,
            counter = counter,
            epoch = self.epoch,
            new_epoch = new_epoch,
            added_len = diff.added.len(),
            removed_len = diff.removed.len(),
            "Computed differential results"
        );

        Ok(PendingDiff {
            diff,
            counter,
            epoch: self.epoch,
            new_epoch,
            next: Snapshot::new(current, counter, self.epoch),
        })
    }

    /// Persist the snapshot produced by [`DiffEngine::prepare`].
    ///
    /// # Errors
    ///
    /// Propagates `ExErrorKind::Persistence` from the store's `store`.
    pub fn commit(&self, query_name: &str, next: &Snapshot) -> Result<()> {
        self.store
            .store(query_name, next)
            .map_err(|e| e.with_query_name(query_name))?;
        tracing::debug!(
            query_name = query_name,
            counter = next.counter,
            rows_len = next.rows.len(),
            "Committed snapshot"
        );
        Ok(())
    }
}
