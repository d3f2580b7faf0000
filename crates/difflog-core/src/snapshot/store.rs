//! The snapshot persistence capability.

use crate::errors::Result;
use crate::model::ResultSet;
use serde::{Deserialize, Serialize};

/// The most recent result set recorded for a query name, with the counter
/// and epoch it was recorded under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Rows as produced by the executor, without the hash column
    pub rows: ResultSet,
    pub counter: u64,
    pub epoch: u64,
}

impl Snapshot {
    pub fn new(rows: ResultSet, counter: u64, epoch: u64) -> Self {
        Self {
            rows,
            counter,
            epoch,
        }
    }
}

/// Key-value persistence for per-query snapshots.
///
/// Implementations must make `store` all-or-nothing: rows, counter and
/// epoch are replaced together or not at all. Writes for one name are
/// serialized by the implementation; callers additionally hold a per-name
/// exclusive section around each load/store pair.
pub trait SnapshotStore: Send + Sync {
    /// Load the snapshot for `query_name`. `Ok(None)` means no snapshot has
    /// ever been stored under that name.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Persistence` when the backend fails or the stored
    /// snapshot cannot be decoded.
    fn load(&self, query_name: &str) -> Result<Option<Snapshot>>;

    /// Replace the snapshot for `query_name`.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Persistence` when the write fails; the previous
    /// snapshot is then left untouched.
    fn store(&self, query_name: &str, snapshot: &Snapshot) -> Result<()>;

    /// Flush buffered state to durable storage. Called on shutdown.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Persistence` when the backend cannot flush.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
