//! Query pipelines.
//!
//! Each pipeline takes its collaborators explicitly through
//! [`QueryContext`], so it can run against any executor and store.

pub mod differential;
pub mod snapshot;

pub use differential::run_differential;
pub use snapshot::run_snapshot;

use crate::executor::QueryExecutor;
use crate::locks::KeyedLocks;
use difflog_core::log_item::LogItemBuilder;
use difflog_core::model::LogFormat;
use difflog_core::snapshot::SnapshotStore;

/// Collaborators and settings shared by both pipelines for one call.
pub struct QueryContext<'a> {
    pub executor: &'a dyn QueryExecutor,
    pub store: &'a dyn SnapshotStore,
    pub locks: &'a KeyedLocks,
    pub builder: LogItemBuilder,
    pub epoch: u64,
    pub format: LogFormat,
}
