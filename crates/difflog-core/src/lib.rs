//! difflog core - differential result logging
//!
//! This crate turns one-shot tabular query results into a content-hashed
//! change stream:
//! - Row model and per-call execution mode
//! - Deterministic row identity digests
//! - Added/removed diffing against a persisted snapshot, with counter and
//!   epoch bookkeeping
//! - Log record assembly and stable JSON serialization
//! - The `SnapshotStore` capability and an in-memory implementation
//! - Error and logging facilities shared by the other crates

pub mod diff;
pub mod errors;
pub mod log_item;
pub mod logging_facility;
pub mod model;
pub mod serialize;
pub mod snapshot;

// Re-export commonly used types
pub use diff::{compute_diff, DiffEngine, DiffResult};
pub use errors::{ExError, ExErrorKind, Result};
pub use log_item::{LogItem, LogItemBuilder};
pub use model::{ExecutionMode, LogFormat, ResultSet, Row, HASH_COLUMN};
pub use snapshot::{MemorySnapshotStore, Snapshot, SnapshotStore};
