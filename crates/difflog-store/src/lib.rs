//! difflog Store - SQLite persistence for query snapshots
//!
//! Provides:
//! - SQLite connection management
//! - Embedded, checksummed schema migrations
//! - `SqliteSnapshotStore`, a durable `SnapshotStore`

pub mod db;
pub mod errors;
pub mod migrations;
pub mod snapshot;

// Re-export key types
pub use errors::Result;
pub use snapshot::SqliteSnapshotStore;
