//! Snapshot persistence.
//!
//! `SqliteSnapshotStore` keeps one header row per query name plus its rows
//! in execution order, replaced atomically on every store.

pub mod persist;

pub use persist::SqliteSnapshotStore;
