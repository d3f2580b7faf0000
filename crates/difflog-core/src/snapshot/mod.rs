//! Row identity and snapshot persistence contract.
//!
//! ## Responsibilities
//!
//! - Compute deterministic row identity digests (RowHasher)
//! - Define the `SnapshotStore` capability consumed by the diff engine
//! - Provide an in-memory store for embedding and tests
//!
//! ## Non-Responsibilities
//!
//! - Durable persistence (handled by `difflog-store`)
//! - Orchestration and locking (handled by `difflog-engine`)

pub mod digest;
pub mod memory;
pub mod store;

pub use digest::{compute_rows_digest, row_identity, tag_all, tag_row};
pub use memory::MemorySnapshotStore;
pub use store::{Snapshot, SnapshotStore};
