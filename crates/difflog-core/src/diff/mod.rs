//! Differential result engine.
//!
//! Compares the rows of the current execution with the snapshot recorded
//! for the same query name and reports the net change.
//!
//! ## Entry points
//!
//! ```ignore
//! use difflog_core::diff::{compute_diff, DiffEngine};
//!
//! let diff = compute_diff(&current, &previous);
//! let pending = DiffEngine::new(&store, epoch).prepare("procs", current)?;
//! ```
//!
//! ## Guarantees
//!
//! - **Order independence**: reordered but otherwise unchanged rows are
//!   never reported.
//! - **Disjointness**: no row is reported as both added and removed.
//! - **Multiplicity**: duplicate rows are counted, so `diff(A, ∅) = (A, ∅)`
//!   holds even when `A` repeats a row.

pub mod engine;
pub mod model;

pub use engine::{baseline, compute_diff, DiffEngine, PendingDiff, NEW_EPOCH_COUNTER};
pub use model::DiffResult;
