//! Diff output types.

use crate::model::ResultSet;
use serde::{Deserialize, Serialize};

/// Net change between two executions of one query.
///
/// Both collections are always present (possibly empty) so downstream
/// consumers can process records uniformly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Rows in the current execution but not the previous one, in current
    /// execution order
    pub added: ResultSet,
    /// Rows in the previous execution but not the current one, in previous
    /// execution order
    pub removed: ResultSet,
}

impl DiffResult {
    /// True when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Attach identity digests to every added and removed row.
    pub fn tag_rows(&mut self) {
        crate::snapshot::digest::tag_all(&mut self.added);
        crate::snapshot::digest::tag_all(&mut self.removed);
    }
}
