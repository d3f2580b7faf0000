//! Row identity digests.
//!
//! A row's identity is the hex-encoded SHA256 of its column values
//! concatenated in lexicographic column-name order. The reserved
//! [`HASH_COLUMN`] never contributes, so re-hashing a tagged row yields the
//! same digest.
//!
//! ## Determinism Guarantees
//!
//! - Same column/value pairs → same digest, across runs and platforms
//! - Column insertion order has no effect
//! - Values are concatenated without separators: `{a:"x", b:"yz"}` and
//!   `{a:"xy", b:"z"}` share an identity. Diffing compares full row
//!   content, so this only affects the tag, never the added/removed sets.

use crate::errors::Result;
use crate::model::{Row, HASH_COLUMN};
use sha2::{Digest, Sha256};

/// Compute the identity digest of a row.
///
/// ## Returns
///
/// Hex-encoded SHA256 digest (64 characters)
///
/// ## Example
///
/// ```
/// use difflog_core::model::Row;
/// use difflog_core::snapshot::digest::row_identity;
///
/// let row = Row::new().with("pid", "1").with("name", "a");
/// let digest = row_identity(&row);
/// assert_eq!(digest.len(), 64);
/// ```
pub fn row_identity(row: &Row) -> String {
    let mut hasher = Sha256::new();
    for (column, value) in row.iter() {
        if column == HASH_COLUMN {
            continue;
        }
        hasher.update(value.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Write the row's identity into its reserved hash column.
///
/// Any value already present in the hash column is replaced and does not
/// influence the digest.
pub fn tag_row(row: &mut Row) {
    let identity = row_identity(row);
    row.insert(HASH_COLUMN, identity);
}

/// Tag every row in place.
pub fn tag_all(rows: &mut [Row]) {
    for row in rows.iter_mut() {
        tag_row(row);
    }
}

/// Compute the digest of a whole row set.
///
/// Order-sensitive: used by stores to verify that persisted rows come back
/// exactly as written.
///
/// ## Errors
///
/// Returns `ExErrorKind::Serialization` if JSON serialization fails.
pub fn compute_rows_digest(rows: &[Row]) -> Result<String> {
    let canonical = serde_json::to_string(rows)?;
    Ok(hash_string(&canonical))
}

/// Hash a string using SHA256.
fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
