//! Result rows.
//!
//! A [`Row`] maps column names to string values. Columns are kept in an
//! ordered map, so iteration and serialization are lexicographic by column
//! name regardless of the order the executor produced them in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserved column that carries a row's identity digest in emitted records.
pub const HASH_COLUMN: &str = "Hash";

/// One result row: column name → column value.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, String>);

/// Rows of one query execution, in execution order.
pub type ResultSet = Vec<Row>;

impl Row {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set a column value, returning the previous value if the column existed.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(column.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn remove(&mut self, column: &str) -> Option<String> {
        self.0.remove(column)
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// The identity digest attached to this row, if it has been tagged.
    pub fn identity(&self) -> Option<&str> {
        self.get(HASH_COLUMN)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column/value pairs in lexicographic column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Column names in lexicographic order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// A copy of this row with the reserved hash column removed.
    pub fn without_hash(&self) -> Row {
        let mut row = self.clone();
        row.remove(HASH_COLUMN);
        row
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<BTreeMap<String, String>> for Row {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}
