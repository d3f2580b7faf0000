//! Per-call execution mode and output format selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a query's result is turned into output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Diff against the persisted snapshot for the query name and emit a
    /// log record of added/removed rows.
    Differential,
    /// Stateless: hash every row and emit the flat row set. The snapshot
    /// store is never touched.
    Snapshot,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Differential => "differential",
            ExecutionMode::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "differential" | "diff" => Ok(ExecutionMode::Differential),
            "snapshot" => Ok(ExecutionMode::Snapshot),
            other => Err(format!("unknown execution mode '{}'", other)),
        }
    }
}

/// Shape of a serialized differential record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per execution with a `diffResults` payload.
    #[default]
    Batch,
    /// A JSON array with one object per changed row, each with an `action`
    /// of `added` or `removed`.
    Event,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batch" => Ok(LogFormat::Batch),
            "event" => Ok(LogFormat::Event),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}
