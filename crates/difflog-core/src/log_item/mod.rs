//! Versioned differential log records.
//!
//! A [`LogItem`] is built once per execution by [`LogItemBuilder`] and
//! handed to the serializer. It is not retained after the call that
//! produced it.

pub mod builder;

pub use builder::{format_calendar_time, LogItemBuilder, CALENDAR_TIME_FORMAT};

use crate::diff::model::DiffResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One log record for one execution of a named query.
///
/// Field order is the serialized field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogItem {
    /// Query name
    pub name: String,
    /// Host that produced the record, verbatim from the identity provider
    pub host_identifier: String,
    /// Build time, human-readable UTC
    pub calendar_time: String,
    /// Build time, unix seconds
    pub unix_time: i64,
    pub epoch: u64,
    pub counter: u64,
    /// False for differential records; true when the payload is a full
    /// snapshot carried in `added`
    pub snapshot: bool,
    /// Static key/value pairs attached to every record
    #[serde(default)]
    pub decorations: BTreeMap<String, String>,
    pub diff_results: DiffResult,
}

impl LogItem {
    /// True when the record carries no changed rows.
    ///
    /// Empty records are still valid; whether to emit them is the caller's
    /// decision.
    pub fn is_empty(&self) -> bool {
        self.diff_results.is_empty()
    }
}
