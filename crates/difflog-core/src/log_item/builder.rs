//! Log record assembly.

use crate::diff::model::DiffResult;
use crate::log_item::LogItem;
use crate::model::ResultSet;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// `strftime` pattern for `calendarTime`, e.g. `Sun Oct 18 12:00:00 2026 UTC`.
pub const CALENDAR_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y UTC";

/// Render a timestamp in the `calendarTime` format.
pub fn format_calendar_time(at: &DateTime<Utc>) -> String {
    at.format(CALENDAR_TIME_FORMAT).to_string()
}

/// Assembles [`LogItem`]s for one host.
///
/// ```
/// use difflog_core::diff::DiffResult;
/// use difflog_core::log_item::LogItemBuilder;
///
/// let item = LogItemBuilder::new("host-1").build("procs", DiffResult::default(), 0, 0);
/// assert_eq!(item.host_identifier, "host-1");
/// assert!(!item.snapshot);
/// assert!(item.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct LogItemBuilder {
    host_identifier: String,
    decorations: BTreeMap<String, String>,
}

impl LogItemBuilder {
    pub fn new(host_identifier: impl Into<String>) -> Self {
        Self {
            host_identifier: host_identifier.into(),
            decorations: BTreeMap::new(),
        }
    }

    /// Decorations attached to every record this builder produces.
    pub fn with_decorations(mut self, decorations: BTreeMap<String, String>) -> Self {
        self.decorations = decorations;
        self
    }

    pub fn host_identifier(&self) -> &str {
        &self.host_identifier
    }

    /// Build a differential record stamped with the current time.
    pub fn build(&self, query_name: &str, diff: DiffResult, counter: u64, epoch: u64) -> LogItem {
        self.build_at(query_name, diff, counter, epoch, Utc::now())
    }

    /// Build a differential record stamped with `at`.
    pub fn build_at(
        &self,
        query_name: &str,
        diff: DiffResult,
        counter: u64,
        epoch: u64,
        at: DateTime<Utc>,
    ) -> LogItem {
        self.assemble(query_name, diff, counter, epoch, false, at)
    }

    /// Build a snapshot record: every row is carried in `added` and the
    /// snapshot flag is set.
    pub fn build_snapshot(&self, query_name: &str, rows: ResultSet, epoch: u64) -> LogItem {
        let diff = DiffResult {
            added: rows,
            removed: Vec::new(),
        };
        self.assemble(query_name, diff, 0, epoch, true, Utc::now())
    }

    fn assemble(
        &self,
        query_name: &str,
        diff: DiffResult,
        counter: u64,
        epoch: u64,
        snapshot: bool,
        at: DateTime<Utc>,
    ) -> LogItem {
        LogItem {
            name: query_name.to_string(),
            host_identifier: self.host_identifier.clone(),
            calendar_time: format_calendar_time(&at),
            unix_time: at.timestamp(),
            epoch,
            counter,
            snapshot,
            decorations: self.decorations.clone(),
            diff_results: diff,
        }
    }
}
