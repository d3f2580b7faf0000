//! Event-format encoding: one object per changed row.

use crate::errors::{ExError, ExErrorKind, Result};
use crate::log_item::LogItem;
use crate::model::Row;
use serde::Serialize;
use std::collections::BTreeMap;

pub const EVENT_ACTION_ADDED: &str = "added";
pub const EVENT_ACTION_REMOVED: &str = "removed";
pub const EVENT_ACTION_SNAPSHOT: &str = "snapshot";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventRecord<'a> {
    name: &'a str,
    host_identifier: &'a str,
    calendar_time: &'a str,
    unix_time: i64,
    epoch: u64,
    counter: u64,
    decorations: &'a BTreeMap<String, String>,
    columns: &'a Row,
    action: &'static str,
}

/// Serialize a record as one JSON object per changed row.
///
/// Added rows come first, then removed rows, each in record order. Rows of
/// a snapshot record carry the action `snapshot`.
///
/// # Errors
///
/// `ExErrorKind::Serialization` if encoding fails.
pub fn serialize_log_item_events(item: &LogItem) -> Result<Vec<String>> {
    let added_action = if item.snapshot {
        EVENT_ACTION_SNAPSHOT
    } else {
        EVENT_ACTION_ADDED
    };

    let added = item.diff_results.added.iter().map(|row| (row, added_action));
    let removed = item
        .diff_results
        .removed
        .iter()
        .map(|row| (row, EVENT_ACTION_REMOVED));

    added
        .chain(removed)
        .map(|(row, action)| {
            let record = EventRecord {
                name: &item.name,
                host_identifier: &item.host_identifier,
                calendar_time: &item.calendar_time,
                unix_time: item.unix_time,
                epoch: item.epoch,
                counter: item.counter,
                decorations: &item.decorations,
                columns: row,
                action,
            };
            serde_json::to_string(&record).map_err(|e| {
                ExError::new(ExErrorKind::Serialization)
                    .with_op("serialize_log_item_events")
                    .with_message(e.to_string())
            })
        })
        .collect()
}
