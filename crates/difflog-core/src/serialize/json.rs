//! Batch record and flat row-set encoding.

use crate::errors::{ExError, ExErrorKind, Result};
use crate::log_item::LogItem;
use crate::model::Row;

/// Serialize a differential record.
///
/// Fields appear in the order `name, hostIdentifier, calendarTime, unixTime,
/// epoch, counter, snapshot, decorations, diffResults`; columns within a
/// row appear in lexicographic order.
///
/// # Errors
///
/// `ExErrorKind::Serialization` if encoding fails.
pub fn serialize_log_item(item: &LogItem) -> Result<String> {
    serde_json::to_string(item).map_err(|e| serialization_error("serialize_log_item", e))
}

/// Parse a record produced by [`serialize_log_item`].
///
/// # Errors
///
/// `ExErrorKind::Serialization` if the text is not a valid record.
pub fn parse_log_item(text: &str) -> Result<LogItem> {
    serde_json::from_str(text).map_err(|e| serialization_error("parse_log_item", e))
}

/// Serialize a flat row set as a JSON array of row objects.
///
/// # Errors
///
/// `ExErrorKind::Serialization` if encoding fails.
pub fn serialize_rows(rows: &[Row]) -> Result<String> {
    serde_json::to_string(rows).map_err(|e| serialization_error("serialize_rows", e))
}

/// Parse a row set produced by [`serialize_rows`].
///
/// # Errors
///
/// `ExErrorKind::Serialization` if the text is not an array of string maps.
pub fn parse_rows(text: &str) -> Result<Vec<Row>> {
    serde_json::from_str(text).map_err(|e| serialization_error("parse_rows", e))
}

fn serialization_error(op: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(op.to_string())
        .with_message(err.to_string())
}
