//! JSON rendering of log records and row sets.
//!
//! All output is compact JSON with a fixed field order, so identical input
//! always renders to byte-identical text.

pub mod events;
pub mod json;

pub use events::{
    serialize_log_item_events, EVENT_ACTION_ADDED, EVENT_ACTION_REMOVED, EVENT_ACTION_SNAPSHOT,
};
pub use json::{parse_log_item, parse_rows, serialize_log_item, serialize_rows};

use crate::errors::Result;
use crate::log_item::LogItem;
use crate::model::LogFormat;

/// Render a record in the requested format.
///
/// `Event` output is a JSON array holding one object per changed row; a
/// record with no changed rows renders as `[]`, never as empty text.
///
/// # Errors
///
/// `ExErrorKind::Serialization` if encoding fails.
pub fn render_log_item(item: &LogItem, format: LogFormat) -> Result<String> {
    match format {
        LogFormat::Batch => serialize_log_item(item),
        LogFormat::Event => Ok(format!("[{}]", serialize_log_item_events(item)?.join(","))),
    }
}
