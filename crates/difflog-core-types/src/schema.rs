//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent between the logging macros,
//! the engine and tests that assert on captured events.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Query identity
pub const FIELD_QUERY_NAME: &str = "query_name";
pub const FIELD_MODE: &str = "mode";

// Differential bookkeeping
pub const FIELD_COUNTER: &str = "counter";
pub const FIELD_EPOCH: &str = "epoch";
pub const FIELD_NEW_EPOCH: &str = "new_epoch";

// Collection sizes
pub const FIELD_ROWS_LEN: &str = "rows_len";
pub const FIELD_ADDED_LEN: &str = "added_len";
pub const FIELD_REMOVED_LEN: &str = "removed_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";
pub const FIELD_STATUS: &str = "status";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
