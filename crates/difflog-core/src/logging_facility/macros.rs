//! Operation lifecycle macros.
//!
//! Each operation logs one `start` event and exactly one of `end` or
//! `end_error`, all tagged with `component` (the calling module) and `op`.
//! Extra `key = value` fields are passed straight to `tracing`.

#[doc(hidden)]
pub use difflog_core_types::schema as __schema;

/// Shared emitter behind the public macros.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:ident, $($field:tt)*) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::macros::__schema::$event,
            $($field)*
        )
    };
}

/// Log the start of `op`.
///
/// ```
/// # use difflog_core::log_op_start;
/// log_op_start!("query_json");
/// log_op_start!("query_json", query_name = "procs");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        $crate::__log_op_event!(info, $op, EVENT_START,)
    };
    ($op:expr, $($field:tt)*) => {
        $crate::__log_op_event!(info, $op, EVENT_START, $($field)*)
    };
}

/// Log the successful end of `op`. `duration_ms` is required.
///
/// ```
/// # use difflog_core::log_op_end;
/// log_op_end!("query_json", duration_ms = 42, output_len = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        $crate::__log_op_event!(info, $op, EVENT_END, duration_ms = $duration,)
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        $crate::__log_op_event!(info, $op, EVENT_END, duration_ms = $duration, $($field)*)
    };
}

/// Log the failed end of `op`.
///
/// `$err` is anything convertible into `ExError`. The event carries its
/// kind, stable code, caller-visible status and, when the SQL engine
/// reported one, `engine_status` (0 otherwise).
///
/// ```
/// # use difflog_core::log_op_error;
/// use difflog_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::QueryFailed).with_engine_status(19);
/// log_op_error!("query_json", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error,
            $op,
            EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            status = ex_err.status(),
            engine_status = ex_err.engine_status().unwrap_or(0),
            $($($field)*)?
        )
    }};
}
