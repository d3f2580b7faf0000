//! C ABI for the difflog engine.
//!
//! One engine instance per process, created by `difflog_initialise` and
//! released by `difflog_shutdown`. Strings returned by
//! `difflog_query_json` are owned by this library and must be handed back
//! to `difflog_free_query_result`. No panic crosses the boundary.
//!
//! See `include/difflog.h` for the C declarations.

use difflog_core::errors::{ExError, ExErrorKind, Result};
use difflog_core::model::ExecutionMode;
use difflog_core::{log_op_end, log_op_error, log_op_start};
use difflog_engine::{Config, Engine};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_uint};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// ABI version for callers to check against their header.
pub const API_VERSION: c_uint = 1;

pub const MODE_DIFFERENTIAL: c_int = 0;
pub const MODE_SNAPSHOT: c_int = 1;

static ENGINE: Mutex<Option<Arc<Engine>>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<Arc<Engine>>> {
    // The slot only holds an Arc; a panic while it was held cannot leave it
    // half-written.
    ENGINE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// ABI version of this library.
#[no_mangle]
pub extern "C" fn difflog_api_version() -> c_uint {
    API_VERSION
}

/// Create the process-wide engine.
///
/// Returns 0 on success, or when an engine already exists. Otherwise
/// returns the failure's status.
///
/// # Safety
///
/// `config_path` must be null or point to a NUL-terminated string valid for
/// the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn difflog_initialise(config_path: *const c_char) -> c_int {
    let path = if config_path.is_null() {
        None
    } else {
        match unsafe { CStr::from_ptr(config_path) }.to_str() {
            Ok(s) => Some(PathBuf::from(s)),
            Err(_) => return ExErrorKind::InvalidInput.status(),
        }
    };

    guarded(|| initialise(path)).map_or_else(|e| e.status(), |()| 0)
}

fn initialise(path: Option<PathBuf>) -> Result<()> {
    let mut slot = slot();
    if slot.is_some() {
        return Ok(());
    }
    let config = Config::load(path.as_deref())?;
    *slot = Some(Arc::new(Engine::initialize(config)?));
    Ok(())
}

/// Run a query on the process-wide engine.
///
/// `mode` is `0` for differential, `1` for snapshot. Returns a JSON string
/// on success, or null on failure. `*error_code` receives 0 on success and
/// a nonzero status on failure whenever `error_code` is non-null.
///
/// # Safety
///
/// `name` and `sql` must be null or point to NUL-terminated strings valid
/// for the duration of the call. `error_code` must be null or point to
/// writable memory for one `int`.
#[no_mangle]
pub unsafe extern "C" fn difflog_query_json(
    name: *const c_char,
    sql: *const c_char,
    mode: c_int,
    error_code: *mut c_int,
) -> *mut c_char {
    let result = guarded(|| {
        let name = unsafe { read_arg(name, "name") }?;
        let sql = unsafe { read_arg(sql, "sql") }?;
        let mode = execution_mode(mode)?;
        let engine = slot().clone().ok_or_else(not_initialized)?;
        let text = engine.query(name, sql, mode)?;
        CString::new(text).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("query_json")
                .with_message(e.to_string())
        })
    });

    let (ptr, status) = match result {
        Ok(text) => (text.into_raw(), 0),
        Err(e) => (std::ptr::null_mut(), e.status()),
    };
    if !error_code.is_null() {
        unsafe { *error_code = status };
    }
    ptr
}

/// Release a string returned by `difflog_query_json`. Null is ignored.
///
/// # Safety
///
/// `result` must be null or a pointer returned by `difflog_query_json` that
/// has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn difflog_free_query_result(result: *mut c_char) {
    if result.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(result) });
}

/// Flush and release the process-wide engine. A no-op when none exists.
#[no_mangle]
pub extern "C" fn difflog_shutdown() {
    // Nothing to report to the caller; failures are logged.
    let _ = guarded(shutdown);
}

fn shutdown() -> Result<()> {
    let Some(engine) = slot().take() else {
        return Ok(());
    };

    let start = Instant::now();
    log_op_start!("ffi_shutdown");
    // In-flight queries may still hold the engine; flush now and let the
    // last holder drop it.
    let result = match Arc::try_unwrap(engine) {
        Ok(engine) => engine.shutdown(),
        Err(shared) => shared.store().flush(),
    };
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(()) => {
            log_op_end!("ffi_shutdown", duration_ms = duration_ms);
        }
        Err(e) => {
            log_op_error!("ffi_shutdown", e.clone(), duration_ms = duration_ms);
        }
    }
    result
}

fn guarded<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        Err(ExError::new(ExErrorKind::Internal).with_message("panic at the C boundary"))
    })
}

/// # Safety
///
/// `ptr` must be null or a NUL-terminated string outliving `'a`.
unsafe fn read_arg<'a>(ptr: *const c_char, arg: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(invalid_arg(arg, "is null"));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| invalid_arg(arg, "is not valid UTF-8"))
}

fn execution_mode(mode: c_int) -> Result<ExecutionMode> {
    match mode {
        MODE_DIFFERENTIAL => Ok(ExecutionMode::Differential),
        MODE_SNAPSHOT => Ok(ExecutionMode::Snapshot),
        other => Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("query_json")
            .with_message(format!("unknown mode {}", other))),
    }
}

fn invalid_arg(arg: &str, problem: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("query_json")
        .with_message(format!("{} {}", arg, problem))
}

fn not_initialized() -> ExError {
    ExError::new(ExErrorKind::NotInitialized)
        .with_op("query_json")
        .with_message("difflog_initialise has not been called")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_mode_mapping() {
        assert_eq!(execution_mode(0).unwrap(), ExecutionMode::Differential);
        assert_eq!(execution_mode(1).unwrap(), ExecutionMode::Snapshot);
        assert_eq!(
            execution_mode(7).unwrap_err().kind(),
            ExErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_guarded_converts_panic() {
        let err = guarded::<(), _>(|| panic!("boom")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Internal);
    }

    #[test]
    fn test_read_arg_rejects_null_and_bad_utf8() {
        let err = unsafe { read_arg(std::ptr::null(), "sql") }.unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);

        let bad = CString::new(vec![0xffu8, 0xfe]).unwrap();
        let err = unsafe { read_arg(bad.as_ptr(), "name") }.unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_api_version() {
        assert_eq!(difflog_api_version(), API_VERSION);
    }
}
