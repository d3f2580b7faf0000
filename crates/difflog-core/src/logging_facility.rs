//! Structured logging facility for difflog
//!
//! This module provides a canonical logging facility with:
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! Row values never reach the log stream; events carry query names,
//! counters and collection sizes only.
//!
//! # Usage
//!
//! ```rust
//! use difflog_core::logging_facility::{init, Profile};
//!
//! // Initialize once at startup
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
