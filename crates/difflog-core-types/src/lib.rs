//! Core types shared across difflog facilities
//!
//! This crate provides foundational types used by the error facility,
//! the logging facility and the engine:
//!
//! - **Correlation types**: RequestId, one per query invocation
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;
