//! Data model for tabular query results.

pub mod mode;
pub mod row;

pub use mode::{ExecutionMode, LogFormat};
pub use row::{ResultSet, Row, HASH_COLUMN};
