//! difflog Engine - Orchestration layer
//!
//! Wires query execution, snapshot persistence and record rendering into
//! one `Engine` handle:
//! - `config`: TOML configuration with environment overrides
//! - `executor`: the `QueryExecutor` seam and its SQLite implementation
//! - `host`: host identity providers
//! - `locks`: per-query-name exclusive sections
//! - `commands`: the differential and snapshot pipelines

pub mod commands;
pub mod config;
pub mod engine;
pub mod executor;
pub mod host;
pub mod locks;

pub use config::{Config, ConfigError};
pub use engine::{Engine, QueryOutput};
pub use executor::{QueryExecutor, SqliteQueryExecutor};
pub use host::{FixedHostIdentity, HostIdentity, SystemHostIdentity};
pub use locks::KeyedLocks;
