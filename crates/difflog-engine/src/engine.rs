//! The engine handle: one configured set of collaborators serving
//! concurrent query calls.

use crate::commands::{run_differential, run_snapshot, QueryContext};
use crate::config::Config;
use crate::executor::{QueryExecutor, SqliteQueryExecutor};
use crate::host::{FixedHostIdentity, HostIdentity, SystemHostIdentity};
use crate::locks::KeyedLocks;
use difflog_core::errors::{ExError, ExErrorKind, Result};
use difflog_core::log_item::LogItemBuilder;
use difflog_core::logging_facility;
use difflog_core::model::ExecutionMode;
use difflog_core::snapshot::{MemorySnapshotStore, SnapshotStore};
use difflog_core::{log_op_end, log_op_error, log_op_start};
use difflog_core_types::RequestId;
use difflog_store::SqliteSnapshotStore;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Text plus status for one call. `text` is `Some` exactly when `status`
/// is 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutput {
    pub text: Option<String>,
    pub status: i32,
}

impl QueryOutput {
    pub fn is_ok(&self) -> bool {
        self.status == 0
    }
}

impl From<Result<String>> for QueryOutput {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) => QueryOutput {
                text: Some(text),
                status: 0,
            },
            Err(e) => QueryOutput {
                text: None,
                status: e.status(),
            },
        }
    }
}

/// A differential logging engine.
///
/// `Engine` is `Send + Sync`. Calls for different query names run in
/// parallel; calls for the same name are serialized.
pub struct Engine {
    config: Config,
    executor: Arc<dyn QueryExecutor>,
    store: Arc<dyn SnapshotStore>,
    host: Arc<dyn HostIdentity>,
    locks: KeyedLocks,
}

impl Engine {
    /// Build an engine from configuration.
    ///
    /// Installs logging for the configured profile, opens (and migrates)
    /// the snapshot database when `database_path` is set, and opens the
    /// query database.
    ///
    /// # Errors
    ///
    /// - `ExErrorKind::InvalidConfig`: validation failed
    /// - `ExErrorKind::Io`: the snapshot directory cannot be created
    /// - `ExErrorKind::Persistence`: the snapshot database cannot be opened
    /// - `ExErrorKind::QueryFailed`: the query database cannot be opened
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        logging_facility::init(config.profile()?);

        let start = Instant::now();
        log_op_start!("initialize", epoch = config.epoch);

        match Self::open_collaborators(&config) {
            Ok((executor, store, host)) => {
                log_op_end!(
                    "initialize",
                    duration_ms = start.elapsed().as_millis() as u64,
                    persistent = config.database_path.is_some()
                );
                Ok(Self::from_parts(config, executor, store, host))
            }
            Err(e) => {
                log_op_error!(
                    "initialize",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(e)
            }
        }
    }

    /// Build an engine over explicit collaborators. No logging is
    /// installed and `config` is used for epoch, format and decorations.
    pub fn from_parts(
        config: Config,
        executor: Arc<dyn QueryExecutor>,
        store: Arc<dyn SnapshotStore>,
        host: Arc<dyn HostIdentity>,
    ) -> Self {
        Self {
            config,
            executor,
            store,
            host,
            locks: KeyedLocks::new(),
        }
    }

    #[allow(clippy::type_complexity)]
    fn open_collaborators(
        config: &Config,
    ) -> Result<(
        Arc<dyn QueryExecutor>,
        Arc<dyn SnapshotStore>,
        Arc<dyn HostIdentity>,
    )> {
        let store: Arc<dyn SnapshotStore> = match &config.database_path {
            Some(path) => {
                ensure_parent_dir(path)?;
                Arc::new(SqliteSnapshotStore::open(path)?)
            }
            None => Arc::new(MemorySnapshotStore::new()),
        };

        let executor: Arc<dyn QueryExecutor> = match &config.query_database {
            Some(path) => Arc::new(SqliteQueryExecutor::open(path)?),
            None => Arc::new(SqliteQueryExecutor::open_in_memory()?),
        };

        let host: Arc<dyn HostIdentity> = match &config.host_identifier {
            Some(id) => Arc::new(FixedHostIdentity::new(id.clone())),
            None => Arc::new(SystemHostIdentity::new()),
        };

        Ok((executor, store, host))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Run a query and return text plus status.
    ///
    /// Status 0 means success and `text` holds the rendered output. Any
    /// other status means failure and `text` is `None`; a failure reported
    /// by the SQL engine surfaces its own status.
    pub fn query_json(&self, query_name: &str, sql: &str, mode: ExecutionMode) -> QueryOutput {
        QueryOutput::from(self.query(query_name, sql, mode))
    }

    /// Run a query and return the rendered output.
    ///
    /// # Errors
    ///
    /// - `ExErrorKind::InvalidInput`: empty SQL, or an empty name in
    ///   differential mode
    /// - Any error from the selected pipeline
    pub fn query(&self, query_name: &str, sql: &str, mode: ExecutionMode) -> Result<String> {
        let request_id = RequestId::new();
        let start = Instant::now();
        log_op_start!(
            "query_json",
            request_id = %request_id,
            query_name = query_name,
            mode = mode.as_str()
        );

        let result = self
            .dispatch(query_name, sql, mode)
            .map_err(|e| e.with_request_id(request_id.clone()));
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(text) => {
                log_op_end!(
                    "query_json",
                    duration_ms = duration_ms,
                    request_id = %request_id,
                    query_name = query_name,
                    output_len = text.len()
                );
            }
            Err(e) => {
                log_op_error!(
                    "query_json",
                    e.clone(),
                    duration_ms = duration_ms,
                    request_id = %request_id,
                    query_name = query_name
                );
            }
        }
        result
    }

    fn dispatch(&self, query_name: &str, sql: &str, mode: ExecutionMode) -> Result<String> {
        if sql.trim().is_empty() {
            return Err(invalid_input(query_name, "sql cannot be empty"));
        }
        if mode == ExecutionMode::Differential && query_name.is_empty() {
            return Err(invalid_input(
                query_name,
                "differential queries require a name",
            ));
        }

        let ctx = QueryContext {
            executor: self.executor.as_ref(),
            store: self.store.as_ref(),
            locks: &self.locks,
            builder: LogItemBuilder::new(self.host.host_identifier())
                .with_decorations(self.config.decorations.clone()),
            epoch: self.config.epoch,
            format: self.config.log_format,
        };

        match mode {
            ExecutionMode::Differential => run_differential(query_name, sql, &ctx),
            ExecutionMode::Snapshot => run_snapshot(query_name, sql, &ctx),
        }
    }

    /// Flush the snapshot store and release the engine.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Persistence` if the final flush fails.
    pub fn shutdown(self) -> Result<()> {
        let start = Instant::now();
        log_op_start!("shutdown");
        match self.store.flush() {
            Ok(()) => {
                log_op_end!("shutdown", duration_ms = start.elapsed().as_millis() as u64);
                Ok(())
            }
            Err(e) => {
                log_op_error!(
                    "shutdown",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(e)
            }
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                ExError::new(ExErrorKind::Io)
                    .with_op("initialize")
                    .with_message(format!("cannot create {}: {}", parent.display(), e))
            })
        }
        _ => Ok(()),
    }
}

fn invalid_input(query_name: &str, message: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("query_json")
        .with_query_name(query_name)
        .with_message(message)
}
