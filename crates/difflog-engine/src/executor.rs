//! SQL execution collaborators.

use difflog_core::errors::{ExError, ExErrorKind, Result};
use difflog_core::model::{ResultSet, Row};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::Mutex;

/// Runs SQL and returns rows of string values.
///
/// Failures carry `ExErrorKind::QueryFailed` and, when the engine reports
/// one, its own nonzero status via `ExError::with_engine_status`.
pub trait QueryExecutor: Send + Sync {
    fn execute(&self, sql: &str) -> Result<ResultSet>;
}

/// `QueryExecutor` over a SQLite connection.
///
/// Values are converted to text: NULL becomes `""`, numbers their decimal
/// form, blobs lowercase hex.
pub struct SqliteQueryExecutor {
    conn: Mutex<Connection>,
}

impl SqliteQueryExecutor {
    /// Open the database at `path` for querying.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::QueryFailed` if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| query_error("open", &e))?;
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::QueryFailed` if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| query_error("open", &e))?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run a batch of statements that return no rows, e.g. schema setup.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::QueryFailed` with the SQLite extended result code.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| query_error("execute_batch", &e))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            ExError::new(ExErrorKind::Concurrency)
                .with_op("execute")
                .with_message("query connection lock poisoned")
        })
    }
}

impl QueryExecutor for SqliteQueryExecutor {
    fn execute(&self, sql: &str) -> Result<ResultSet> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(|e| query_error("prepare", &e))?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query([]).map_err(|e| query_error("execute", &e))?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().map_err(|e| query_error("execute", &e))? {
            let mut out = Row::new();
            for (idx, column) in columns.iter().enumerate() {
                let value = row
                    .get_ref(idx)
                    .map_err(|e| query_error("execute", &e))?;
                out.insert(column.clone(), value_to_string(value));
            }
            results.push(out);
        }
        Ok(results)
    }
}

fn value_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => hex::encode(b),
    }
}

fn query_error(op: &str, err: &rusqlite::Error) -> ExError {
    let status = match err {
        rusqlite::Error::SqliteFailure(e, _) => e.extended_code,
        // Parse errors from prepare carry their code here, not in SqliteFailure
        rusqlite::Error::SqlInputError { error, .. } => error.extended_code,
        _ => 0,
    };
    ExError::new(ExErrorKind::QueryFailed)
        .with_op(op.to_string())
        .with_engine_status(status)
        .with_message(err.to_string())
}
