//! SQLite-backed snapshot store.

use crate::db;
use crate::errors::{corrupt_snapshot, from_rusqlite, Result};
use crate::migrations::apply_migrations;
use difflog_core::errors::{ExError, ExErrorKind};
use difflog_core::model::Row;
use difflog_core::snapshot::digest::compute_rows_digest;
use difflog_core::snapshot::{Snapshot, SnapshotStore};
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Durable `SnapshotStore` over a single SQLite connection.
///
/// The connection sits behind a mutex, so all reads and writes through one
/// store value are serialized. `store` runs in a single transaction: the
/// header and every row are replaced together or not at all.
pub struct SqliteSnapshotStore {
    conn: Mutex<Connection>,
}

impl SqliteSnapshotStore {
    /// Open (creating if needed) the database at `path` and apply migrations.
    ///
    /// ## Errors
    ///
    /// - `ExErrorKind::Persistence`: the database cannot be opened or migrated
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut conn = db::open(path)?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory database.
    ///
    /// ## Errors
    ///
    /// - `ExErrorKind::Persistence`: migrations fail
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Query names with a stored snapshot, sorted.
    ///
    /// ## Errors
    ///
    /// - `ExErrorKind::Persistence`: the query fails
    pub fn query_names(&self) -> Result<Vec<String>> {
        let conn = self.lock("query_names")?;
        let mut stmt = conn
            .prepare("SELECT query_name FROM query_snapshots ORDER BY query_name")
            .map_err(from_rusqlite)?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(from_rusqlite)?;
        Ok(names)
    }

    fn lock(&self, op: &str) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            ExError::new(ExErrorKind::Persistence)
                .with_op(op.to_string())
                .with_message("connection lock poisoned")
        })
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self, query_name: &str) -> Result<Option<Snapshot>> {
        let conn = self.lock("load")?;

        let header: Option<(i64, i64, i64, String)> = conn
            .query_row(
                "SELECT counter, epoch, rows_len, rows_digest
                 FROM query_snapshots WHERE query_name = ?1",
                [query_name],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(from_rusqlite)?;

        let Some((counter, epoch, rows_len, rows_digest)) = header else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare(
                "SELECT row_json FROM snapshot_rows
                 WHERE query_name = ?1 ORDER BY ordinal",
            )
            .map_err(from_rusqlite)?;
        let encoded = stmt
            .query_map([query_name], |row| row.get::<_, String>(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        let rows = encoded
            .iter()
            .map(|json| serde_json::from_str::<Row>(json))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| corrupt_snapshot(query_name, &e.to_string()))?;

        if i64::try_from(rows.len()).ok() != Some(rows_len) {
            return Err(corrupt_snapshot(
                query_name,
                &format!("expected {} rows, found {}", rows_len, rows.len()),
            ));
        }
        let actual = compute_rows_digest(&rows)?;
        if actual != rows_digest {
            return Err(corrupt_snapshot(
                query_name,
                &format!("rows digest {} does not match recorded {}", actual, rows_digest),
            ));
        }

        tracing::debug!(
            query_name = query_name,
            counter = counter,
            rows_len = rows.len(),
            "Loaded snapshot"
        );

        Ok(Some(Snapshot::new(
            rows,
            to_u64(query_name, "counter", counter)?,
            to_u64(query_name, "epoch", epoch)?,
        )))
    }

    fn store(&self, query_name: &str, snapshot: &Snapshot) -> Result<()> {
        let counter = to_i64(query_name, "counter", snapshot.counter)?;
        let epoch = to_i64(query_name, "epoch", snapshot.epoch)?;
        let rows_digest = compute_rows_digest(&snapshot.rows)?;

        let mut conn = self.lock("store")?;
        let tx = conn.transaction().map_err(from_rusqlite)?;
        replace_snapshot(&tx, query_name, snapshot, counter, epoch, &rows_digest)?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(
            query_name = query_name,
            counter = snapshot.counter,
            rows_len = snapshot.rows.len(),
            rows_digest = %rows_digest,
            "Stored snapshot"
        );

        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let conn = self.lock("flush")?;
        db::checkpoint(&conn)
    }
}

/// Replace the header and rows for one query name inside `tx`.
fn replace_snapshot(
    tx: &Transaction,
    query_name: &str,
    snapshot: &Snapshot,
    counter: i64,
    epoch: i64,
    rows_digest: &str,
) -> Result<()> {
    tx.execute(
        "DELETE FROM snapshot_rows WHERE query_name = ?1",
        [query_name],
    )
    .map_err(from_rusqlite)?;

    tx.execute(
        r#"
        INSERT INTO query_snapshots (query_name, counter, epoch, rows_len, rows_digest, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(query_name) DO UPDATE SET
            counter = excluded.counter,
            epoch = excluded.epoch,
            rows_len = excluded.rows_len,
            rows_digest = excluded.rows_digest,
            updated_at = excluded.updated_at
        "#,
        rusqlite::params![
            query_name,
            counter,
            epoch,
            snapshot.rows.len() as i64,
            rows_digest,
            chrono::Utc::now().timestamp(),
        ],
    )
    .map_err(from_rusqlite)?;

    let mut insert = tx
        .prepare("INSERT INTO snapshot_rows (query_name, ordinal, row_json) VALUES (?1, ?2, ?3)")
        .map_err(from_rusqlite)?;
    for (ordinal, row) in snapshot.rows.iter().enumerate() {
        let json = serde_json::to_string(row)?;
        insert
            .execute(rusqlite::params![query_name, ordinal as i64, json])
            .map_err(from_rusqlite)?;
    }

    Ok(())
}

fn to_i64(query_name: &str, field: &str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| {
        ExError::new(ExErrorKind::Persistence)
            .with_op("store")
            .with_query_name(query_name)
            .with_message(format!("{} {} exceeds storable range", field, value))
    })
}

fn to_u64(query_name: &str, field: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| corrupt_snapshot(query_name, &format!("negative {}", field)))
}
