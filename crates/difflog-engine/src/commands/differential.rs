//! Differential pipeline: execute, diff against the stored snapshot, build
//! and render the record, then commit the new snapshot.

use crate::commands::QueryContext;
use difflog_core::diff::DiffEngine;
use difflog_core::errors::Result;
use difflog_core::serialize::render_log_item;
use difflog_core::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

/// Run one differential execution of `query_name`.
///
/// The whole unit, from execution to commit, runs inside the per-name lock,
/// so concurrent calls for one name observe each other's snapshots and get
/// consecutive counters. The snapshot is committed only after the record
/// has been rendered; any earlier failure leaves the stored snapshot as it
/// was. An execution failure returns before the store is touched.
///
/// # Errors
///
/// - `ExErrorKind::QueryFailed`: the executor failed
/// - `ExErrorKind::Persistence`: snapshot load or commit failed
/// - `ExErrorKind::Serialization`: the record could not be rendered
pub fn run_differential(query_name: &str, sql: &str, ctx: &QueryContext<'_>) -> Result<String> {
    let start = Instant::now();
    log_op_start!("differential", query_name = query_name, epoch = ctx.epoch);

    let result = ctx
        .locks
        .with_lock(query_name, || differential_locked(query_name, sql, ctx));
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok((text, summary)) => {
            log_op_end!(
                "differential",
                duration_ms = duration_ms,
                query_name = query_name,
                counter = summary.counter,
                new_epoch = summary.new_epoch,
                rows_len = summary.rows_len,
                added_len = summary.added_len,
                removed_len = summary.removed_len
            );
            Ok(text)
        }
        Err(e) => {
            log_op_error!(
                "differential",
                e.clone(),
                duration_ms = duration_ms,
                query_name = query_name
            );
            Err(e)
        }
    }
}

struct Summary {
    counter: u64,
    new_epoch: bool,
    rows_len: usize,
    added_len: usize,
    removed_len: usize,
}

fn differential_locked(
    query_name: &str,
    sql: &str,
    ctx: &QueryContext<'_>,
) -> Result<(String, Summary)> {
    let rows = ctx
        .executor
        .execute(sql)
        .map_err(|e| e.with_query_name(query_name))?;
    let rows_len = rows.len();

    let engine = DiffEngine::new(ctx.store, ctx.epoch);
    let pending = engine.prepare(query_name, rows)?;

    let summary = Summary {
        counter: pending.counter,
        new_epoch: pending.new_epoch,
        rows_len,
        added_len: pending.diff.added.len(),
        removed_len: pending.diff.removed.len(),
    };

    let item = ctx
        .builder
        .build(query_name, pending.diff, pending.counter, pending.epoch);
    let text = render_log_item(&item, ctx.format).map_err(|e| e.with_query_name(query_name))?;

    engine.commit(query_name, &pending.next)?;
    Ok((text, summary))
}
