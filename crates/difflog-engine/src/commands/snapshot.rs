//! Stateless pipeline: execute, tag every row, render. Never touches the
//! snapshot store.

use crate::commands::QueryContext;
use difflog_core::errors::Result;
use difflog_core::model::LogFormat;
use difflog_core::serialize::{render_log_item, serialize_rows};
use difflog_core::snapshot::tag_all;
use difflog_core::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

/// Run `sql` once and render every row with its identity digest.
///
/// `Batch` format renders the flat JSON array of tagged rows. `Event`
/// format renders a snapshot record as events with action `snapshot`.
///
/// # Errors
///
/// - `ExErrorKind::QueryFailed`: the executor failed
/// - `ExErrorKind::Serialization`: the rows could not be rendered
pub fn run_snapshot(query_name: &str, sql: &str, ctx: &QueryContext<'_>) -> Result<String> {
    let start = Instant::now();
    log_op_start!("snapshot_query", query_name = query_name);

    let result = snapshot_rows(query_name, sql, ctx);
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok((text, rows_len)) => {
            log_op_end!(
                "snapshot_query",
                duration_ms = duration_ms,
                query_name = query_name,
                rows_len = rows_len
            );
            Ok(text)
        }
        Err(e) => {
            log_op_error!(
                "snapshot_query",
                e.clone(),
                duration_ms = duration_ms,
                query_name = query_name
            );
            Err(e)
        }
    }
}

fn snapshot_rows(query_name: &str, sql: &str, ctx: &QueryContext<'_>) -> Result<(String, usize)> {
    let mut rows = ctx
        .executor
        .execute(sql)
        .map_err(|e| e.with_query_name(query_name))?;
    let rows_len = rows.len();
    tag_all(&mut rows);

    let text = match ctx.format {
        LogFormat::Batch => serialize_rows(&rows)?,
        LogFormat::Event => {
            let item = ctx.builder.build_snapshot(query_name, rows, ctx.epoch);
            render_log_item(&item, LogFormat::Event)?
        }
    };
    Ok((text, rows_len))
}
