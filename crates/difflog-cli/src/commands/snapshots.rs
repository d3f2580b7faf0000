//! `difflog snapshots`: read-only views of the snapshot database.

use clap::{Args, Subcommand};
use difflog_core::errors::{ExError, ExErrorKind};
use difflog_core::serialize::serialize_rows;
use difflog_core::snapshot::SnapshotStore;
use difflog_store::SqliteSnapshotStore;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct SnapshotsArgs {
    #[command(subcommand)]
    pub command: SnapshotsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SnapshotsCommand {
    /// List query names with their counter, epoch and row count
    List(ListArgs),
    /// Print the stored rows for one query name as JSON
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub database: PathBuf,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(long)]
    pub database: PathBuf,

    #[arg(long)]
    pub name: String,
}

pub fn execute(args: SnapshotsArgs) -> anyhow::Result<()> {
    match args.command {
        SnapshotsCommand::List(list_args) => execute_list(list_args),
        SnapshotsCommand::Show(show_args) => execute_show(show_args),
    }
}

fn execute_list(args: ListArgs) -> anyhow::Result<()> {
    let store = open_existing(&args.database)?;
    for name in store.query_names()? {
        if let Some(snapshot) = store.load(&name)? {
            println!(
                "{}\tcounter={}\tepoch={}\trows={}",
                name,
                snapshot.counter,
                snapshot.epoch,
                snapshot.rows.len()
            );
        }
    }
    Ok(())
}

fn execute_show(args: ShowArgs) -> anyhow::Result<()> {
    let store = open_existing(&args.database)?;
    let snapshot = store.load(&args.name)?.ok_or_else(|| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("snapshots_show")
            .with_query_name(args.name.as_str())
            .with_message("no snapshot stored for this name")
    })?;
    println!("{}", serialize_rows(&snapshot.rows)?);
    Ok(())
}

/// Opening would otherwise create an empty database at a mistyped path.
fn open_existing(path: &Path) -> anyhow::Result<SqliteSnapshotStore> {
    if !path.exists() {
        return Err(ExError::new(ExErrorKind::Io)
            .with_op("snapshots")
            .with_message(format!("{} does not exist", path.display()))
            .into());
    }
    Ok(SqliteSnapshotStore::open(path)?)
}
