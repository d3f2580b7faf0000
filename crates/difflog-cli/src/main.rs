//! difflog CLI
//!
//! Command-line front end over the differential logging engine

use clap::{Parser, Subcommand};
use difflog_core::errors::ExError;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "difflog")]
#[command(about = "difflog - Differential query result logging", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a query and print its differential record or tagged rows
    Query(commands::query::QueryArgs),
    /// Inspect stored snapshots
    Snapshots(commands::snapshots::SnapshotsArgs),
    /// Show the resolved configuration
    Config(commands::config::ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Query(args) => commands::query::execute(args),
        Commands::Snapshots(args) => commands::snapshots::execute(args),
        Commands::Config(args) => commands::config::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

/// Engine failures exit with their status, clamped to a valid exit code.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<ExError>()
        .map(|e| e.status().clamp(1, 255))
        .unwrap_or(1)
}
