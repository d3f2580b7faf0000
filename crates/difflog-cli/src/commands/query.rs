//! `difflog query`

use crate::commands::ConfigOverrides;
use clap::Args;
use difflog_core::model::ExecutionMode;
use difflog_engine::Engine;

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Query name; snapshots are keyed by it. Required for differential mode.
    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long)]
    pub sql: String,

    /// differential or snapshot
    #[arg(long, default_value = "differential")]
    pub mode: ExecutionMode,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

pub fn execute(args: QueryArgs) -> anyhow::Result<()> {
    let config = args.overrides.resolve()?;
    let engine = Engine::initialize(config)?;

    let result = engine.query(&args.name, &args.sql, args.mode);
    let shutdown = engine.shutdown();

    println!("{}", result?);
    shutdown?;
    Ok(())
}
