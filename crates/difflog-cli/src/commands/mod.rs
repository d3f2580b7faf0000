//! Subcommands and the configuration flags they share.

pub mod config;
pub mod query;
pub mod snapshots;

use clap::Args;
use difflog_core::errors::ExError;
use difflog_core::model::LogFormat;
use difflog_engine::Config;
use std::path::PathBuf;

/// Configuration file plus per-invocation overrides. Flags win over
/// `DIFFLOG_*` environment variables, which win over the file.
#[derive(Debug, Args)]
pub struct ConfigOverrides {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Snapshot database file
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Database that queries run against
    #[arg(long)]
    pub query_database: Option<PathBuf>,

    #[arg(long)]
    pub host_identifier: Option<String>,

    #[arg(long)]
    pub epoch: Option<u64>,

    /// Record format: batch or event
    #[arg(long)]
    pub format: Option<LogFormat>,

    /// Logging profile: development, production or test
    #[arg(long)]
    pub log_profile: Option<String>,
}

impl ConfigOverrides {
    pub fn resolve(&self) -> anyhow::Result<Config> {
        let mut config = Config::load(self.config.as_deref()).map_err(ExError::from)?;

        if let Some(path) = &self.database {
            config.database_path = Some(path.clone());
        }
        if let Some(path) = &self.query_database {
            config.query_database = Some(path.clone());
        }
        if let Some(host) = &self.host_identifier {
            config.host_identifier = Some(host.clone());
        }
        if let Some(epoch) = self.epoch {
            config.epoch = epoch;
        }
        if let Some(format) = self.format {
            config.log_format = format;
        }
        if let Some(profile) = &self.log_profile {
            config.log_profile = profile.clone();
        }

        config.validate().map_err(ExError::from)?;
        Ok(config)
    }
}
