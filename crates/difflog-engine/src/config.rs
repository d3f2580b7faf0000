//! Engine configuration.
//!
//! Loaded from a TOML file, then adjusted by `DIFFLOG_*` environment
//! variables, then validated. Every key is optional:
//!
//! ```toml
//! database_path = "/var/lib/difflog/snapshots.db"
//! query_database = "/var/lib/difflog/inventory.db"
//! host_identifier = "web-01"
//! epoch = 3
//! log_format = "batch"
//! log_profile = "production"
//!
//! [decorations]
//! datacenter = "eu-west"
//! ```

use difflog_core::errors::{ExError, ExErrorKind};
use difflog_core::logging_facility::Profile;
use difflog_core::model::LogFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_DATABASE_PATH: &str = "DIFFLOG_DATABASE_PATH";
pub const ENV_QUERY_DATABASE: &str = "DIFFLOG_QUERY_DATABASE";
pub const ENV_HOST_IDENTIFIER: &str = "DIFFLOG_HOST_IDENTIFIER";
pub const ENV_EPOCH: &str = "DIFFLOG_EPOCH";
pub const ENV_LOG_FORMAT: &str = "DIFFLOG_LOG_FORMAT";
pub const ENV_LOG_PROFILE: &str = "DIFFLOG_LOG_PROFILE";

const DEFAULT_LOG_PROFILE: &str = "production";

/// Largest accepted epoch.
pub const MAX_EPOCH: u64 = i64::MAX as u64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for {key}")]
    InvalidOverride { key: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        let kind = match err {
            ConfigError::Read { .. } => ExErrorKind::Io,
            _ => ExErrorKind::InvalidConfig,
        };
        ExError::new(kind)
            .with_op("load_config")
            .with_message(err.to_string())
    }
}

/// Settings for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQLite file holding snapshots. `None` keeps snapshots in memory for
    /// the lifetime of the engine.
    pub database_path: Option<PathBuf>,
    /// SQLite file queries run against. `None` uses a private in-memory
    /// database.
    pub query_database: Option<PathBuf>,
    /// Overrides the system hostname in log records.
    pub host_identifier: Option<String>,
    pub epoch: u64,
    pub log_format: LogFormat,
    pub log_profile: String,
    /// Static key/value pairs attached to every differential record.
    pub decorations: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            query_database: None,
            host_identifier: None,
            epoch: 0,
            log_format: LogFormat::Batch,
            log_profile: DEFAULT_LOG_PROFILE.to_string(),
            decorations: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Environment overrides are applied separately via
    /// [`Config::apply_env_overrides`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML or unknown keys.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults, then the file at `path` if given, then environment
    /// overrides, then validation.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DIFFLOG_*` environment variables over the loaded values.
    ///
    /// Supported variables:
    /// - `DIFFLOG_DATABASE_PATH`: snapshot database file
    /// - `DIFFLOG_QUERY_DATABASE`: database queries run against
    /// - `DIFFLOG_HOST_IDENTIFIER`: host identifier in records
    /// - `DIFFLOG_EPOCH`: epoch, a non-negative integer
    /// - `DIFFLOG_LOG_FORMAT`: `batch` or `event`
    /// - `DIFFLOG_LOG_PROFILE`: `development`, `production` or `test`
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidOverride`] when a value cannot be parsed.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidOverride`] when a value cannot be parsed.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup(ENV_QUERY_DATABASE) {
            self.query_database = Some(PathBuf::from(path));
        }

        if let Some(host) = lookup(ENV_HOST_IDENTIFIER) {
            self.host_identifier = Some(host);
        }

        if let Some(value) = lookup(ENV_EPOCH) {
            self.epoch = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride {
                    key: ENV_EPOCH,
                    value: value.clone(),
                })?;
        }

        if let Some(value) = lookup(ENV_LOG_FORMAT) {
            self.log_format = value
                .parse()
                .map_err(|_| ConfigError::InvalidOverride {
                    key: ENV_LOG_FORMAT,
                    value: value.clone(),
                })?;
        }

        if let Some(profile) = lookup(ENV_LOG_PROFILE) {
            self.log_profile = profile;
        }

        Ok(())
    }

    /// Validate configuration settings.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(host) = &self.host_identifier {
            if host.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "host_identifier cannot be empty".to_string(),
                ));
            }
        }

        for (key, path) in [
            ("database_path", &self.database_path),
            ("query_database", &self.query_database),
        ] {
            if matches!(path, Some(p) if p.as_os_str().is_empty()) {
                return Err(ConfigError::Invalid(format!("{} cannot be empty", key)));
            }
        }

        // Snapshot databases keep the epoch in a signed 64-bit column
        if self.epoch > MAX_EPOCH {
            return Err(ConfigError::Invalid(format!(
                "epoch cannot exceed {}",
                MAX_EPOCH
            )));
        }

        if self.decorations.keys().any(|k| k.is_empty()) {
            return Err(ConfigError::Invalid(
                "decoration keys cannot be empty".to_string(),
            ));
        }

        self.profile()?;
        Ok(())
    }

    /// Parsed logging profile.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for an unknown profile name.
    pub fn profile(&self) -> Result<Profile, ConfigError> {
        self.log_profile.parse().map_err(ConfigError::Invalid)
    }
}
