//! Configuration loading utilities

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use tweetstats_common::{Result as StatsResult, StatsError};

use crate::Config;

/// Environment variable naming an explicit configuration file.
pub const ENV_CONFIG_PATH: &str = "TWEETSTATS_CONFIG";
/// Environment variable overriding `input.directory`.
pub const ENV_INPUT_DIR: &str = "TWEETSTATS_INPUT_DIR";
/// Environment variable overriding `aggregation.granularity`.
pub const ENV_GRANULARITY: &str = "TWEETSTATS_GRANULARITY";
/// Environment variable overriding `chart.output_path`.
pub const ENV_OUTPUT: &str = "TWEETSTATS_OUTPUT";
/// Environment variable overriding `export.json_path`.
pub const ENV_EXPORT_JSON: &str = "TWEETSTATS_EXPORT_JSON";
/// Environment variable overriding `logging.level`.
pub const ENV_LOG_LEVEL: &str = "TWEETSTATS_LOG_LEVEL";
/// Environment variable overriding `logging.format`.
pub const ENV_LOG_FORMAT: &str = "TWEETSTATS_LOG_FORMAT";

/// File names probed in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["tweetstats.yaml", "tweetstats.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file {path}: {source}")]
    IoError {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Offending variable.
        var: String,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for StatsError {
    fn from(err: ConfigError) -> Self {
        Self::config_with_source("Configuration loading error", err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides.
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let mut config = Self::read_file(path.as_ref())?;
        Self::apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Resolve configuration from the first available source.
    ///
    /// An explicit path wins, then `TWEETSTATS_CONFIG`, then a
    /// `tweetstats.yaml`/`tweetstats.yml` in the working directory; without
    /// any file the defaults are used. Environment overrides are applied in
    /// every case. The result is not validated, so callers can layer command
    /// line flags on top first.
    pub fn load(explicit: Option<&Path>) -> StatsResult<Config> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(ENV_CONFIG_PATH).map(PathBuf::from))
            .or_else(|| {
                DEFAULT_CONFIG_FILES
                    .iter()
                    .map(PathBuf::from)
                    .find(|candidate| candidate.exists())
            });

        let config = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load_config(&path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                let mut config = Config::default();
                Self::apply_env_overrides(&mut config)?;
                config
            }
        };

        Ok(config)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Config, ConfigError> {
        // An empty document is a valid "all defaults" file
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn read_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Apply `TWEETSTATS_*` environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |key| env::var(key).ok())
    }

    /// Apply overrides using `lookup` as the variable source.
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_INPUT_DIR) {
            config.input.directory = Some(PathBuf::from(dir));
        }

        if let Some(granularity) = lookup(ENV_GRANULARITY) {
            config.aggregation.granularity =
                granularity.parse().map_err(|e| ConfigError::EnvParseError {
                    var: ENV_GRANULARITY.to_string(),
                    source: Box::new(e),
                })?;
        }

        if let Some(output) = lookup(ENV_OUTPUT) {
            config.chart.output_path = PathBuf::from(output);
        }

        if let Some(export) = lookup(ENV_EXPORT_JSON) {
            config.export.json_path = Some(PathBuf::from(export));
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.logging.format = format.parse().map_err(|e| ConfigError::EnvParseError {
                var: ENV_LOG_FORMAT.to_string(),
                source: Box::new(e),
            })?;
        }

        Ok(())
    }
}
