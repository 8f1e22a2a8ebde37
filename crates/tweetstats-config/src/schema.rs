//! Configuration schema definitions using serde.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tweetstats_common::{Granularity, LogFormat, LoggingConfig, StatsError};

use crate::validator::ConfigValidator;

/// Main configuration structure for tweetstats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the post archive lives.
    pub input: InputConfig,
    /// How records are bucketed.
    pub aggregation: AggregationConfig,
    /// Chart layout and styling.
    pub chart: ChartConfig,
    /// Optional machine readable export.
    pub export: ExportConfig,
    /// Logging configuration.
    pub logging: LogConfig,
}

/// Post archive location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory holding the archive files. Required, but may come from the
    /// environment or the command line instead of the file.
    pub directory: Option<PathBuf>,
    /// File extensions (without the dot) the loader picks up.
    pub extensions: Vec<String>,
}

/// Aggregation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Period size used to bucket posts.
    pub granularity: Granularity,
}

/// Chart layout and styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Where the rendered SVG is written.
    pub output_path: PathBuf,
    /// Plot area width of each panel.
    pub panel_width: u32,
    /// Plot area height of each panel.
    pub panel_height: u32,
    /// Horizontal gap between panels.
    pub spacing: u32,
    /// Background color in `#RRGGBB` form.
    pub background_color: String,
    /// Bar colors, cycled over the panels.
    pub colors: Vec<String>,
    /// Font family for captions and labels.
    pub font_family: String,
    /// Panel caption font size.
    pub title_font_size: u32,
    /// Axis label font size.
    pub label_font_size: u32,
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExportConfig {
    /// When set, the aggregate tables are also written here as JSON.
    pub json_path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `tweetstats_graphs=debug`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Optional log file; stderr when unset.
    pub file_path: Option<String>,
    /// Log span open and close events, e.g. the time spent in each stage.
    pub include_spans: bool,
    /// Prefix every event with its module path.
    pub include_targets: bool,
}

impl LogConfig {
    /// Convert into the logging bootstrap configuration.
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            format: self.format,
            file_path: self.file_path.clone(),
            include_spans: self.include_spans,
            include_targets: self.include_targets,
        }
    }
}

impl Config {
    /// Validates the configuration, reporting every problem at once.
    pub fn validate(&self) -> Result<(), StatsError> {
        let issues = ConfigValidator::validate(self);
        if issues.is_empty() {
            return Ok(());
        }

        let message = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(StatsError::config(message))
    }

    /// The input directory, once validation has guaranteed it is present.
    pub fn input_directory(&self) -> Result<&std::path::Path, StatsError> {
        self.input
            .directory
            .as_deref()
            .ok_or_else(|| StatsError::config("input.directory is required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_options_reach_bootstrap() {
        let mut logging = LogConfig::default();
        logging.level = "debug".to_string();
        logging.include_spans = true;
        logging.include_targets = false;

        let bootstrap = logging.to_logging_config();
        assert_eq!(bootstrap.level, "debug");
        assert!(bootstrap.include_spans);
        assert!(!bootstrap.include_targets);
    }

    #[test]
    fn test_default_logging_matches_bootstrap_default() {
        let bootstrap = LogConfig::default().to_logging_config();
        let expected = LoggingConfig::default();
        assert_eq!(bootstrap.include_spans, expected.include_spans);
        assert_eq!(bootstrap.include_targets, expected.include_targets);
    }
}
