//! Command line interface.

use clap::Parser;
use std::path::PathBuf;
use tweetstats_common::{Granularity, LogFormat};
use tweetstats_config::{Config, ENV_CONFIG_PATH};

/// Summarize an archive of posts by period and chart the result.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "tweetstats", version)]
#[command(about = "Per-period post counts and engagement averages for a post archive")]
pub struct Cli {
    /// Directory holding the archive's .json/.js files
    pub input_dir: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, env = ENV_CONFIG_PATH)]
    pub config: Option<PathBuf>,

    /// Period size: hour, day, week, month, quarter or year
    #[arg(short, long)]
    pub granularity: Option<Granularity>,

    /// Where to write the SVG chart
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the per-period tables as JSON
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tweetstats_graphs=trace`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log output format: pretty, compact or json
    #[arg(long)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Overwrite `config` with every flag that was given.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(dir) = &self.input_dir {
            config.input.directory = Some(dir.clone());
        }
        if let Some(granularity) = self.granularity {
            config.aggregation.granularity = granularity;
        }
        if let Some(output) = &self.output {
            config.chart.output_path = output.clone();
        }
        if let Some(export) = &self.export_json {
            config.export.json_path = Some(export.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}
