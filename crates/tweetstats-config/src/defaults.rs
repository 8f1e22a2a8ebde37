//! Default values for every configuration section.

use crate::schema::*;
use std::path::PathBuf;
use tweetstats_common::{Granularity, LogFormat, DEFAULT_ARCHIVE_EXTENSIONS};

/// Default chart file name, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "tweet_summary.svg";

/// Default bar palette (count, retweets, favorites).
pub const DEFAULT_COLORS: [&str; 3] = ["#4C78A8", "#F58518", "#54A24B"];

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            aggregation: AggregationConfig::default(),
            chart: ChartConfig::default(),
            export: ExportConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            extensions: DEFAULT_ARCHIVE_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Month,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            panel_width: 200,
            panel_height: 150,
            spacing: 30,
            background_color: "#FFFFFF".to_string(),
            colors: DEFAULT_COLORS.iter().map(|c| (*c).to_string()).collect(),
            font_family: "sans-serif".to_string(),
            title_font_size: 13,
            label_font_size: 10,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file_path: None,
            include_spans: false,
            include_targets: true,
        }
    }
}
