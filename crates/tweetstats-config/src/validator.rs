//! Runtime validation of a fully resolved configuration.

use std::fmt;

use crate::schema::Config;

/// Largest accepted panel width, panel height or spacing, in pixels.
pub const MAX_PANEL_PIXELS: u32 = 10_000;

/// One problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path of the offending field, e.g. `chart.panel_width`.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Collects every issue in `config`; empty when the configuration is usable.
    pub fn validate(config: &Config) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut issue = |field: &'static str, message: &str| {
            issues.push(ValidationIssue {
                field,
                message: message.to_string(),
            });
        };

        match &config.input.directory {
            None => issue(
                "input.directory",
                "is required (pass INPUT_DIR, set TWEETSTATS_INPUT_DIR or input.directory)",
            ),
            Some(dir) if dir.as_os_str().is_empty() => {
                issue("input.directory", "must not be empty")
            }
            Some(_) => {}
        }

        if config.input.extensions.is_empty() {
            issue("input.extensions", "must list at least one extension");
        }
        if config
            .input
            .extensions
            .iter()
            .any(|ext| ext.trim().is_empty() || ext.starts_with('.'))
        {
            issue(
                "input.extensions",
                "entries must be non-empty and written without a leading dot",
            );
        }

        let chart = &config.chart;
        if chart.output_path.as_os_str().is_empty() {
            issue("chart.output_path", "must not be empty");
        }
        for (field, pixels) in [
            ("chart.panel_width", chart.panel_width),
            ("chart.panel_height", chart.panel_height),
        ] {
            if pixels == 0 {
                issue(field, "must be greater than zero");
            } else if pixels > MAX_PANEL_PIXELS {
                issue(field, &format!("must be at most {MAX_PANEL_PIXELS} pixels"));
            }
        }
        if chart.spacing > MAX_PANEL_PIXELS {
            issue("chart.spacing", &format!("must be at most {MAX_PANEL_PIXELS} pixels"));
        }
        if chart.title_font_size == 0 || chart.label_font_size == 0 {
            issue("chart.font_size", "font sizes must be greater than zero");
        }
        if !is_hex_color(&chart.background_color) {
            issue("chart.background_color", "must be a #RRGGBB color");
        }
        if chart.colors.is_empty() {
            issue("chart.colors", "must list at least one color");
        }
        if chart.colors.iter().any(|c| !is_hex_color(c)) {
            issue("chart.colors", "every entry must be a #RRGGBB color");
        }

        if config.logging.level.trim().is_empty() {
            issue("logging.level", "must not be empty");
        }

        issues
    }
}

/// Whether `value` looks like `#RRGGBB`.
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
