//! The batch pipeline: load, aggregate, report, chart.

use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};
use tweetstats_config::{ChartConfig, Config, ConfigLoader};
use tweetstats_graphs::{
    ArchiveLoader, ChartComposer, ChartRenderer, ChartStyle, Metric, PeriodSummary, SummaryExport,
    SvgChartRenderer,
};

use crate::{write_summary, AppError, AppResult, Cli};

/// Printed when the archive yields no records.
pub const NO_RECORDS_MESSAGE: &str = "No tweets loaded. Please check your data directory path.";

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing was loaded; no chart was written.
    NoRecords,
    /// The chart was written.
    Completed {
        /// Number of records aggregated.
        records: usize,
        /// Where the chart went.
        chart_path: PathBuf,
        /// Where the JSON export went, if requested.
        export_path: Option<PathBuf>,
        /// Metrics that failed and were shown empty.
        degraded: Vec<Metric>,
    },
}

/// Resolve configuration from file, environment and command line, in
/// increasing precedence. The result is not validated yet.
pub fn resolve_config(cli: &Cli) -> AppResult<Config> {
    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    Ok(config)
}

/// Chart style derived from the `chart` configuration section.
pub fn chart_style(chart: &ChartConfig) -> ChartStyle {
    ChartStyle {
        panel_width: chart.panel_width,
        panel_height: chart.panel_height,
        spacing: chart.spacing,
        background_color: chart.background_color.clone(),
        colors: chart.colors.clone(),
        font_family: chart.font_family.clone(),
        title_font_size: chart.title_font_size,
        label_font_size: chart.label_font_size,
        ..ChartStyle::default()
    }
}

/// One configured run of the pipeline.
#[derive(Debug)]
pub struct App {
    config: Config,
}

impl App {
    /// Validate `config` and build the application.
    pub fn new(config: Config) -> AppResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the pipeline, writing the console summary to `out`.
    pub fn run<W: Write>(&self, out: &mut W) -> AppResult<RunOutcome> {
        let directory = self.config.input_directory()?;
        let granularity = self.config.aggregation.granularity;

        let records = ArchiveLoader::new(directory)
            .with_extensions(self.config.input.extensions.iter().cloned())
            .load_or_empty();
        if records.is_empty() {
            writeln!(out, "{NO_RECORDS_MESSAGE}")?;
            return Ok(RunOutcome::NoRecords);
        }

        info!("Aggregating {} records by {}", records.len(), granularity);
        let summary = PeriodSummary::compute(&records, granularity);
        let failures = summary.failures();
        for (metric, err) in &failures {
            warn!("'{}' could not be computed and is shown empty: {}", metric, err);
        }
        let degraded: Vec<Metric> = failures.into_iter().map(|(metric, _)| metric).collect();

        write_summary(out, &summary)?;

        let tables = summary.tables();
        let chart_path = self.config.chart.output_path.clone();
        let composition = ChartComposer::new(chart_style(&self.config.chart), granularity)
            .compose(&tables.count, &tables.mean_favorites, &tables.mean_retweets)
            .map_err(|e| AppError::output(&chart_path, e))?;
        SvgChartRenderer::new()
            .render_to_file(&composition, &chart_path)
            .map_err(|e| AppError::output(&chart_path, e))?;

        let export_path = self.config.export.json_path.clone();
        if let Some(path) = &export_path {
            SummaryExport::from_summary(&summary)
                .write_to(path)
                .map_err(|e| AppError::output(path, e))?;
            writeln!(out, "Summary exported to {}", path.display())?;
        }

        writeln!(out, "Chart written to {}", chart_path.display())?;
        Ok(RunOutcome::Completed {
            records: records.len(),
            chart_path,
            export_path,
            degraded,
        })
    }
}
