//! JSON export of a period summary.

use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;
use tweetstats_common::{Granularity, Result};

use crate::{tooltip, AggregateTable, Metric, PeriodSummary};

/// One exported row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    /// Period start in RFC 3339.
    pub period_start: String,
    /// Metric value.
    pub value: f64,
    /// Same text the chart attaches to the bar.
    pub tooltip: String,
}

/// One exported table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportTable {
    /// Metric the rows hold.
    pub metric: Metric,
    /// Column label, as printed in the console table.
    pub column: &'static str,
    /// Rows in period order.
    pub rows: Vec<ExportRow>,
}

/// A metric that could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportFailure {
    /// Metric that failed.
    pub metric: Metric,
    /// Rendered error message.
    pub error: String,
}

/// Serializable view of a [`PeriodSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryExport {
    /// Period unit the tables were computed with.
    pub granularity: Granularity,
    /// Count, mean favorites and mean retweets, in that order.
    pub tables: Vec<ExportTable>,
    /// Metrics exported as empty tables because they failed; omitted when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ExportFailure>,
}

impl From<&AggregateTable> for ExportTable {
    fn from(table: &AggregateTable) -> Self {
        Self {
            metric: table.metric,
            column: table.column(),
            rows: table
                .iter()
                .map(|row| ExportRow {
                    period_start: row.period_start.to_rfc3339(),
                    value: row.value,
                    tooltip: tooltip(row.period_start, table.metric, row.value),
                })
                .collect(),
        }
    }
}

impl SummaryExport {
    /// Build the export from `summary`; failed metrics export as empty tables.
    pub fn from_summary(summary: &PeriodSummary) -> Self {
        let tables = summary.tables();
        Self {
            granularity: summary.granularity,
            tables: [&tables.count, &tables.mean_favorites, &tables.mean_retweets]
                .into_iter()
                .map(ExportTable::from)
                .collect(),
            failures: summary
                .failures()
                .into_iter()
                .map(|(metric, err)| ExportFailure {
                    metric,
                    error: err.to_string(),
                })
                .collect(),
        }
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON document to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        info!("Exported summary to {}", path.display());
        Ok(())
    }
}
