//! Console rendering of a period summary.

use std::io::{self, Write};
use tweetstats_common::format_period;
use tweetstats_graphs::{format_value, AggregateTable, PeriodSummary};

const MISSING: &str = "-";

/// Write the per-period table for `summary` to `out`.
///
/// Columns follow the chart: count, retweet avg, favorite avg. A metric that
/// failed to aggregate shows `-` in every row.
pub fn write_summary<W: Write>(out: &mut W, summary: &PeriodSummary) -> io::Result<()> {
    let tables = summary.tables();
    let columns: [&AggregateTable; 3] = [
        &tables.count,
        &tables.mean_retweets,
        &tables.mean_favorites,
    ];

    let rows: Vec<(String, Vec<String>)> = summary
        .periods()
        .into_iter()
        .map(|period| {
            let cells = columns
                .iter()
                .map(|table| {
                    table
                        .value_at(period)
                        .map_or_else(|| MISSING.to_string(), format_value)
                })
                .collect();
            (format_period(period, summary.granularity), cells)
        })
        .collect();

    let period_width = rows
        .iter()
        .map(|(label, _)| label.len())
        .chain(std::iter::once("period".len()))
        .max()
        .unwrap_or(0);
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, table)| {
            rows.iter()
                .map(|(_, cells)| cells[i].len())
                .chain(std::iter::once(table.column().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    writeln!(out, "Post summary by {}", summary.granularity)?;
    write!(out, "{:<period_width$}", "period")?;
    for (table, width) in columns.iter().zip(&widths) {
        write!(out, "  {:>width$}", table.column())?;
    }
    writeln!(out)?;

    for (label, cells) in &rows {
        write!(out, "{label:<period_width$}")?;
        for (cell, width) in cells.iter().zip(&widths) {
            write!(out, "  {cell:>width$}")?;
        }
        writeln!(out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tweetstats_common::test_utils::record;
    use tweetstats_common::Granularity;

    fn render(summary: &PeriodSummary) -> String {
        let mut out = Vec::new();
        write_summary(&mut out, summary).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_monthly_table() {
        let records = vec![
            record("2024-01-15T10:00:00Z", 3, 1),
            record("2024-01-20T08:30:00Z", 5, 2),
            record("2024-02-01T00:00:00Z", 10, 6),
        ];
        let text = render(&PeriodSummary::compute(&records, Granularity::Month));
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Post summary by month");
        assert_eq!(lines[1], "period    count  retweet avg  favorite avg");
        assert_eq!(lines[2], "Jan 2024      2         1.50             4");
        assert_eq!(lines[3], "Feb 2024      1            6            10");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_failed_metrics_render_as_header_only() {
        let records = vec![record("bogus", 1, 1)];
        let text = render(&PeriodSummary::compute(&records, Granularity::Day));
        assert_eq!(text.lines().count(), 2);
    }
}
