//! Layout of the three aggregate tables as side-by-side bar panels.
//!
//! The composer does no aggregation; it only maps table rows to bars on a
//! shared time axis and decides the size of every panel.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;
use tweetstats_common::{format_timestamp, Granularity, Result, StatsError};

use crate::{AggregateTable, Metric};

/// Fraction of a period a bar covers; the rest is the gap to the next bar.
pub const BAR_WIDTH_RATIO: f64 = 0.9;

/// Caption of a panel whose table has no rows.
pub const NO_DATA_CAPTION: &str = "no data";

/// Visual settings shared by every panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartStyle {
    /// Width of each plot area in pixels.
    pub panel_width: u32,
    /// Height of each plot area in pixels.
    pub panel_height: u32,
    /// Horizontal gap between panels.
    pub spacing: u32,
    /// Space below each plot for x axis labels.
    pub x_label_area: u32,
    /// Space left of each plot for y axis labels.
    pub y_label_area: u32,
    /// Padding around each plot.
    pub margin: u32,
    /// Background as `#RRGGBB`.
    pub background_color: String,
    /// Bar colors as `#RRGGBB`, assigned to panels in display order.
    pub colors: Vec<String>,
    /// Font family for titles and labels.
    pub font_family: String,
    /// Panel title size.
    pub title_font_size: u32,
    /// Axis label size.
    pub label_font_size: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            panel_width: 200,
            panel_height: 150,
            spacing: 30,
            x_label_area: 30,
            y_label_area: 45,
            margin: 5,
            background_color: "#FFFFFF".to_string(),
            colors: vec![
                "#4C78A8".to_string(),
                "#F58518".to_string(),
                "#54A24B".to_string(),
            ],
            font_family: "sans-serif".to_string(),
            title_font_size: 13,
            label_font_size: 10,
        }
    }
}

impl ChartStyle {
    /// Height reserved above each plot for the panel title.
    pub const fn caption_height(&self) -> u32 {
        self.title_font_size.saturating_mul(2)
    }

    /// Size of one panel including title, label areas and margins.
    ///
    /// Fails when the sizes add up to more than a `u32` can hold.
    pub fn panel_outer_size(&self) -> Result<(u32, u32)> {
        let margins = self.margin.checked_mul(2);
        let caption = self.title_font_size.checked_mul(2);
        let width = margins.and_then(|m| checked_sum(&[m, self.y_label_area, self.panel_width]));
        let height = margins
            .zip(caption)
            .and_then(|(m, c)| checked_sum(&[m, c, self.panel_height, self.x_label_area]));
        width
            .zip(height)
            .ok_or_else(|| StatsError::graph("panel size overflows the canvas"))
    }

    /// Color of the panel at `index`, cycling through the palette.
    pub fn color_for(&self, index: usize) -> &str {
        if self.colors.is_empty() {
            "#000000"
        } else {
            &self.colors[index % self.colors.len()]
        }
    }
}

/// One bar of a panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    /// Left edge, the period start.
    pub start: DateTime<Utc>,
    /// Right edge, [`BAR_WIDTH_RATIO`] of the way to the next period.
    pub end: DateTime<Utc>,
    /// Bar height.
    pub value: f64,
    /// Hover text naming the period and the value.
    pub tooltip: String,
}

/// One bar chart, built from one aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPanel {
    /// Metric shown on the y axis.
    pub metric: Metric,
    /// Panel title.
    pub title: String,
    /// Bar color as `#RRGGBB`.
    pub color: String,
    /// Bars in period order.
    pub bars: Vec<Bar>,
}

impl BarPanel {
    /// Whether the panel has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Tallest bar.
    pub fn max_value(&self) -> Option<f64> {
        self.bars.iter().map(|bar| bar.value).reduce(f64::max)
    }
}

/// A laid-out chart, ready for a [`ChartRenderer`](crate::ChartRenderer).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    /// Period unit of the bars.
    pub granularity: Granularity,
    /// Visual settings.
    pub style: ChartStyle,
    /// Panels, left to right.
    pub panels: Vec<BarPanel>,
    /// Time range shared by every panel; `None` when all panels are empty.
    pub x_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl Composition {
    /// Total canvas size in pixels.
    pub fn size(&self) -> Result<(u32, u32)> {
        canvas_size(&self.style, self.panels.len())
    }

    /// Left edge of the panel at `index`.
    pub fn panel_offset(&self, index: usize) -> Result<i32> {
        let (panel_w, _) = self.style.panel_outer_size()?;
        let step = i64::from(panel_w) + i64::from(self.style.spacing);
        i64::try_from(index)
            .ok()
            .and_then(|index| step.checked_mul(index))
            .and_then(|offset| i32::try_from(offset).ok())
            .ok_or_else(|| StatsError::graph(format!("panel {index} lies outside the canvas")))
    }

    /// Whether no panel has any bar.
    pub fn is_empty(&self) -> bool {
        self.panels.iter().all(BarPanel::is_empty)
    }
}

/// Builds a [`Composition`] from the per-period tables.
#[derive(Debug, Clone)]
pub struct ChartComposer {
    style: ChartStyle,
    granularity: Granularity,
}

impl ChartComposer {
    /// Create a composer for tables aggregated at `granularity`.
    pub const fn new(style: ChartStyle, granularity: Granularity) -> Self {
        Self { style, granularity }
    }

    /// Lay out the count, mean-favorites and mean-retweets tables.
    ///
    /// Panels are ordered count, retweet avg, favorite avg.
    pub fn compose(
        &self,
        count: &AggregateTable,
        mean_favorites: &AggregateTable,
        mean_retweets: &AggregateTable,
    ) -> Result<Composition> {
        let ordered = [count, mean_retweets, mean_favorites];
        canvas_size(&self.style, ordered.len())?;

        let panels = ordered
            .iter()
            .enumerate()
            .map(|(index, table)| self.panel(index, table))
            .collect::<Result<Vec<_>>>()?;

        let x_range = self.shared_range(&ordered)?;
        debug!(
            "Composed {} panels with {} bars",
            panels.len(),
            panels.iter().map(|p| p.bars.len()).sum::<usize>()
        );

        Ok(Composition {
            granularity: self.granularity,
            style: self.style.clone(),
            panels,
            x_range,
        })
    }

    fn panel(&self, index: usize, table: &AggregateTable) -> Result<BarPanel> {
        let bars = table
            .iter()
            .map(|row| {
                let next = self.granularity.next_period_start(row.period_start)?;
                Ok(Bar {
                    start: row.period_start,
                    end: bar_end(row.period_start, next)?,
                    value: row.value,
                    tooltip: tooltip(row.period_start, table.metric, row.value),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BarPanel {
            metric: table.metric,
            title: table.column().to_string(),
            color: self.style.color_for(index).to_string(),
            bars,
        })
    }

    fn shared_range(
        &self,
        tables: &[&AggregateTable],
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        let first = tables
            .iter()
            .filter_map(|t| t.rows.first())
            .map(|r| r.period_start)
            .min();
        let last = tables
            .iter()
            .filter_map(|t| t.rows.last())
            .map(|r| r.period_start)
            .max();

        match (first, last) {
            (Some(first), Some(last)) => {
                let end = self.granularity.next_period_start(last)?;
                Ok(Some((first, end)))
            }
            _ => Ok(None),
        }
    }
}

fn checked_sum(parts: &[u32]) -> Option<u32> {
    parts.iter().copied().try_fold(0, u32::checked_add)
}

/// Canvas size for `panels` side-by-side panels; plotters addresses pixels as `i32`.
fn canvas_size(style: &ChartStyle, panels: usize) -> Result<(u32, u32)> {
    let (panel_w, panel_h) = style.panel_outer_size()?;
    let count = u32::try_from(panels.max(1)).ok();
    let width = count.and_then(|n| {
        let gaps = style.spacing.checked_mul(n - 1)?;
        panel_w.checked_mul(n)?.checked_add(gaps)
    });

    match width {
        Some(width) if fits_axis(width) && fits_axis(panel_h) => Ok((width, panel_h)),
        _ => Err(StatsError::graph(format!("{panels} panels overflow the canvas"))),
    }
}

fn fits_axis(pixels: u32) -> bool {
    i32::try_from(pixels).is_ok()
}

fn bar_end(start: DateTime<Utc>, next: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let span_ms = (next - start).num_milliseconds() as f64;
    let width = Duration::milliseconds((span_ms * BAR_WIDTH_RATIO) as i64);
    start
        .checked_add_signed(width)
        .ok_or_else(|| StatsError::graph(format!("bar at {start} overflows the time axis")))
}

/// Hover text for one bar.
pub fn tooltip(period_start: DateTime<Utc>, metric: Metric, value: f64) -> String {
    format!(
        "created_at: {}, {}: {}",
        format_timestamp(period_start),
        metric.column(),
        format_value(value)
    )
}

/// Format a table value: whole numbers without decimals, others to two places.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TableRow;
    use tweetstats_common::test_utils::mock_timestamp;

    fn table(metric: Metric, rows: &[(DateTime<Utc>, f64)]) -> AggregateTable {
        AggregateTable {
            metric,
            rows: rows
                .iter()
                .map(|&(period_start, value)| TableRow {
                    period_start,
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn test_panel_order_and_titles() {
        let jan = mock_timestamp(2024, 1, 1, 0, 0, 0);
        let composer = ChartComposer::new(ChartStyle::default(), Granularity::Month);
        let composition = composer
            .compose(
                &table(Metric::PostCount, &[(jan, 2.0)]),
                &table(Metric::MeanFavorites, &[(jan, 4.0)]),
                &table(Metric::MeanRetweets, &[(jan, 1.5)]),
            )
            .unwrap();

        let titles: Vec<_> = composition
            .panels
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, vec!["count", "retweet avg", "favorite avg"]);
        assert_eq!(composition.panels[0].color, "#4C78A8");
        assert_eq!(composition.panels[2].color, "#54A24B");
    }

    #[test]
    fn test_bar_spans_ninety_percent_of_period() {
        let start = mock_timestamp(2024, 1, 1, 0, 0, 0);
        let composer = ChartComposer::new(ChartStyle::default(), Granularity::Day);
        let composition = composer
            .compose(
                &table(Metric::PostCount, &[(start, 3.0)]),
                &AggregateTable::empty(Metric::MeanFavorites),
                &AggregateTable::empty(Metric::MeanRetweets),
            )
            .unwrap();

        let bar = &composition.panels[0].bars[0];
        assert_eq!(bar.start, start);
        assert_eq!(bar.end - bar.start, Duration::minutes(1296));
        assert_eq!(
            bar.tooltip,
            "created_at: 2024-01-01 00:00:00 UTC, count: 3"
        );
    }

    #[test]
    fn test_shared_x_range() {
        let jan = mock_timestamp(2024, 1, 1, 0, 0, 0);
        let mar = mock_timestamp(2024, 3, 1, 0, 0, 0);
        let composer = ChartComposer::new(ChartStyle::default(), Granularity::Month);
        let composition = composer
            .compose(
                &table(Metric::PostCount, &[(jan, 1.0)]),
                &table(Metric::MeanFavorites, &[(mar, 7.0)]),
                &AggregateTable::empty(Metric::MeanRetweets),
            )
            .unwrap();

        assert_eq!(
            composition.x_range,
            Some((jan, mock_timestamp(2024, 4, 1, 0, 0, 0)))
        );
        assert!(composition.panels[1].is_empty());
        assert!(!composition.is_empty());
    }

    #[test]
    fn test_all_empty() {
        let composer = ChartComposer::new(ChartStyle::default(), Granularity::Month);
        let composition = composer
            .compose(
                &AggregateTable::empty(Metric::PostCount),
                &AggregateTable::empty(Metric::MeanFavorites),
                &AggregateTable::empty(Metric::MeanRetweets),
            )
            .unwrap();

        assert!(composition.is_empty());
        assert_eq!(composition.x_range, None);
        assert_eq!(composition.panels.len(), 3);
    }

    #[test]
    fn test_layout_size() {
        let style = ChartStyle::default();
        let (panel_w, panel_h) = style.panel_outer_size().unwrap();
        assert_eq!(panel_w, 45 + 200 + 10);
        assert_eq!(panel_h, 26 + 150 + 30 + 10);

        let composition = Composition {
            granularity: Granularity::Month,
            style,
            panels: vec![
                BarPanel {
                    metric: Metric::PostCount,
                    title: "count".to_string(),
                    color: "#000000".to_string(),
                    bars: Vec::new(),
                };
                3
            ],
            x_range: None,
        };
        assert_eq!(composition.size().unwrap(), (3 * panel_w + 2 * 30, panel_h));
        assert_eq!(composition.panel_offset(2).unwrap(), 2 * (255 + 30));
    }

    #[test]
    fn test_oversized_panels_are_rejected() {
        let style = ChartStyle {
            panel_width: 2_000_000_000,
            ..ChartStyle::default()
        };
        assert_eq!(style.panel_outer_size().unwrap().0, 2_000_000_055);

        let err = ChartComposer::new(style, Granularity::Month)
            .compose(
                &AggregateTable::empty(Metric::PostCount),
                &AggregateTable::empty(Metric::MeanFavorites),
                &AggregateTable::empty(Metric::MeanRetweets),
            )
            .unwrap_err();
        assert!(matches!(err, StatsError::Graph { .. }));

        let wide = ChartStyle {
            panel_width: 1_000_000_000,
            ..ChartStyle::default()
        };
        assert!(canvas_size(&wide, 3).is_err());
        assert!(canvas_size(&wide, 1).is_ok());

        let padded = ChartStyle {
            margin: u32::MAX,
            ..ChartStyle::default()
        };
        assert!(padded.panel_outer_size().is_err());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(2.0), "2");
        assert_eq!(format_value(1.5), "1.50");
        assert_eq!(format_value(6.666_666), "6.67");
    }
}
