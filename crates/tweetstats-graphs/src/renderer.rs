//! Chart rendering trait and the SVG implementation

use chrono::{DateTime, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};
use tweetstats_common::{format_period, Granularity, Result, StatsError};

use crate::{BarPanel, Composition, NO_DATA_CAPTION};

/// Trait for turning a [`Composition`] into an image
pub trait ChartRenderer {
    /// Render the chart and write it to `path`, creating parent directories.
    fn render_to_file(&self, composition: &Composition, path: &Path) -> Result<()> {
        let bytes = self.render_to_bytes(composition)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        info!("Wrote {} chart to {}", self.name(), path.display());
        Ok(())
    }

    /// Render the chart into an in-memory document.
    fn render_to_bytes(&self, composition: &Composition) -> Result<Vec<u8>>;

    /// Short name of the output format.
    fn name(&self) -> &'static str;
}

/// Parse a `#RRGGBB` color string.
pub fn parse_color(color_str: &str) -> Option<RGBColor> {
    let hex = color_str.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Renders compositions as SVG documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgChartRenderer;

impl SvgChartRenderer {
    /// Create an SVG renderer.
    pub const fn new() -> Self {
        Self
    }

    /// Draw every panel of `composition` onto `root`.
    pub fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, composition: &Composition) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: std::error::Error + Send + Sync + 'static,
    {
        let style = &composition.style;
        let background = color_or_err(&style.background_color)?;
        root.fill(&background)?;

        let (panel_w, panel_h) = style.panel_outer_size()?;
        for (index, panel) in composition.panels.iter().enumerate() {
            let offset = composition.panel_offset(index)?;
            let area = root.clone().shrink((offset, 0), (panel_w, panel_h));
            draw_panel(&area, panel, composition)?;
        }

        root.present()?;
        Ok(())
    }
}

impl ChartRenderer for SvgChartRenderer {
    #[instrument(skip(self, composition), fields(panels = composition.panels.len()))]
    fn render_to_bytes(&self, composition: &Composition) -> Result<Vec<u8>> {
        let size = composition.size()?;
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            self.draw(&root, composition)?;
        }
        debug!("Rendered {} bytes of SVG", svg.len());
        Ok(svg.into_bytes())
    }

    fn name(&self) -> &'static str {
        "svg"
    }
}

fn color_or_err(value: &str) -> Result<RGBColor> {
    parse_color(value).ok_or_else(|| StatsError::graph(format!("invalid color '{value}'")))
}

fn draw_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    panel: &BarPanel,
    composition: &Composition,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: std::error::Error + Send + Sync + 'static,
{
    let style = &composition.style;
    let family = style.font_family.as_str();
    let (title_area, body) = area.split_vertically(style.caption_height());

    let (title_w, title_h) = title_area.dim_in_pixel();
    let centered = |size: u32| {
        TextStyle::from((family, size).into_font()).pos(Pos::new(HPos::Center, VPos::Center))
    };
    title_area.draw_text(
        &panel.title,
        &centered(style.title_font_size),
        (half(title_w), half(title_h)),
    )?;

    let Some((x_start, x_end)) = composition.x_range.filter(|_| !panel.is_empty()) else {
        let (w, h) = body.dim_in_pixel();
        body.draw_text(
            NO_DATA_CAPTION,
            &centered(style.label_font_size),
            (half(w), half(h)),
        )?;
        return Ok(());
    };

    let color = color_or_err(&panel.color)?;
    let y_max = panel.max_value().unwrap_or(0.0).max(1.0) * 1.1;
    let x_range = seconds(x_start)..seconds(x_end);

    let mut chart = ChartBuilder::on(&body)
        .margin(style.margin)
        .x_label_area_size(style.x_label_area)
        .y_label_area_size(style.y_label_area)
        .build_cartesian_2d(x_range, 0f64..y_max)?;

    let granularity = composition.granularity;
    let x_formatter = |x: &f64| axis_label(*x, granularity);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(3)
        .y_labels(5)
        .x_label_formatter(&x_formatter)
        .label_style((family, style.label_font_size))
        .draw()?;

    chart.draw_series(panel.bars.iter().map(|bar| {
        Rectangle::new(
            [(seconds(bar.start), 0.0), (seconds(bar.end), bar.value)],
            color.filled(),
        )
    }))?;

    Ok(())
}

fn half(extent: u32) -> i32 {
    i32::try_from(extent / 2).unwrap_or(i32::MAX)
}

fn seconds(ts: DateTime<Utc>) -> f64 {
    ts.timestamp() as f64
}

fn axis_label(x: f64, granularity: Granularity) -> String {
    DateTime::from_timestamp(x as i64, 0)
        .map(|ts| format_period(ts, granularity))
        .unwrap_or_default()
}
