//! Chart rendering: one routine per chart kind, drawn with plotters into an
//! in-memory RGB buffer and encoded as PNG.
//!
//! Rendering is deterministic: the same series and labels always produce the
//! same bytes. Text is drawn with a bundled DejaVu Sans, never a system font.
//! Nothing is written to disk and nothing is cached.

mod bar;
mod line;
mod pie;
mod scatter;

use std::sync::OnceLock;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use serde::Serialize;
use tracing::debug;

use crate::config::RenderConfig;
use crate::error::{ReportError, Result};
use crate::models::{ChartSeries, ImageFormat, RenderedImage, ReportId};

pub(crate) type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub(crate) const FONT: &str = "sans-serif";
pub(crate) const TEXT: RGBColor = RGBColor(34, 34, 34);
pub(crate) const GRID: RGBColor = RGBColor(220, 220, 220);

static FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Register the bundled face under `FONT`, normal style only.
fn ensure_font() -> Result<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| register_font(FONT, FontStyle::Normal, FONT_DATA).is_ok());
    if ok {
        Ok(())
    } else {
        Err(ReportError::Render("bundled font could not be loaded".to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
}

impl ChartKind {
    pub fn for_report(report: ReportId) -> Self {
        match report {
            ReportId::Ranking => ChartKind::Bar,
            ReportId::TimeSeries => ChartKind::Line,
            ReportId::Ratio => ChartKind::Pie,
            ReportId::Aggregate => ChartKind::Scatter,
        }
    }

    fn size(self, config: &RenderConfig) -> (u32, u32) {
        match self {
            ChartKind::Bar => config.bar,
            ChartKind::Line => config.line,
            ChartKind::Pie => config.pie,
            ChartKind::Scatter => config.scatter,
        }
    }
}

/// Title and axis captions. `series` names the line trace in the legend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Option<String>,
}

impl ChartLabels {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series: None,
        }
    }

    pub fn with_series(mut self, name: impl Into<String>) -> Self {
        self.series = Some(name.into());
        self
    }
}

/// Renders series into PNG images at the configured sizes.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    config: RenderConfig,
}

impl ChartRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render `series` as a `kind` chart.
    ///
    /// Fails before drawing anything if the series is empty, if a ratio has
    /// nothing to split, or if `kind` does not match the series shape.
    pub fn render(
        &self,
        kind: ChartKind,
        series: &ChartSeries,
        labels: &ChartLabels,
    ) -> Result<RenderedImage> {
        if series.is_empty() {
            return Err(ReportError::Render(format!(
                "cannot draw a {:?} chart without data points",
                kind
            )));
        }

        let size = kind.size(&self.config);
        let image = match (kind, series) {
            (ChartKind::Bar, ChartSeries::Categorical(s)) => {
                rasterize(size, |root| bar::draw(root, s, labels))?
            }
            (ChartKind::Line, ChartSeries::TimeSeries(s)) => {
                rasterize(size, |root| line::draw(root, s, labels))?
            }
            (ChartKind::Pie, ChartSeries::Ratio(s)) => {
                if !(s.total() > 0.0) {
                    return Err(ReportError::Render(
                        "cannot draw a pie chart of a zero total".to_string(),
                    ));
                }
                rasterize(size, |root| pie::draw(root, s, labels))?
            }
            (ChartKind::Scatter, ChartSeries::ScatterSet(s)) => {
                rasterize(size, |root| scatter::draw(root, s, labels))?
            }
            (kind, _) => {
                return Err(ReportError::Render(format!(
                    "a {:?} chart cannot show this series",
                    kind
                )))
            }
        };

        debug!(?kind, width = size.0, height = size.1, bytes = image.bytes().len(), "chart rendered");
        Ok(image)
    }
}

/// Render with the default sizes.
pub fn render(kind: ChartKind, series: &ChartSeries, labels: &ChartLabels) -> Result<RenderedImage> {
    ChartRenderer::default().render(kind, series, labels)
}

/// Draw on a white canvas of `size` and encode the pixels as PNG.
fn rasterize<F>(size: (u32, u32), draw: F) -> Result<RenderedImage>
where
    F: FnOnce(&Area<'_>) -> Result<()>,
{
    ensure_font()?;
    let (width, height) = size;
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;
        draw(&root)?;
        root.present().map_err(draw_error)?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(&pixels, width, height, ColorType::Rgb8)?;
    Ok(RenderedImage::new(png, ImageFormat::Png))
}

pub(crate) fn draw_error<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Render(e.to_string())
}

/// Axis bounds covering `values` with 10% headroom; never a zero-width span.
///
/// With `floor_at_zero` the lower bound stops at 0 unless a value is negative.
pub(crate) fn padded_range(values: impl Iterator<Item = f64>, floor_at_zero: bool) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    let pad = if span > 0.0 {
        span * 0.1
    } else {
        (max.abs() * 0.1).max(1.0)
    };
    let lo = if floor_at_zero && min >= 0.0 {
        (min - pad).max(0.0)
    } else {
        min - pad
    };
    (lo, max + pad)
}

/// Compact tick text: `1.2M`, `35k`, `0.5`.
pub(crate) fn format_tick(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e4 {
        format!("{:.0}k", v / 1e3)
    } else if a >= 100.0 || v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}
