use chrono::{Duration, NaiveDate};
use plotters::prelude::*;

use super::{draw_error, format_tick, padded_range, Area, ChartLabels, FONT, GRID, TEXT};
use crate::error::Result;
use crate::models::TimeSeries;

const TRACE: RGBColor = RGBColor(214, 39, 40);

/// Dates are plotted as day offsets from the first point.
pub(super) fn draw(root: &Area<'_>, series: &TimeSeries, labels: &ChartLabels) -> Result<()> {
    let Some(&(origin, _)) = series.points.first() else {
        return Ok(());
    };
    let last = series.points.last().map(|p| p.0).unwrap_or(origin);
    let span = (last - origin).num_days().max(1);
    let (y_min, y_max) = padded_range(series.points.iter().map(|p| p.1), true);

    let mut chart = ChartBuilder::on(root)
        .caption(&labels.title, (FONT, 26).into_font().color(&TEXT))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0i64..span, y_min..y_max)
        .map_err(draw_error)?;

    chart
        .configure_mesh()
        .light_line_style(&GRID)
        .x_desc(labels.x_label.as_str())
        .y_desc(labels.y_label.as_str())
        .x_labels(6)
        .x_label_formatter(&|d| day_label(origin, *d))
        .y_label_formatter(&|y| format_tick(*y))
        .label_style((FONT, 14).into_font().color(&TEXT))
        .draw()
        .map_err(draw_error)?;

    let trace_name = labels.series.clone().unwrap_or_else(|| labels.y_label.clone());
    chart
        .draw_series(LineSeries::new(
            series
                .points
                .iter()
                .map(|(d, v)| ((*d - origin).num_days(), *v)),
            TRACE.stroke_width(2),
        ))
        .map_err(draw_error)?
        .label(trace_name)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TRACE.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&TEXT)
        .label_font((FONT, 14).into_font().color(&TEXT))
        .draw()
        .map_err(draw_error)?;

    Ok(())
}

fn day_label(origin: NaiveDate, offset: i64) -> String {
    origin
        .checked_add_signed(Duration::days(offset))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
