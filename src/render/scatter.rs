use plotters::prelude::*;

use super::{draw_error, format_tick, padded_range, Area, ChartLabels, FONT, GRID, TEXT};
use crate::error::Result;
use crate::models::ScatterSet;

const POINT: RGBColor = RGBColor(31, 119, 180);

pub(super) fn draw(root: &Area<'_>, series: &ScatterSet, labels: &ChartLabels) -> Result<()> {
    let (x_min, x_max) = padded_range(series.points.iter().map(|p| p.0), false);
    let (y_min, y_max) = padded_range(series.points.iter().map(|p| p.1), true);

    let mut chart = ChartBuilder::on(root)
        .caption(&labels.title, (FONT, 26).into_font().color(&TEXT))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(draw_error)?;

    chart
        .configure_mesh()
        .light_line_style(&GRID)
        .x_desc(labels.x_label.as_str())
        .y_desc(labels.y_label.as_str())
        .x_label_formatter(&|x| format_tick(*x))
        .y_label_formatter(&|y| format_tick(*y))
        .label_style((FONT, 14).into_font().color(&TEXT))
        .draw()
        .map_err(draw_error)?;

    chart
        .draw_series(
            series
                .points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 5, POINT.filled())),
        )
        .map_err(draw_error)?;

    Ok(())
}
