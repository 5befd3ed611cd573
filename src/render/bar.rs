use plotters::prelude::*;

use super::{draw_error, format_tick, padded_range, Area, ChartLabels, FONT, GRID, TEXT};
use crate::error::Result;
use crate::models::Categorical;

/// Bar colors, cycled in label order.
const PALETTE: [RGBColor; 6] = [
    RGBColor(255, 215, 0),
    RGBColor(31, 119, 180),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
    RGBColor(214, 39, 40),
    RGBColor(255, 127, 14),
];

pub(super) fn draw(root: &Area<'_>, series: &Categorical, labels: &ChartLabels) -> Result<()> {
    let n = series.len();
    let (_, y_max) = padded_range(series.values().iter().copied().chain([0.0]), true);

    let mut chart = ChartBuilder::on(root)
        .caption(&labels.title, (FONT, 28).into_font().color(&TEXT))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)
        .map_err(draw_error)?;

    let names = series.labels();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(&GRID)
        .x_desc(labels.x_label.as_str())
        .y_desc(labels.y_label.as_str())
        .x_labels(n)
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => names.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|y| format_tick(*y))
        .label_style((FONT, 14).into_font().color(&TEXT))
        .draw()
        .map_err(draw_error)?;

    chart
        .draw_series(series.values().iter().enumerate().map(|(i, &v)| {
            let color = PALETTE[i % PALETTE.len()];
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
                color.filled(),
            );
            bar.set_margin(0, 0, 12, 12);
            bar
        }))
        .map_err(draw_error)?;

    Ok(())
}
