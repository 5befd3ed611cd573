use std::f64::consts::PI;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{draw_error, Area, ChartLabels, FONT, TEXT};
use crate::error::Result;
use crate::models::Ratio;

const SLICE_COLORS: [RGBColor; 2] = [RGBColor(50, 205, 50), RGBColor(178, 34, 34)];
const START_DEGREES: f64 = 90.0;

/// Two slices, counter-clockwise from twelve o'clock, each annotated with its
/// share of the total.
pub(super) fn draw(root: &Area<'_>, ratio: &Ratio, labels: &ChartLabels) -> Result<()> {
    let area = if labels.title.is_empty() {
        root.clone()
    } else {
        root.titled(&labels.title, (FONT, 24).into_font().color(&TEXT))
            .map_err(draw_error)?
    };

    let (w, h) = area.dim_in_pixel();
    let center = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = (w.min(h) as f64) * 0.36;
    let total = ratio.total();

    let slices = [
        (&ratio.slice_labels.0, ratio.slice_values.0),
        (&ratio.slice_labels.1, ratio.slice_values.1),
    ];

    let mut start = START_DEGREES;
    for (i, (name, value)) in slices.iter().enumerate() {
        let sweep = value / total * 360.0;
        if sweep <= 0.0 {
            continue;
        }

        let mut outline = vec![to_pixel(center)];
        let steps = sweep.ceil().max(2.0) as usize;
        for s in 0..=steps {
            let deg = start + sweep * s as f64 / steps as f64;
            outline.push(to_pixel(polar(center, radius, deg)));
        }
        area.draw(&Polygon::new(outline, SLICE_COLORS[i % SLICE_COLORS.len()].filled()))
            .map_err(draw_error)?;

        let mid = start + sweep / 2.0;
        let centered = Pos::new(HPos::Center, VPos::Center);
        area.draw(&Text::new(
            format!("{:.1}%", value / total * 100.0),
            to_pixel(polar(center, radius * 0.6, mid)),
            (FONT, 18).into_font().color(&WHITE).pos(centered),
        ))
        .map_err(draw_error)?;
        area.draw(&Text::new(
            name.to_string(),
            to_pixel(polar(center, radius * 1.18, mid)),
            (FONT, 18).into_font().color(&TEXT).pos(centered),
        ))
        .map_err(draw_error)?;

        start += sweep;
    }

    Ok(())
}

/// Point at `degrees` (counter-clockwise from +x) on a circle, in screen
/// coordinates where y grows downwards.
fn polar(center: (f64, f64), radius: f64, degrees: f64) -> (f64, f64) {
    let rad = degrees * PI / 180.0;
    (center.0 + radius * rad.cos(), center.1 - radius * rad.sin())
}

fn to_pixel(p: (f64, f64)) -> (i32, i32) {
    (p.0.round() as i32, p.1.round() as i32)
}
