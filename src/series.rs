//! Converts result rows into chart-ready series. Pure; no I/O.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::warn;

use crate::error::{ReportError, Result};
use crate::models::{
    Categorical, ChartSeries, Ratio, ReportId, ResultRow, ScatterSet, TimeSeries,
};
use crate::queries::{aggregate, ratio};
use crate::resolver::parse_date;

pub const VACCINATED: &str = "Vaccinated";
pub const NOT_VACCINATED: &str = "Not vaccinated";

/// Shape `rows` for the given report.
pub fn transform(report: ReportId, rows: &[ResultRow]) -> Result<ChartSeries> {
    match report {
        ReportId::Ranking => ranking(rows).map(ChartSeries::Categorical),
        ReportId::TimeSeries => time_series(rows).map(ChartSeries::TimeSeries),
        ReportId::Ratio => vaccination_ratio(rows).map(ChartSeries::Ratio),
        ReportId::Aggregate => scatter(rows).map(ChartSeries::ScatterSet),
    }
}

/// Bars labelled by `location`, valued by the row's other column, sorted by
/// value descending. Equal values keep their row order.
pub fn ranking(rows: &[ResultRow]) -> Result<Categorical> {
    let mut pairs = Vec::with_capacity(rows.len());
    for row in rows {
        let label = text(row, "location")?;
        let column = value_column(row, "location")?;
        match number(row, column)? {
            Some(v) => pairs.push((label, v)),
            None => warn!(location = %label, column, "skipping location without a value"),
        }
    }
    // Stable, so ties keep the order the rows arrived in.
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(Categorical::from_pairs(pairs))
}

/// Points in row order. Gaps (`null` values) are dropped; dates must not go
/// backwards.
pub fn time_series(rows: &[ResultRow]) -> Result<TimeSeries> {
    let mut points: Vec<(NaiveDate, f64)> = Vec::with_capacity(rows.len());
    for row in rows {
        let raw_date = text(row, "date")?;
        let date = parse_date(&raw_date).map_err(|_| {
            ReportError::DataIntegrity(format!("unparseable date {:?}", raw_date))
        })?;
        if let Some(&(prev, _)) = points.last() {
            if date < prev {
                return Err(ReportError::DataIntegrity(format!(
                    "dates out of order: {} after {}",
                    date, prev
                )));
            }
        }
        let column = value_column(row, "date")?;
        match number(row, column)? {
            Some(v) => points.push((date, v)),
            None => warn!(%date, column, "skipping date without a value"),
        }
    }
    Ok(TimeSeries { points })
}

/// `(part, total - part)` from a single row.
pub fn vaccination_ratio(rows: &[ResultRow]) -> Result<Ratio> {
    let row = match rows {
        [row] => row,
        _ => {
            return Err(ReportError::DataIntegrity(format!(
                "expected exactly one row, found {}",
                rows.len()
            )))
        }
    };
    let total = required_number(row, ratio::TOTAL_COLUMN)?;
    let part = required_number(row, ratio::PART_COLUMN)?;
    split(total, part)
}

/// Split `total` into `(part, total - part)`, rejecting impossible inputs.
pub fn split(total: f64, part: f64) -> Result<Ratio> {
    let rest = total - part;
    if part < 0.0 || rest < 0.0 {
        return Err(ReportError::DataIntegrity(format!(
            "{} of {} does not split into non-negative parts",
            part, total
        )));
    }
    Ok(Ratio {
        slice_labels: (VACCINATED.to_string(), NOT_VACCINATED.to_string()),
        slice_values: (part, rest),
    })
}

/// `(life expectancy, beds)` pairs. Rows with a missing mean or a zero bed
/// count are excluded.
pub fn scatter(rows: &[ResultRow]) -> Result<ScatterSet> {
    let mut points = Vec::with_capacity(rows.len());
    for row in rows {
        let x = number(row, aggregate::X_COLUMN)?;
        let y = number(row, aggregate::Y_COLUMN)?;
        match (x, y) {
            (Some(x), Some(y)) if y != 0.0 => points.push((x, y)),
            _ => warn!(location = %row["location"], "skipping location without both means"),
        }
    }
    Ok(ScatterSet { points })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn text(row: &ResultRow, column: &str) -> Result<String> {
    match row.get(column) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ReportError::DataIntegrity(format!(
            "column {} should be text, got {}",
            column, other
        ))),
        None => Err(missing(column)),
    }
}

/// `Ok(None)` for SQL NULL.
fn number(row: &ResultRow, column: &str) -> Result<Option<f64>> {
    match row.get(column) {
        Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| ReportError::DataIntegrity(format!("{} is out of range", column))),
        Some(other) => Err(ReportError::DataIntegrity(format!(
            "column {} should be numeric, got {}",
            column, other
        ))),
        None => Err(missing(column)),
    }
}

fn required_number(row: &ResultRow, column: &str) -> Result<f64> {
    number(row, column)?
        .ok_or_else(|| ReportError::DataIntegrity(format!("{} is null", column)))
}

/// The first column that is not `key`: the projected metric.
fn value_column<'r>(row: &'r ResultRow, key: &str) -> Result<&'r str> {
    row.columns()
        .find(|c| *c != key)
        .ok_or_else(|| ReportError::DataIntegrity(format!("no value column beside {}", key)))
}

fn missing(column: &str) -> ReportError {
    ReportError::DataIntegrity(format!("missing column {}", column))
}
