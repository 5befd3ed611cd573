//! Chart-ready series, independent of any rendering technology.

use chrono::NaiveDate;
use serde::Serialize;

/// Labels paired with magnitudes, one bar per label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Categorical {
    labels: Vec<String>,
    values: Vec<f64>,
}

impl Categorical {
    /// Build from `(label, value)` pairs, which keeps both sides the same length.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let (labels, values) = pairs.into_iter().unzip();
        Self { labels, values }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Dated values in non-decreasing date order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub points: Vec<(NaiveDate, f64)>,
}

/// A two-slice split of a total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ratio {
    pub slice_labels: (String, String),
    pub slice_values: (f64, f64),
}

impl Ratio {
    pub fn total(&self) -> f64 {
        self.slice_values.0 + self.slice_values.1
    }
}

/// Bare `(x, y)` coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSet {
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartSeries {
    Categorical(Categorical),
    TimeSeries(TimeSeries),
    Ratio(Ratio),
    ScatterSet(ScatterSet),
}

impl ChartSeries {
    /// Number of plotted data points (slices for a ratio).
    pub fn len(&self) -> usize {
        match self {
            ChartSeries::Categorical(c) => c.len(),
            ChartSeries::TimeSeries(t) => t.points.len(),
            ChartSeries::Ratio(_) => 2,
            ChartSeries::ScatterSet(s) => s.points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
