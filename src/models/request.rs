//! Incoming report requests: which report, and the raw form fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

// ---------------------------------------------------------------------------
// ReportId
// ---------------------------------------------------------------------------

/// One of the four fixed analytical views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportId {
    /// Latest snapshot per location, ranked by a metric.
    Ranking,
    /// One metric for one location across a date range.
    TimeSeries,
    /// Vaccinated vs. not vaccinated for a continent at its snapshot date.
    Ratio,
    /// Mean life expectancy against mean hospital beds, per location.
    Aggregate,
}

impl ReportId {
    pub const ALL: [ReportId; 4] = [
        ReportId::Ranking,
        ReportId::TimeSeries,
        ReportId::Ratio,
        ReportId::Aggregate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportId::Ranking => "ranking",
            ReportId::TimeSeries => "time-series",
            ReportId::Ratio => "ratio",
            ReportId::Aggregate => "aggregate",
        }
    }

    /// Whether the report needs form input before it can be computed.
    pub fn takes_input(self) -> bool {
        !matches!(self, ReportId::Aggregate)
    }

    /// The form field names the report reads.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            ReportId::Ranking => &["locations[]", "date", "metric"],
            ReportId::TimeSeries => &["country", "start_date", "end_date", "metric"],
            ReportId::Ratio => &["continent"],
            ReportId::Aggregate => &[],
        }
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportId {
    type Err = ReportError;

    /// Accepts the report names and the legacy `grafico1`..`grafico4` routes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ranking" | "grafico1" => Ok(ReportId::Ranking),
            "time-series" | "grafico2" => Ok(ReportId::TimeSeries),
            "ratio" | "grafico3" => Ok(ReportId::Ratio),
            "aggregate" | "grafico4" => Ok(ReportId::Aggregate),
            other => Err(ReportError::Validation(format!("unknown report {:?}", other))),
        }
    }
}

// ---------------------------------------------------------------------------
// RawParams
// ---------------------------------------------------------------------------

/// Form fields in submission order. A name may repeat (`locations[]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParams {
    pairs: Vec<(String, String)>,
}

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// First non-blank value for `name`, trimmed.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values(name).next()
    }

    /// Every non-blank value for `name`, trimmed, in submission order.
    ///
    /// `name` and `name[]` are treated as the same field.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.values(name).collect()
    }

    fn values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let bare = name.strip_suffix("[]").unwrap_or(name).to_owned();
        self.pairs
            .iter()
            .filter(move |(k, _)| k.strip_suffix("[]").unwrap_or(k) == bare)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// ReportRequest
// ---------------------------------------------------------------------------

/// One request for one report. Owned by the handling request and dropped
/// once the response is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub report_id: ReportId,
    pub raw_params: RawParams,
}

impl ReportRequest {
    pub fn new(report_id: ReportId, raw_params: RawParams) -> Self {
        Self { report_id, raw_params }
    }

    /// A "show the form" request: no parameters.
    pub fn form(report_id: ReportId) -> Self {
        Self::new(report_id, RawParams::new())
    }

    /// Whether the caller should be shown the input form instead of a chart.
    pub fn wants_form(&self) -> bool {
        self.report_id.takes_input() && self.raw_params.is_empty()
    }
}
