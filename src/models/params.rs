//! Validated, typed parameters, one shape per report.

use chrono::NaiveDate;
use serde::Serialize;

use super::{Continent, Metric, ReportId};

/// Parameters for the latest-snapshot ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingParams {
    /// Distinct locations in the order they were requested. Never empty.
    pub locations: Vec<String>,
    pub as_of_date: NaiveDate,
    pub metric: Metric,
}

/// Parameters for a single-location time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeriesParams {
    pub location: String,
    /// Inclusive; never after `end_date`.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub metric: Metric,
}

/// Parameters for the vaccination ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatioParams {
    pub continent: Continent,
    /// Resolved from the region table, never taken from the request.
    pub snapshot_date: NaiveDate,
}

/// A fully validated parameter set. Every field is present and typed, so a
/// query can be bound from it without further checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParameterSet {
    Ranking(RankingParams),
    TimeSeries(TimeSeriesParams),
    Ratio(RatioParams),
    Aggregate,
}

impl ParameterSet {
    pub fn report_id(&self) -> ReportId {
        match self {
            ParameterSet::Ranking(_) => ReportId::Ranking,
            ParameterSet::TimeSeries(_) => ReportId::TimeSeries,
            ParameterSet::Ratio(_) => ReportId::Ratio,
            ParameterSet::Aggregate => ReportId::Aggregate,
        }
    }
}
