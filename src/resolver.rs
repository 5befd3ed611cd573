//! Turns a [`ReportRequest`] into a validated [`ParameterSet`] and runs the
//! matching query.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::connection::Store;
use crate::error::{ReportError, Result};
use crate::models::{
    Continent, Metric, ParameterSet, RankingParams, RatioParams, RawParams, ReportId,
    ReportRequest, ResultRow, TimeSeriesParams,
};
use crate::queries::{AggregateQuery, QueryCatalog, RankingQuery, RatioQuery, TimeSeriesQuery};

/// Per-report defaults for absent fields. Identical on every call.
pub mod defaults {
    use crate::models::Metric;

    pub const RANKING_DATE: &str = "2022-10-30";
    pub const RANKING_METRIC: Metric = Metric::TotalCases;

    pub const TIME_SERIES_LOCATION: &str = "Africa";
    pub const TIME_SERIES_START: &str = "2022-10-01";
    pub const TIME_SERIES_END: &str = "2022-10-30";
    pub const TIME_SERIES_METRIC: Metric = Metric::TotalDeaths;
}

const MAX_LOCATION_LEN: usize = 128;
const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// ReportResolver
// ---------------------------------------------------------------------------

pub struct ReportResolver<'a, S: Store + ?Sized> {
    store: &'a S,
    catalog: &'a QueryCatalog,
    locations: &'a [String],
}

impl<'a, S: Store + ?Sized> ReportResolver<'a, S> {
    /// `locations` is the set a ranking request may choose from.
    pub fn new(store: &'a S, catalog: &'a QueryCatalog, locations: &'a [String]) -> Self {
        Self {
            store,
            catalog,
            locations,
        }
    }

    /// Validate, apply defaults, execute, and return the raw rows.
    pub fn resolve(&self, request: &ReportRequest) -> Result<Vec<ResultRow>> {
        let params = self.parameters(request)?;
        self.fetch(&params)
    }

    /// Execute the query for an already validated parameter set.
    pub fn fetch(&self, params: &ParameterSet) -> Result<Vec<ResultRow>> {
        match params {
            ParameterSet::Ranking(p) => RankingQuery::new(self.store, self.catalog).fetch(p),
            ParameterSet::TimeSeries(p) => {
                TimeSeriesQuery::new(self.store, self.catalog).fetch(p)
            }
            ParameterSet::Ratio(p) => RatioQuery::new(self.store, self.catalog).fetch(p),
            ParameterSet::Aggregate => AggregateQuery::new(self.store, self.catalog).fetch(),
        }
    }

    /// Coerce and validate the raw fields for the requested report.
    pub fn parameters(&self, request: &ReportRequest) -> Result<ParameterSet> {
        let raw = &request.raw_params;
        match request.report_id {
            ReportId::Ranking => self.ranking_params(raw).map(ParameterSet::Ranking),
            ReportId::TimeSeries => time_series_params(raw).map(ParameterSet::TimeSeries),
            ReportId::Ratio => ratio_params(raw).map(ParameterSet::Ratio),
            ReportId::Aggregate => Ok(ParameterSet::Aggregate),
        }
    }

    fn ranking_params(&self, raw: &RawParams) -> Result<RankingParams> {
        let requested = raw.get_all("locations");
        if requested.is_empty() {
            return Err(ReportError::Validation(
                "choose at least one location".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut locations = Vec::with_capacity(requested.len());
        for loc in requested {
            if !self.locations.iter().any(|known| known == loc) {
                return Err(ReportError::Validation(format!(
                    "location {:?} is not one of: {}",
                    loc,
                    self.locations.join(", ")
                )));
            }
            if seen.insert(loc) {
                locations.push(loc.to_string());
            }
        }

        Ok(RankingParams {
            locations,
            as_of_date: date_field(raw, "date", defaults::RANKING_DATE)?,
            metric: metric_field(raw, defaults::RANKING_METRIC)?,
        })
    }
}

fn time_series_params(raw: &RawParams) -> Result<TimeSeriesParams> {
    let location = raw
        .get("country")
        .unwrap_or(defaults::TIME_SERIES_LOCATION)
        .to_string();
    if location.chars().count() > MAX_LOCATION_LEN {
        return Err(ReportError::Validation(format!(
            "country must be at most {} characters",
            MAX_LOCATION_LEN
        )));
    }

    let start_date = date_field(raw, "start_date", defaults::TIME_SERIES_START)?;
    let end_date = date_field(raw, "end_date", defaults::TIME_SERIES_END)?;
    if start_date > end_date {
        return Err(ReportError::Validation(format!(
            "start_date {} is after end_date {}",
            start_date, end_date
        )));
    }

    Ok(TimeSeriesParams {
        location,
        start_date,
        end_date,
        metric: metric_field(raw, defaults::TIME_SERIES_METRIC)?,
    })
}

/// The continent is required; its date always comes from the region table.
fn ratio_params(raw: &RawParams) -> Result<RatioParams> {
    let key = raw
        .get("continent")
        .ok_or_else(|| ReportError::Validation("continent is required".to_string()))?;
    let continent: Continent = key.parse()?;
    Ok(RatioParams {
        continent,
        snapshot_date: continent.snapshot_date(),
    })
}

fn date_field(raw: &RawParams, name: &str, default: &str) -> Result<NaiveDate> {
    let text = raw.get(name).unwrap_or(default);
    parse_date(text).map_err(|_| {
        ReportError::Validation(format!("{} must be a YYYY-MM-DD date, got {:?}", name, text))
    })
}

fn metric_field(raw: &RawParams, default: Metric) -> Result<Metric> {
    raw.get("metric").map_or(Ok(default), str::parse)
}

pub(crate) fn parse_date(text: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
}
