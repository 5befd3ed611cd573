//! The query catalog: four fixed templates, built once per engine and shared
//! read-only by every request.
//!
//! Each module provides the template for one report, the mapping from its
//! validated parameters to bind values, and a query struct that borrows a
//! [`Store`](crate::connection::Store) and the catalog.

pub mod aggregate;
pub mod ranking;
pub mod ratio;
pub mod spec;
pub mod time_series;

pub use aggregate::AggregateQuery;
pub use ranking::RankingQuery;
pub use ratio::RatioQuery;
pub use spec::{Arity, BindSlot, BindValue, BindValues, BoundQuery, QuerySpec};
pub use time_series::TimeSeriesQuery;

use crate::error::{ReportError, Result};
use crate::models::{Metric, ParameterSet};

/// All templates for one dataset table.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    table: String,
    /// Indexed by [`Metric::index`].
    ranking: Vec<QuerySpec>,
    time_series: Vec<QuerySpec>,
    ratio: QuerySpec,
    aggregate: QuerySpec,
}

impl QueryCatalog {
    /// Build every template for `table`.
    ///
    /// The table name is the only configured text placed in SQL, so it must
    /// be a plain identifier.
    pub fn new(table: &str) -> Result<Self> {
        validate_identifier(table)?;
        Ok(Self {
            table: table.to_string(),
            ranking: Metric::ALL.iter().map(|m| ranking::spec(table, *m)).collect(),
            time_series: Metric::ALL
                .iter()
                .map(|m| time_series::spec(table, *m))
                .collect(),
            ratio: ratio::spec(table),
            aggregate: aggregate::spec(table),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn ranking(&self, metric: Metric) -> &QuerySpec {
        &self.ranking[metric.index()]
    }

    pub fn time_series(&self, metric: Metric) -> &QuerySpec {
        &self.time_series[metric.index()]
    }

    pub fn ratio(&self) -> &QuerySpec {
        &self.ratio
    }

    pub fn aggregate(&self) -> &QuerySpec {
        &self.aggregate
    }

    /// Bind the template matching a validated parameter set.
    pub fn bind(&self, params: &ParameterSet) -> Result<BoundQuery> {
        match params {
            ParameterSet::Ranking(p) => self.ranking(p.metric).bind(&ranking::bind_values(p)),
            ParameterSet::TimeSeries(p) => self
                .time_series(p.metric)
                .bind(&time_series::bind_values(p)),
            ParameterSet::Ratio(p) => self.ratio.bind(&ratio::bind_values(p)),
            ParameterSet::Aggregate => self.aggregate.bind(&BindValues::new()),
        }
    }
}

pub(crate) fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ReportError::Validation(format!(
            "table name {:?} is not a plain SQL identifier",
            name
        )))
    }
}
