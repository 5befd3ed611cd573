//! Latest-snapshot ranking: per location, the most recent record at or before
//! a date, ranked by a metric.

use tracing::debug;

use crate::connection::Store;
use crate::error::Result;
use crate::models::{Metric, RankingParams, ResultRow};
use crate::queries::spec::{BindValues, QuerySpec};
use crate::queries::QueryCatalog;
use crate::sql_builder::SqlBuilder;

pub const AS_OF_DATE: &str = "as_of_date";
pub const LOCATIONS: &str = "locations";

/// Template for one metric. Ties on the metric fall back to location name.
pub fn spec(table: &str, metric: Metric) -> QuerySpec {
    let latest = SqlBuilder::new(table)
        .select(&["location", "MAX(CAST(date AS DATE)) AS latest_date"])
        .where_date_lte("date", AS_OF_DATE)
        .where_in("location", LOCATIONS)
        .group_by(&["location"])
        .build();

    let col = metric.column();
    SqlBuilder::new("latest_dates ld")
        .with("latest_dates", latest)
        .select(&["ld.location AS location", &format!("t.{} AS {}", col, col)])
        .join(&format!(
            "JOIN {} t ON ld.location = t.location AND ld.latest_date = CAST(t.date AS DATE)",
            table
        ))
        .order_by(&[&format!("{} DESC NULLS LAST", col), "location ASC"])
        .build()
}

pub fn bind_values(params: &RankingParams) -> BindValues {
    BindValues::new()
        .one(AS_OF_DATE, params.as_of_date.to_string())
        .many(LOCATIONS, params.locations.iter().cloned())
}

// ---------------------------------------------------------------------------
// RankingQuery
// ---------------------------------------------------------------------------

pub struct RankingQuery<'a, S: Store + ?Sized> {
    store: &'a S,
    catalog: &'a QueryCatalog,
}

impl<'a, S: Store + ?Sized> RankingQuery<'a, S> {
    pub fn new(store: &'a S, catalog: &'a QueryCatalog) -> Self {
        Self { store, catalog }
    }

    /// Rows of `(location, <metric>)`, metric descending.
    pub fn fetch(&self, params: &RankingParams) -> Result<Vec<ResultRow>> {
        let bound = self
            .catalog
            .ranking(params.metric)
            .bind(&bind_values(params))?;
        debug!(
            metric = %params.metric,
            locations = params.locations.len(),
            as_of = %params.as_of_date,
            "ranking query"
        );
        self.store.fetch(&bound)
    }
}
