//! One metric for one location over an inclusive date range.

use tracing::debug;

use crate::connection::Store;
use crate::error::Result;
use crate::models::{Metric, ResultRow, TimeSeriesParams};
use crate::queries::spec::{BindValues, QuerySpec};
use crate::queries::QueryCatalog;
use crate::sql_builder::SqlBuilder;

pub const LOCATION: &str = "location";
pub const START_DATE: &str = "start_date";
pub const END_DATE: &str = "end_date";

pub fn spec(table: &str, metric: Metric) -> QuerySpec {
    SqlBuilder::new(table)
        .select(&["CAST(date AS DATE) AS date", metric.column()])
        .where_eq("location", LOCATION)
        .where_date_between("date", START_DATE, END_DATE)
        .order_by(&["CAST(date AS DATE) ASC"])
        .build()
}

pub fn bind_values(params: &TimeSeriesParams) -> BindValues {
    BindValues::new()
        .one(LOCATION, params.location.clone())
        .one(START_DATE, params.start_date.to_string())
        .one(END_DATE, params.end_date.to_string())
}

pub struct TimeSeriesQuery<'a, S: Store + ?Sized> {
    store: &'a S,
    catalog: &'a QueryCatalog,
}

impl<'a, S: Store + ?Sized> TimeSeriesQuery<'a, S> {
    pub fn new(store: &'a S, catalog: &'a QueryCatalog) -> Self {
        Self { store, catalog }
    }

    /// Rows of `(date, <metric>)` in ascending date order.
    pub fn fetch(&self, params: &TimeSeriesParams) -> Result<Vec<ResultRow>> {
        let bound = self
            .catalog
            .time_series(params.metric)
            .bind(&bind_values(params))?;
        debug!(
            metric = %params.metric,
            location = %params.location,
            from = %params.start_date,
            to = %params.end_date,
            "time series query"
        );
        self.store.fetch(&bound)
    }
}
