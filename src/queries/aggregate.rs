//! Per-location means of life expectancy and hospital beds.

use tracing::debug;

use crate::connection::Store;
use crate::error::Result;
use crate::models::ResultRow;
use crate::queries::spec::{BindValues, QuerySpec};
use crate::queries::QueryCatalog;
use crate::sql_builder::SqlBuilder;

pub const X_COLUMN: &str = "avg_life_expectancy";
pub const Y_COLUMN: &str = "avg_beds_per_thousand";

/// Records with zero beds are left out of both means.
pub fn spec(table: &str) -> QuerySpec {
    SqlBuilder::new(table)
        .select(&[
            "location",
            "CAST(AVG(life_expectancy) AS DOUBLE) AS avg_life_expectancy",
            "CAST(AVG(hospital_beds_per_thousand) AS DOUBLE) AS avg_beds_per_thousand",
        ])
        .where_literal("hospital_beds_per_thousand <> 0")
        .group_by(&["location"])
        .order_by(&["location ASC"])
        .build()
}

pub struct AggregateQuery<'a, S: Store + ?Sized> {
    store: &'a S,
    catalog: &'a QueryCatalog,
}

impl<'a, S: Store + ?Sized> AggregateQuery<'a, S> {
    pub fn new(store: &'a S, catalog: &'a QueryCatalog) -> Self {
        Self { store, catalog }
    }

    pub fn fetch(&self) -> Result<Vec<ResultRow>> {
        let bound = self.catalog.aggregate().bind(&BindValues::new())?;
        debug!("aggregate query");
        self.store.fetch(&bound)
    }
}
