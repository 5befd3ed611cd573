//! Population and fully vaccinated people for one continent on its snapshot
//! date.

use tracing::debug;

use crate::connection::Store;
use crate::error::{ReportError, Result};
use crate::models::{RatioParams, ResultRow};
use crate::queries::spec::{BindValues, QuerySpec};
use crate::queries::QueryCatalog;
use crate::sql_builder::SqlBuilder;

pub const LOCATION: &str = "location";
pub const SNAPSHOT_DATE: &str = "snapshot_date";

pub const TOTAL_COLUMN: &str = "population";
pub const PART_COLUMN: &str = "people_fully_vaccinated";

pub fn spec(table: &str) -> QuerySpec {
    SqlBuilder::new(table)
        .select(&[TOTAL_COLUMN, PART_COLUMN])
        .where_eq("location", LOCATION)
        .where_date_eq("date", SNAPSHOT_DATE)
        .build()
}

pub fn bind_values(params: &RatioParams) -> BindValues {
    BindValues::new()
        .one(LOCATION, params.continent.name())
        .one(SNAPSHOT_DATE, params.snapshot_date.to_string())
}

/// Fail unless exactly one row came back.
pub fn expect_single_row(rows: &[ResultRow], params: &RatioParams) -> Result<()> {
    if rows.len() == 1 {
        Ok(())
    } else {
        Err(ReportError::DataIntegrity(format!(
            "expected exactly one record for {} on {}, found {}",
            params.continent,
            params.snapshot_date,
            rows.len()
        )))
    }
}

pub struct RatioQuery<'a, S: Store + ?Sized> {
    store: &'a S,
    catalog: &'a QueryCatalog,
}

impl<'a, S: Store + ?Sized> RatioQuery<'a, S> {
    pub fn new(store: &'a S, catalog: &'a QueryCatalog) -> Self {
        Self { store, catalog }
    }

    /// The single `(population, people_fully_vaccinated)` row.
    pub fn fetch(&self, params: &RatioParams) -> Result<Vec<ResultRow>> {
        let bound = self.catalog.ratio().bind(&bind_values(params))?;
        debug!(continent = %params.continent, date = %params.snapshot_date, "ratio query");
        let rows = self.store.fetch(&bound)?;
        expect_single_row(&rows, params)?;
        Ok(rows)
    }
}
