//! Shared test fixtures for the epichart integration tests.
//!
//! Provides `setup_sample_db()` which writes a small COVID-19 style table to a
//! temporary DuckDB file, and `setup_engine()` which builds a `ReportEngine`
//! reading from it.

#![allow(dead_code)]

use std::path::PathBuf;

use epichart::{Dataset, ReportEngine};
use serde_json::{json, Value};

pub const TABLE: &str = "covid_data";

/// Create a DuckDB file holding the sample table.
///
/// Returns `(database path, TempDir)`. The caller must keep the `TempDir`
/// alive for the duration of the test so the file is not deleted prematurely.
pub fn setup_sample_db() -> (PathBuf, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("covid.duckdb");

    let dataset = Dataset::create(&path).unwrap();
    let count = dataset.import_rows(TABLE, &sample_rows()).unwrap();
    assert_eq!(count, sample_rows().len());
    // Close the writer so read-only connections can open the file.
    dataset.close().unwrap();

    (path, tmp_dir)
}

/// An engine over the sample database, without a query timeout.
pub fn setup_engine() -> (ReportEngine, tempfile::TempDir) {
    let (path, tmp_dir) = setup_sample_db();
    let engine = ReportEngine::builder()
        .database(&path)
        .table(TABLE)
        .query_timeout(None)
        .build()
        .unwrap();
    (engine, tmp_dir)
}

/// One record with every column present, so DuckDB infers the same schema
/// regardless of which values are null.
fn record(location: &str, date: &str, fields: Value) -> Value {
    let mut row = json!({
        "location": location,
        "date": date,
        "total_cases": null,
        "total_deaths": null,
        "new_cases": null,
        "new_deaths": null,
        "people_fully_vaccinated": null,
        "population": null,
        "life_expectancy": null,
        "hospital_beds_per_thousand": null
    });
    if let (Some(target), Some(src)) = (row.as_object_mut(), fields.as_object()) {
        for (k, v) in src {
            target.insert(k.clone(), v.clone());
        }
    }
    row
}

pub fn sample_rows() -> Vec<Value> {
    vec![
        // Africa: cases and deaths through October 2022, snapshot 2023-09-16.
        record("Africa", "2022-10-01", json!({"total_cases": 90.0, "total_deaths": 10.0, "new_cases": 3.0, "life_expectancy": 60.0, "hospital_beds_per_thousand": 1.0})),
        record("Africa", "2022-10-15", json!({"total_cases": 95.0, "total_deaths": 12.0, "new_cases": 5.0, "new_deaths": 2.0, "life_expectancy": 60.0, "hospital_beds_per_thousand": 1.0})),
        record("Africa", "2022-10-30", json!({"total_cases": 100.0, "total_deaths": 15.0, "new_cases": 5.0, "new_deaths": 3.0, "life_expectancy": 60.0, "hospital_beds_per_thousand": 1.0})),
        record("Africa", "2022-11-05", json!({"total_cases": 120.0, "total_deaths": 16.0, "new_cases": 20.0, "life_expectancy": 99.0, "hospital_beds_per_thousand": 0.0})),
        record("Africa", "2023-09-16", json!({"population": 1000.0, "people_fully_vaccinated": 300.0, "life_expectancy": 60.0, "hospital_beds_per_thousand": 1.0})),
        // Europe: last record before 2022-10-30 is on the 20th; never has beds.
        record("Europe", "2022-10-20", json!({"total_cases": 500.0, "total_deaths": 40.0, "hospital_beds_per_thousand": 0.0, "life_expectancy": 81.0})),
        record("Europe", "2022-10-31", json!({"total_cases": 600.0, "total_deaths": 41.0, "hospital_beds_per_thousand": 0.0, "life_expectancy": 81.0})),
        record("Europe", "2023-10-03", json!({"population": 2000.0, "people_fully_vaccinated": 1500.0, "hospital_beds_per_thousand": 0.0})),
        // Asia: ties Europe on cases; duplicated snapshot record.
        record("Asia", "2022-10-30", json!({"total_cases": 500.0, "total_deaths": 30.0, "life_expectancy": 70.0, "hospital_beds_per_thousand": 2.0})),
        record("Asia", "2023-10-04", json!({"population": 5000.0, "people_fully_vaccinated": 4000.0, "life_expectancy": 70.0, "hospital_beds_per_thousand": 2.0})),
        record("Asia", "2023-10-04", json!({"population": 5000.0, "people_fully_vaccinated": 4000.0, "life_expectancy": 70.0, "hospital_beds_per_thousand": 2.0})),
        // Oceania: the documented 800 / 200 split.
        record("Oceania", "2023-05-09", json!({"population": 1000.0, "people_fully_vaccinated": 800.0, "life_expectancy": 80.0, "hospital_beds_per_thousand": 3.0})),
        // North America: more vaccinated than people.
        record("North America", "2023-10-09", json!({"population": 100.0, "people_fully_vaccinated": 150.0, "life_expectancy": 75.0, "hospital_beds_per_thousand": 2.5})),
        // South America: no snapshot record, beds unknown.
        record("South America", "2022-10-30", json!({"total_cases": 250.0, "life_expectancy": 74.0})),
        // World: one record.
        record("World", "2022-10-30", json!({"total_cases": 1000.0, "total_deaths": 100.0, "life_expectancy": 72.0, "hospital_beds_per_thousand": 2.0})),
    ]
}
