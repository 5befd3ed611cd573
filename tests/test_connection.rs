//! Connection integration tests: read-only acquisition, positional binding,
//! release on every exit path.

mod common;

use std::time::{Duration, Instant};

use epichart::config::StoreConfig;
use epichart::queries::BoundQuery;
use epichart::{ConnectionProvider, ReportError, Store};

fn provider(path: &std::path::Path, timeout_secs: Option<u64>) -> ConnectionProvider {
    ConnectionProvider::new(StoreConfig {
        database: path.to_path_buf(),
        table: common::TABLE.to_string(),
        query_timeout_secs: timeout_secs,
    })
}

// ---------------------------------------------------------------------------
// query
// ---------------------------------------------------------------------------

#[test]
fn query_returns_rows_in_select_order() {
    let (path, _tmp) = common::setup_sample_db();
    let conn = provider(&path, None).acquire().unwrap();

    let rows = conn
        .query(&BoundQuery::unbound(
            "SELECT location, CAST(date AS DATE) AS date FROM covid_data \
             WHERE location = 'Africa' ORDER BY date",
        ))
        .unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["location"], "Africa");
    assert_eq!(rows[0]["date"], "2022-10-01");
    assert_eq!(rows[4]["date"], "2023-09-16");
    assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["location", "date"]);

    conn.release();
}

#[test]
fn query_binds_values_positionally() {
    let (path, _tmp) = common::setup_sample_db();
    let conn = provider(&path, None).acquire().unwrap();

    let rows = conn
        .query(&BoundQuery {
            sql: "SELECT total_cases FROM covid_data \
                  WHERE location = ? AND CAST(date AS DATE) = CAST(? AS DATE)"
                .to_string(),
            values: vec!["Europe".to_string(), "2022-10-20".to_string()],
        })
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["total_cases"].as_f64(), Some(500.0));
}

#[test]
fn bound_values_are_never_sql() {
    let (path, _tmp) = common::setup_sample_db();
    let conn = provider(&path, None).acquire().unwrap();

    let rows = conn
        .query(&BoundQuery {
            sql: "SELECT location FROM covid_data WHERE location = ?".to_string(),
            values: vec!["Africa' OR '1'='1".to_string()],
        })
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn nulls_come_back_as_null() {
    let (path, _tmp) = common::setup_sample_db();
    let conn = provider(&path, None).acquire().unwrap();

    let rows = conn
        .query(&BoundQuery {
            sql: "SELECT population FROM covid_data \
                  WHERE location = ? AND CAST(date AS DATE) = CAST(? AS DATE)"
                .to_string(),
            values: vec!["Africa".to_string(), "2022-10-30".to_string()],
        })
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0]["population"].is_null());
}

#[test]
fn decimal_and_timestamp_columns_keep_their_values() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("typed.duckdb");
    let setup = duckdb::Connection::open(&path).unwrap();
    setup
        .execute_batch(
            "CREATE TABLE covid_data AS SELECT \
               'Oceania' AS location, \
               TIMESTAMP '2023-05-09 10:30:00' AS date, \
               CAST(123.45 AS DECIMAL(18,2)) AS population",
        )
        .unwrap();
    setup.close().unwrap();

    let rows = provider(&path, None)
        .fetch(&BoundQuery::unbound("SELECT date, population FROM covid_data"))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["date"], "2023-05-09");
    assert_eq!(rows[0]["population"].as_f64(), Some(123.45));
}

// ---------------------------------------------------------------------------
// Read-only access
// ---------------------------------------------------------------------------

#[test]
fn connections_are_read_only() {
    let (path, _tmp) = common::setup_sample_db();
    let conn = provider(&path, None).acquire().unwrap();

    let err = conn
        .query(&BoundQuery::unbound("DELETE FROM covid_data"))
        .unwrap_err();
    assert!(matches!(err, ReportError::Store(_)));
}

#[test]
fn missing_database_is_a_store_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = provider(&tmp.path().join("absent.duckdb"), None)
        .acquire()
        .err()
        .unwrap();
    assert!(matches!(err, ReportError::Store(_)));
    assert!(!err.is_rejection());
}

// ---------------------------------------------------------------------------
// with_connection / Store
// ---------------------------------------------------------------------------

#[test]
fn with_connection_releases_after_failure() {
    let (path, _tmp) = common::setup_sample_db();
    let provider = provider(&path, None);

    let err = provider
        .with_connection(|conn| conn.query(&BoundQuery::unbound("SELECT * FROM no_such_table")))
        .unwrap_err();
    assert!(matches!(err, ReportError::Store(_)));

    // Later requests are unaffected.
    let rows = provider
        .with_connection(|conn| conn.query(&BoundQuery::unbound("SELECT 1 AS one")))
        .unwrap();
    assert_eq!(rows[0]["one"], 1);
}

#[test]
fn store_fetch_without_timeout() {
    let (path, _tmp) = common::setup_sample_db();
    let rows = provider(&path, None)
        .fetch(&BoundQuery::unbound("SELECT COUNT(*) AS n FROM covid_data"))
        .unwrap();
    assert_eq!(rows[0]["n"], common::sample_rows().len() as i64);
}

#[test]
fn store_fetch_with_timeout() {
    let (path, _tmp) = common::setup_sample_db();
    let provider = provider(&path, Some(10));
    assert_eq!(provider.config().query_timeout(), Some(Duration::from_secs(10)));

    let rows = provider
        .fetch(&BoundQuery::unbound(
            "SELECT DISTINCT location FROM covid_data ORDER BY location",
        ))
        .unwrap();
    assert_eq!(rows.len(), 7);
    assert_eq!(rows[0]["location"], "Africa");
    assert_eq!(rows[6]["location"], "World");
}

#[test]
fn slow_query_times_out_and_releases_its_connection() {
    let (path, _tmp) = common::setup_sample_db();
    let provider = provider(&path, Some(1));

    let started = Instant::now();
    let err = provider
        .fetch(&BoundQuery::unbound(
            "SELECT SUM(a.range + b.range) AS s \
             FROM range(100000000) a, range(100000000) b",
        ))
        .unwrap_err();
    assert!(matches!(err, ReportError::StoreTimeout(d) if d == Duration::from_secs(1)));
    assert!(!err.is_rejection());
    assert!(started.elapsed() < Duration::from_secs(5));

    // The interrupted worker closes its connection shortly after.
    let deadline = Instant::now() + Duration::from_secs(10);
    while provider.open_connections() > 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(provider.open_connections(), 0);

    let rows = provider
        .fetch(&BoundQuery::unbound("SELECT COUNT(*) AS n FROM covid_data"))
        .unwrap();
    assert_eq!(rows[0]["n"], common::sample_rows().len() as i64);
}

#[test]
fn released_connections_are_no_longer_counted() {
    let (path, _tmp) = common::setup_sample_db();
    let provider = provider(&path, None);

    let first = provider.acquire().unwrap();
    let second = provider.clone().acquire().unwrap();
    assert_eq!(provider.open_connections(), 2);

    first.release();
    assert_eq!(provider.open_connections(), 1);
    drop(second);
    assert_eq!(provider.open_connections(), 0);
}

#[test]
fn concurrent_requests_get_their_own_connections() {
    let (path, _tmp) = common::setup_sample_db();
    let provider = provider(&path, None);

    std::thread::scope(|s| {
        let handles: Vec<_> = ["Africa", "Europe", "Asia", "Oceania"]
            .into_iter()
            .map(|loc| {
                let provider = &provider;
                s.spawn(move || {
                    provider
                        .fetch(&BoundQuery {
                            sql: "SELECT location FROM covid_data WHERE location = ?".to_string(),
                            values: vec![loc.to_string()],
                        })
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert!(!handle.join().unwrap().is_empty());
        }
    });
}
