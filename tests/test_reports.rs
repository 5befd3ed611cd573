//! End-to-end report tests against a DuckDB file built from the sample rows.

mod common;

use std::time::Duration;

use epichart::models::{ChartSeries, ParameterSet, RawParams, ReportId, ReportRequest};
use epichart::{series, ReportEngine, ReportError};

fn request(report: ReportId, pairs: &[(&str, &str)]) -> ReportRequest {
    ReportRequest::new(report, pairs.iter().copied().collect())
}

/// Resolve and transform without rendering, to inspect the series.
fn series_for(engine: &ReportEngine, req: &ReportRequest) -> epichart::Result<ChartSeries> {
    let rows = engine.resolver().resolve(req)?;
    series::transform(req.report_id, &rows)
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[test]
fn ranking_uses_latest_record_per_location() {
    let (engine, _tmp) = common::setup_engine();
    let out = series_for(
        &engine,
        &request(
            ReportId::Ranking,
            &[("locations[]", "Africa"), ("locations[]", "Europe")],
        ),
    )
    .unwrap();

    match out {
        ChartSeries::Categorical(bars) => {
            assert_eq!(bars.labels(), ["Europe", "Africa"]);
            assert_eq!(bars.values(), [500.0, 100.0]);
        }
        other => panic!("expected bars, got {:?}", other),
    }
}

#[test]
fn ranking_ties_are_ordered_by_location() {
    let (engine, _tmp) = common::setup_engine();
    let out = series_for(
        &engine,
        &request(
            ReportId::Ranking,
            &[
                ("locations[]", "Europe"),
                ("locations[]", "Africa"),
                ("locations[]", "Asia"),
            ],
        ),
    )
    .unwrap();
    match out {
        ChartSeries::Categorical(bars) => {
            assert_eq!(bars.labels(), ["Asia", "Europe", "Africa"]);
        }
        other => panic!("expected bars, got {:?}", other),
    }
}

#[test]
fn ranking_respects_as_of_date() {
    let (engine, _tmp) = common::setup_engine();
    let out = series_for(
        &engine,
        &request(
            ReportId::Ranking,
            &[("locations[]", "Europe"), ("date", "2022-10-31")],
        ),
    )
    .unwrap();
    match out {
        ChartSeries::Categorical(bars) => assert_eq!(bars.values(), [600.0]),
        other => panic!("expected bars, got {:?}", other),
    }
}

#[test]
fn ranking_renders_a_chart() {
    let (engine, _tmp) = common::setup_engine();
    let report = engine
        .render_report(&request(
            ReportId::Ranking,
            &[("locations[]", "Africa"), ("locations[]", "World")],
        ))
        .unwrap()
        .unwrap();
    assert_eq!(report.report, ReportId::Ranking);
    assert!(report.data_uri().starts_with("data:image/png;base64,"));
    assert!(report.labels.title.contains("2022-10-30"));
    assert_eq!(report.total, None);
}

#[test]
fn ranking_with_no_records_is_a_render_error() {
    let (engine, _tmp) = common::setup_engine();
    let err = engine
        .render_report(&request(
            ReportId::Ranking,
            &[("locations[]", "Africa"), ("date", "2020-01-01")],
        ))
        .unwrap_err();
    assert!(matches!(err, ReportError::Render(_)));
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

#[test]
fn time_series_defaults_to_african_deaths_in_october() {
    let (engine, _tmp) = common::setup_engine();
    let req = request(ReportId::TimeSeries, &[("metric", "total_deaths")]);
    match series_for(&engine, &req).unwrap() {
        ChartSeries::TimeSeries(ts) => {
            let values: Vec<f64> = ts.points.iter().map(|p| p.1).collect();
            assert_eq!(values, vec![10.0, 12.0, 15.0]);
            assert_eq!(ts.points[0].0.to_string(), "2022-10-01");
        }
        other => panic!("expected a time series, got {:?}", other),
    }

    let report = engine.render_report(&req).unwrap().unwrap();
    assert_eq!(report.labels.series.as_deref(), Some("Total deaths"));
}

#[test]
fn time_series_range_is_inclusive() {
    let (engine, _tmp) = common::setup_engine();
    let req = request(
        ReportId::TimeSeries,
        &[
            ("country", "Africa"),
            ("start_date", "2022-10-15"),
            ("end_date", "2022-10-15"),
            ("metric", "total_cases"),
        ],
    );
    match series_for(&engine, &req).unwrap() {
        ChartSeries::TimeSeries(ts) => assert_eq!(ts.points.len(), 1),
        other => panic!("expected a time series, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Ratio
// ---------------------------------------------------------------------------

#[test]
fn ratio_for_oceania() {
    let (engine, _tmp) = common::setup_engine();
    let req = request(ReportId::Ratio, &[("continent", "Oceania")]);
    match series_for(&engine, &req).unwrap() {
        ChartSeries::Ratio(r) => {
            assert_eq!(r.slice_values, (800.0, 200.0));
            assert_eq!(r.slice_labels.0, series::VACCINATED);
        }
        other => panic!("expected a ratio, got {:?}", other),
    }

    let report = engine.render_report(&req).unwrap().unwrap();
    assert_eq!(report.total, Some(1000.0));
    assert!(report.labels.title.contains("Oceania"));
    assert!(matches!(report.parameters, ParameterSet::Ratio(_)));
}

#[test]
fn ratio_data_problems_are_integrity_errors() {
    let (engine, _tmp) = common::setup_engine();
    // Duplicated snapshot, more vaccinated than people, no snapshot at all.
    for continent in ["Asia", "North America", "South America"] {
        let err = engine
            .render_report(&request(ReportId::Ratio, &[("continent", continent)]))
            .unwrap_err();
        assert!(
            matches!(err, ReportError::DataIntegrity(_)),
            "{}: {:?}",
            continent,
            err
        );
    }
}

#[test]
fn ratio_unknown_continent_is_rejected() {
    let (engine, _tmp) = common::setup_engine();
    let err = engine
        .render_report(&request(ReportId::Ratio, &[("continent", "Atlantis")]))
        .unwrap_err();
    assert!(matches!(err, ReportError::UnresolvedParameter { .. }));
    assert!(err.is_rejection());
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

#[test]
fn aggregate_excludes_zero_bed_records() {
    let (engine, _tmp) = common::setup_engine();
    let req = ReportRequest::form(ReportId::Aggregate);
    match series_for(&engine, &req).unwrap() {
        ChartSeries::ScatterSet(s) => {
            assert_eq!(
                s.points,
                vec![(60.0, 1.0), (70.0, 2.0), (75.0, 2.5), (80.0, 3.0), (72.0, 2.0)]
            );
        }
        other => panic!("expected a scatter set, got {:?}", other),
    }
}

#[test]
fn aggregate_renders_without_input() {
    let (engine, _tmp) = common::setup_engine();
    let report = engine
        .render_report(&ReportRequest::form(ReportId::Aggregate))
        .unwrap();
    assert!(report.is_some());
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[test]
fn reports_with_input_show_the_form_first() {
    let (engine, _tmp) = common::setup_engine();
    for id in [ReportId::Ranking, ReportId::TimeSeries, ReportId::Ratio] {
        assert!(engine.render_report(&ReportRequest::form(id)).unwrap().is_none());
    }
}

#[test]
fn rendering_twice_gives_identical_images() {
    let (engine, _tmp) = common::setup_engine();
    let req = request(ReportId::Ratio, &[("continent", "Europe")]);
    let a = engine.render_report(&req).unwrap().unwrap();
    let b = engine.render_report(&req).unwrap().unwrap();
    assert_eq!(a.image_base64, b.image_base64);
}

#[test]
fn engine_with_query_timeout() {
    let (path, _tmp) = common::setup_sample_db();
    let engine = ReportEngine::builder()
        .database(&path)
        .query_timeout(Some(Duration::from_secs(20)))
        .build()
        .unwrap();
    let mut raw = RawParams::new();
    raw.insert("locations[]", "World");
    let report = engine
        .render_report(&ReportRequest::new(ReportId::Ranking, raw))
        .unwrap();
    assert!(report.is_some());
}

#[test]
fn zero_query_timeout_waits_indefinitely() {
    let (path, _tmp) = common::setup_sample_db();
    let timeout_of = |timeout| {
        ReportEngine::builder()
            .database(&path)
            .query_timeout(timeout)
            .build()
            .unwrap()
            .config()
            .store
            .query_timeout()
    };

    assert_eq!(timeout_of(Some(Duration::ZERO)), None);
    assert_eq!(timeout_of(None), None);
    assert_eq!(
        timeout_of(Some(Duration::from_millis(1500))),
        Some(Duration::from_secs(2))
    );
    assert_eq!(
        timeout_of(Some(Duration::from_secs(3))),
        Some(Duration::from_secs(3))
    );
}

#[test]
fn engine_rejects_non_identifier_table() {
    let err = ReportEngine::builder()
        .table("covid_data; DROP TABLE x")
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, ReportError::Validation(_)));
}

#[test]
fn ranking_locations_are_configurable() {
    let (path, _tmp) = common::setup_sample_db();
    let engine = ReportEngine::builder()
        .database(&path)
        .locations(["Africa"])
        .build()
        .unwrap();
    let err = engine
        .render_report(&request(ReportId::Ranking, &[("locations[]", "Europe")]))
        .unwrap_err();
    assert!(err.is_rejection());
    assert!(engine.to_string().contains("locations=[Africa]"));
}
