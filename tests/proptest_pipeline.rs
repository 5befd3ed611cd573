//! Property tests for the pure parts of the pipeline: binding, ordering and
//! the ratio split.

use chrono::NaiveDate;
use epichart::config::default_locations;
use epichart::models::{Metric, ParameterSet, RankingParams, ReportId, ReportRequest, ResultRow};
use epichart::queries::BoundQuery;
use epichart::{series, QueryCatalog, ReportError, ReportResolver, Result, Store};
use proptest::prelude::*;
use proptest::test_runner::Config;

/// A store that is never supposed to be reached.
struct Unreachable;

impl Store for Unreachable {
    fn fetch(&self, _query: &BoundQuery) -> Result<Vec<ResultRow>> {
        Ok(Vec::new())
    }
}

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Duration::days(offset)
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn bound_values_never_change_sql(
        locations in prop::collection::vec("[ -~]{1,24}", 1..6),
        offset in 0_i64..2_000,
    ) {
        let catalog = QueryCatalog::new("covid_data").unwrap();
        let hostile = ParameterSet::Ranking(RankingParams {
            locations: locations.clone(),
            as_of_date: day(offset),
            metric: Metric::TotalCases,
        });
        let benign = ParameterSet::Ranking(RankingParams {
            locations: vec!["x".to_string(); locations.len()],
            as_of_date: day(0),
            metric: Metric::TotalCases,
        });

        let a = catalog.bind(&hostile).unwrap();
        let b = catalog.bind(&benign).unwrap();
        prop_assert_eq!(&a.sql, &b.sql);
        prop_assert_eq!(a.values.len(), locations.len() + 1);
        prop_assert_eq!(&a.values[1..], &locations[..]);
        prop_assert_eq!(a.sql.matches('?').count(), a.values.len());
    }

    #[test]
    fn ranking_output_is_sorted_and_complete(
        values in prop::collection::vec(-1.0e9_f64..1.0e9, 0..20),
    ) {
        let rows: Vec<ResultRow> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                ResultRow::new()
                    .with("location", format!("L{i}"))
                    .with("total_cases", *v)
            })
            .collect();
        let bars = series::ranking(&rows).unwrap();

        prop_assert_eq!(bars.len(), values.len());
        prop_assert!(bars.values().windows(2).all(|w| w[0] >= w[1]));
        let mut expected = values.clone();
        expected.sort_by(|a, b| b.total_cmp(a));
        prop_assert_eq!(bars.values(), &expected[..]);
    }

    #[test]
    fn ratio_slices_sum_to_total(total in 0.0_f64..1.0e10, share in 0.0_f64..=1.0) {
        let part = total * share;
        let ratio = series::split(total, part).unwrap();
        let (a, b) = ratio.slice_values;
        prop_assert!(a >= 0.0 && b >= 0.0);
        prop_assert!((a + b - total).abs() <= total * 1e-9 + 1e-9);
    }

    #[test]
    fn ratio_rejects_part_above_total(total in 0.0_f64..1.0e6, excess in 1.0_f64..1.0e6) {
        let err = series::split(total, total + excess).unwrap_err();
        prop_assert!(matches!(err, ReportError::DataIntegrity(_)));
    }

    #[test]
    fn scatter_never_keeps_zero_beds(
        points in prop::collection::vec((40.0_f64..90.0, prop_oneof![Just(0.0_f64), 0.1_f64..10.0]), 0..20),
    ) {
        let rows: Vec<ResultRow> = points
            .iter()
            .map(|(x, y)| {
                ResultRow::new()
                    .with("location", "L")
                    .with("avg_life_expectancy", *x)
                    .with("avg_beds_per_thousand", *y)
            })
            .collect();
        let out = series::scatter(&rows).unwrap();
        prop_assert!(out.points.iter().all(|p| p.1 != 0.0));
        prop_assert_eq!(out.points.len(), points.iter().filter(|p| p.1 != 0.0).count());
    }

    #[test]
    fn date_range_order_is_enforced(start in 0_i64..1_000, end in 0_i64..1_000) {
        let catalog = QueryCatalog::new("covid_data").unwrap();
        let locations = default_locations();
        let resolver = ReportResolver::new(&Unreachable, &catalog, &locations);

        let start_text = day(start).to_string();
        let end_text = day(end).to_string();
        let raw = [("start_date", start_text.as_str()), ("end_date", end_text.as_str())]
            .into_iter()
            .collect();
        let result = resolver.parameters(&ReportRequest::new(ReportId::TimeSeries, raw));

        if start <= end {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(ReportError::Validation(_))));
        }
    }
}
