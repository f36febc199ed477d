//! Property tests for the compounding walk.

use approx::assert_relative_eq;
use leverage_sim::{run_simulation, DailyRecord, PriceSeries, SimulationRequest};
use proptest::prelude::*;

fn record(day: u64, open: f64, close: f64) -> DailyRecord {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let date = (base + chrono::Days::new(day)).format("%Y-%m-%d").to_string();
    DailyRecord {
        date,
        open,
        high: open.max(close),
        low: open.min(close),
        close,
    }
}

/// Series of 1-60 rows where roughly one row in seven is invalid (zero open).
fn arb_series() -> impl Strategy<Value = PriceSeries> {
    prop::collection::vec(
        (1.0f64..500.0, 1.0f64..500.0, prop::bool::weighted(0.85)),
        1..60,
    )
    .prop_map(|rows| {
        PriceSeries::new(
            rows.into_iter()
                .enumerate()
                .map(|(i, (open, close, valid))| {
                    let open = if valid { open } else { 0.0 };
                    record(i as u64, open, close)
                })
                .collect(),
        )
    })
}

fn arb_series_and_start() -> impl Strategy<Value = (PriceSeries, usize)> {
    arb_series().prop_flat_map(|series| {
        let len = series.len();
        (Just(series), 0..len)
    })
}

/// All-valid series plus an interior split index.
fn arb_valid_series_and_split() -> impl Strategy<Value = (PriceSeries, usize)> {
    prop::collection::vec((1.0f64..500.0, 1.0f64..500.0), 2..40).prop_flat_map(|rows| {
        let len = rows.len();
        let series = PriceSeries::new(
            rows.into_iter()
                .enumerate()
                .map(|(i, (open, close))| record(i as u64, open, close))
                .collect(),
        );
        (Just(series), 1..len)
    })
}

fn request(start_index: usize, leverage_factor: f64) -> SimulationRequest {
    SimulationRequest {
        start_index,
        leverage_factor,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn result_length_matches_range(
        (series, start) in arb_series_and_start(),
        leverage in -3.0f64..5.0,
    ) {
        let result = run_simulation(&series, &request(start, leverage)).unwrap();
        prop_assert_eq!(result.leveraged.len(), series.len() - start);
        prop_assert_eq!(
            result.unleveraged.as_ref().map(|points| points.len()),
            Some(series.len() - start)
        );
    }

    #[test]
    fn output_is_always_finite(
        (series, start) in arb_series_and_start(),
        leverage in -10.0f64..10.0,
    ) {
        let result = run_simulation(&series, &request(start, leverage)).unwrap();
        for point in &result.leveraged {
            prop_assert!(point.value.is_finite());
        }
        for point in result.unleveraged.as_deref().unwrap_or(&[]) {
            prop_assert!(point.value.is_finite());
        }
        prop_assert!(result.metrics.total_return.is_finite());
        prop_assert!(result.metrics.max_drawdown.is_finite());
        prop_assert!(result.metrics.volatility.is_finite());
    }

    #[test]
    fn runs_are_deterministic(
        (series, start) in arb_series_and_start(),
        leverage in -3.0f64..5.0,
    ) {
        let a = run_simulation(&series, &request(start, leverage)).unwrap();
        let b = run_simulation(&series, &request(start, leverage)).unwrap();
        prop_assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::to_value(&b).unwrap()
        );
    }

    #[test]
    fn invalid_rows_do_not_change_the_final_value(
        series in arb_series(),
        leverage in -3.0f64..5.0,
    ) {
        let filtered = PriceSeries::new(
            series.records().iter().filter(|r| r.is_valid()).cloned().collect(),
        );
        prop_assume!(!filtered.is_empty());

        let a = run_simulation(&series, &request(0, leverage)).unwrap();
        let b = run_simulation(&filtered, &request(0, leverage)).unwrap();
        prop_assert_eq!(
            a.leveraged.last().unwrap().value,
            b.leveraged.last().unwrap().value
        );
        prop_assert_eq!(a.skipped_days as usize, series.len() - filtered.len());
    }

    #[test]
    fn unit_leverage_reproduces_baseline((series, start) in arb_series_and_start()) {
        let result = run_simulation(&series, &request(start, 1.0)).unwrap();
        let unleveraged = result.unleveraged.unwrap();
        for (l, u) in result.leveraged.iter().zip(unleveraged.iter()) {
            prop_assert_eq!(l.value, u.value);
        }
    }

    #[test]
    fn compounding_composes_across_a_split(
        (series, split) in arb_valid_series_and_split(),
        leverage in -2.0f64..4.0,
    ) {
        let full = run_simulation(&series, &request(0, leverage)).unwrap();
        let tail = run_simulation(&series, &request(split, leverage)).unwrap();

        let prefix = full.leveraged[split - 1].value;
        let tail_final = tail.leveraged.last().unwrap().value;
        let full_final = full.leveraged.last().unwrap().value;

        assert_relative_eq!(full_final, prefix * tail_final, max_relative = 1e-9);
    }
}
