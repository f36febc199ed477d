// src/engine.rs
// Leverage compounding engine - the core simulation walk

use crate::error::SimulationError;
use crate::metrics::summarize;
use crate::series::PriceSeries;
use crate::types::{
    Baseline, SimulationPoint, SimulationRequest, SimulationResponse, SimulationWarning,
    SweepPoint, SweepRequest, SweepResponse,
};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

fn check_range(series: &PriceSeries, start_index: usize) -> Result<(), SimulationError> {
    if series.is_empty() {
        return Err(SimulationError::EmptySeries);
    }
    if start_index >= series.len() {
        return Err(SimulationError::StartIndexOutOfRange {
            index: start_index,
            len: series.len(),
        });
    }
    Ok(())
}

/// Starting value for both curves under the chosen baseline.
/// `OpenPrice` falls back to 1.0 when no day in range is valid.
fn resolve_initial_value(series: &PriceSeries, start_index: usize, baseline: Baseline) -> f64 {
    match baseline {
        Baseline::Normalized => 1.0,
        Baseline::OpenPrice => series.records()[start_index..]
            .iter()
            .find(|r| r.is_valid())
            .map(|r| r.open)
            .unwrap_or(1.0),
    }
}

/// Run the compounding walk from `start_index` to the end of the series.
///
/// Each valid day multiplies the leveraged value by `1 + r * leverageFactor`
/// and the unleveraged value by `1 + r`, where `r = (close - open) / open`.
/// Invalid days carry both values forward unchanged. Whenever either value
/// turns non-finite, both are reset to the initial value and the reset is
/// reported in the response; the output therefore never contains NaN or
/// infinity. Only an empty series or an out-of-range start index is an error.
pub fn run_simulation(
    series: &PriceSeries,
    request: &SimulationRequest,
) -> Result<SimulationResponse, SimulationError> {
    check_range(series, request.start_index)?;

    let initial = resolve_initial_value(series, request.start_index, request.baseline);
    let leverage = request.leverage_factor;
    let records = series.records();
    let days = records.len() - request.start_index;

    let mut leveraged = Vec::with_capacity(days);
    let mut unleveraged = if request.include_baseline {
        Some(Vec::with_capacity(days))
    } else {
        None
    };
    let mut leveraged_returns = Vec::with_capacity(days);
    let mut dates = Vec::with_capacity(days);
    let mut warnings = Vec::new();

    let mut leveraged_value = initial;
    let mut unleveraged_value = initial;
    let mut skipped_days = 0u32;
    let mut corruption_resets = 0u32;

    for i in request.start_index..records.len() {
        let record = &records[i];

        match record.daily_return() {
            Some(r) => {
                leveraged_value *= 1.0 + r * leverage;
                unleveraged_value *= 1.0 + r;
                leveraged_returns.push(r * leverage);
            }
            None => {
                skipped_days += 1;
                leveraged_returns.push(0.0);
                tracing::debug!("skipping invalid row {} ({})", i, record.date);
            }
        }

        if !leveraged_value.is_finite() || !unleveraged_value.is_finite() {
            corruption_resets += 1;
            warnings.push(SimulationWarning {
                index: i,
                date: record.date.clone(),
                message: format!("non-finite value on {}, reset to {}", record.date, initial),
            });
            tracing::warn!(
                "non-finite value at row {} ({}), resetting both curves to {}",
                i,
                record.date,
                initial
            );
            leveraged_value = initial;
            unleveraged_value = initial;
            // The day's return was undone by the reset; annul it for metrics
            if let Some(last) = leveraged_returns.last_mut() {
                *last = 0.0;
            }
        }

        leveraged.push(SimulationPoint {
            date: record.date.clone(),
            value: leveraged_value,
        });
        if let Some(points) = unleveraged.as_mut() {
            points.push(SimulationPoint {
                date: record.date.clone(),
                value: unleveraged_value,
            });
        }
        dates.push(record.date.clone());
    }

    let values: Vec<f64> = leveraged.iter().map(|p| p.value).collect();
    let metrics = summarize(
        &values,
        &leveraged_returns,
        &dates,
        initial,
        TRADING_DAYS_PER_YEAR,
    );

    Ok(SimulationResponse {
        leveraged,
        unleveraged,
        metrics,
        skipped_days,
        corruption_resets,
        warnings,
    })
}

/// Final leveraged value of a fresh walk from one start day.
/// Tracks the baseline too so the reset rule matches the full walk.
fn final_leveraged_value(
    series: &PriceSeries,
    start_index: usize,
    leverage_factor: f64,
    initial_value: f64,
) -> f64 {
    let mut leveraged_value = initial_value;
    let mut unleveraged_value = initial_value;

    for record in &series.records()[start_index..] {
        if let Some(r) = record.daily_return() {
            leveraged_value *= 1.0 + r * leverage_factor;
            unleveraged_value *= 1.0 + r;
        }
        if !leveraged_value.is_finite() || !unleveraged_value.is_finite() {
            leveraged_value = initial_value;
            unleveraged_value = initial_value;
        }
    }

    leveraged_value
}

/// Compute the final leveraged value for every candidate start day.
///
/// Each start gets its own fresh walk to the end of the series, so one
/// corrupted day cannot leak into other starts. Starts with `min_days` or
/// fewer days remaining are skipped; an empty point list is a valid
/// result, not an error.
pub fn run_start_sweep(
    series: &PriceSeries,
    request: &SweepRequest,
) -> Result<SweepResponse, SimulationError> {
    check_range(series, request.start_index)?;

    let end = series.len().saturating_sub(request.min_days);
    let mut points = Vec::new();

    for start in request.start_index..end {
        let initial = resolve_initial_value(series, start, request.baseline);
        let final_value = final_leveraged_value(series, start, request.leverage_factor, initial);
        points.push(SweepPoint {
            start_date: series.records()[start].date.clone(),
            final_value,
        });
    }

    let count = points.len();
    Ok(SweepResponse { points, count })
}

/// Leveraged value curve over raw open/close slices, normalized to 1.0.
///
/// Slice-in/slice-out variant of the walk for callers without a full
/// series: a day counts only when open and close are finite and the open
/// is positive, and the curve resets to 1.0 if it turns non-finite.
/// Returns an empty vector when `start_index` is past the data.
pub fn leveraged_values(
    opens: &[f64],
    closes: &[f64],
    start_index: usize,
    leverage_factor: f64,
) -> Vec<f64> {
    let n = opens.len().min(closes.len());
    if start_index >= n {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(n - start_index);
    let mut value = 1.0;

    for i in start_index..n {
        let open = opens[i];
        let close = closes[i];
        if open.is_finite() && close.is_finite() && open > 0.0 {
            value *= 1.0 + ((close - open) / open) * leverage_factor;
        }
        if !value.is_finite() {
            value = 1.0;
        }
        result.push(value);
    }
    result
}
