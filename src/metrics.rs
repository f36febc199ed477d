// src/metrics.rs
// Summary metrics over a simulated value curve

use crate::types::SimulationMetrics;

/// Calculate summary metrics from a value curve and its per-day returns.
///
/// `values` holds the curve from the start day onward, `daily_returns` the
/// leveraged return applied on each of those days (0.0 for skipped and
/// reset days), and `initial_value` the baseline the walk started from.
pub fn summarize(
    values: &[f64],
    daily_returns: &[f64],
    dates: &[String],
    initial_value: f64,
    trading_days_per_year: f64,
) -> SimulationMetrics {
    if values.is_empty() || daily_returns.is_empty() {
        return SimulationMetrics::default();
    }

    let start_date = dates.first().cloned().unwrap_or_default();
    let end_date = dates.last().cloned().unwrap_or_default();
    let days = values.len() as u32;
    let years = days as f64 / trading_days_per_year;

    let final_value = *values.last().unwrap_or(&initial_value);
    let growth = if initial_value > 0.0 {
        final_value / initial_value
    } else {
        0.0
    };
    let total_return = growth - 1.0;

    // CAGR is undefined once the curve goes to or below zero; report -100%
    let cagr = if years > 0.0 && growth > 0.0 {
        growth.powf(1.0 / years) - 1.0
    } else if years > 0.0 {
        -1.0
    } else {
        0.0
    };

    let volatility = annualized_volatility(daily_returns, trading_days_per_year);
    let max_drawdown = calculate_max_drawdown(values, initial_value);

    // Win rate
    let win_days = daily_returns.iter().filter(|&&r| r > 0.0).count();
    let win_rate = win_days as f64 / daily_returns.len().max(1) as f64;

    // Best/worst day
    let best_day = daily_returns
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let worst_day = daily_returns.iter().copied().fold(f64::INFINITY, f64::min);

    SimulationMetrics {
        start_date,
        end_date,
        days,
        years,
        total_return,
        cagr,
        volatility,
        max_drawdown,
        win_rate,
        best_day: if best_day.is_finite() { best_day } else { 0.0 },
        worst_day: if worst_day.is_finite() { worst_day } else { 0.0 },
    }
}

/// Calculate annualized volatility
fn annualized_volatility(returns: &[f64], trading_days: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
        / returns.len().max(1) as f64;

    variance.sqrt() * trading_days.sqrt()
}

/// Calculate maximum drawdown, seeded at the initial value so a loss on the
/// first day already counts
fn calculate_max_drawdown(values: &[f64], initial_value: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut peak = initial_value;
    let mut max_dd = 0.0;

    for &value in values {
        if value > peak {
            peak = value;
        }
        let dd = (peak - value) / peak;
        if dd > max_dd {
            max_dd = dd;
        }
    }

    -max_dd // Return as negative
}
