//! # Leverage Sim
//!
//! Simulates holding a constant-leverage position in an equity index by
//! compounding daily open-to-close returns from a chosen start date.
//!
//! ## Features
//! - Leveraged vs unleveraged value curves from any start day
//! - Defensive handling of malformed rows and non-finite values
//! - Start-date sweep: final value for every candidate start
//! - Compiles to native and WASM
//!
//! ## Example
//! ```
//! use leverage_sim::{load_csv_str, run_simulation, SimulationRequest};
//!
//! let csv = "Date,Open,High,Low,Close\n\
//!            2024-01-02,100,112,98,110\n\
//!            2024-01-03,110,111,95,99";
//! let series = load_csv_str(csv).unwrap();
//!
//! let request = SimulationRequest {
//!     leverage_factor: 2.0,
//!     ..Default::default()
//! };
//! let result = run_simulation(&series, &request).unwrap();
//! assert_eq!(result.leveraged.len(), 2);
//! ```

pub mod engine;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod series;
pub mod types;

// Re-export the public surface at crate root
pub use engine::{leveraged_values, run_simulation, run_start_sweep};
pub use error::{LoadError, SimulationError};
pub use loader::{load_csv_path, load_csv_str};
pub use series::{DailyRecord, PriceSeries};
pub use types::{
    Baseline, SimulationMetrics, SimulationPoint, SimulationRequest, SimulationResponse,
    SimulationWarning, SweepPoint, SweepRequest, SweepResponse,
};

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

/// WASM bindings for browser/Node.js use
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct Simulator;

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl Simulator {
    /// Leveraged value curve from `start_index`, normalized to 1.0
    #[wasm_bindgen]
    pub fn leveraged_values(
        opens: &[f64],
        closes: &[f64],
        start_index: usize,
        leverage_factor: f64,
    ) -> Vec<f64> {
        engine::leveraged_values(opens, closes, start_index, leverage_factor)
    }

    /// Unleveraged comparison curve (leverage factor fixed at 1)
    #[wasm_bindgen]
    pub fn unleveraged_values(opens: &[f64], closes: &[f64], start_index: usize) -> Vec<f64> {
        engine::leveraged_values(opens, closes, start_index, 1.0)
    }

    /// Final leveraged value for every start index with more than `min_days`
    /// days remaining
    #[wasm_bindgen]
    pub fn sweep_final_values(
        opens: &[f64],
        closes: &[f64],
        leverage_factor: f64,
        min_days: usize,
    ) -> Vec<f64> {
        let n = opens.len().min(closes.len());
        (0..n.saturating_sub(min_days))
            .map(|start| {
                engine::leveraged_values(opens, closes, start, leverage_factor)
                    .last()
                    .copied()
                    .unwrap_or(1.0)
            })
            .collect()
    }
}
