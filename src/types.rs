// src/types.rs
// Request/response types for the simulation API, matching the chart frontend

use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration Types
// ============================================================================

/// Initial value convention for the compounding walk.
///
/// `Normalized` starts both curves at 1.0 so the chart reads as a growth
/// multiple. `OpenPrice` anchors them at the opening price of the first
/// valid day at or after the start index (1.0 when the whole range is
/// invalid), matching price-denominated charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Baseline {
    #[default]
    Normalized,
    OpenPrice,
}

// ============================================================================
// API Request Types
// ============================================================================

/// Request to run a single simulation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    /// Index of the first day to simulate (0 = oldest)
    #[serde(default)]
    pub start_index: usize,
    /// Multiplier applied to each day's return before compounding
    #[serde(default = "default_leverage")]
    pub leverage_factor: f64,
    #[serde(default)]
    pub baseline: Baseline,
    /// Also compute the unleveraged comparison series
    #[serde(default = "default_true")]
    pub include_baseline: bool,
}

/// Request to compute the final value for every candidate start day
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepRequest {
    /// First start index to include
    #[serde(default)]
    pub start_index: usize,
    #[serde(default = "default_leverage")]
    pub leverage_factor: f64,
    #[serde(default)]
    pub baseline: Baseline,
    /// Starts with this many or fewer days remaining are skipped
    #[serde(default = "default_min_days")]
    pub min_days: usize,
}

fn default_leverage() -> f64 {
    3.0
}

fn default_true() -> bool {
    true
}

fn default_min_days() -> usize {
    10
}

impl Default for SimulationRequest {
    fn default() -> Self {
        SimulationRequest {
            start_index: 0,
            leverage_factor: default_leverage(),
            baseline: Baseline::default(),
            include_baseline: true,
        }
    }
}

impl Default for SweepRequest {
    fn default() -> Self {
        SweepRequest {
            start_index: 0,
            leverage_factor: default_leverage(),
            baseline: Baseline::default(),
            min_days: default_min_days(),
        }
    }
}

// ============================================================================
// API Response Types
// ============================================================================

/// A point on a value curve
#[derive(Debug, Clone, Serialize)]
pub struct SimulationPoint {
    pub date: String,
    pub value: f64,
}

/// Warning emitted when the walk had to reset a non-finite value
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationWarning {
    pub index: usize,
    pub date: String,
    pub message: String,
}

/// Summary metrics over the leveraged curve
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SimulationMetrics {
    pub start_date: String,
    pub end_date: String,
    pub days: u32,
    pub years: f64,
    pub total_return: f64,
    pub cagr: f64,
    pub volatility: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub best_day: f64,
    pub worst_day: f64,
}

/// Full simulation response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    pub leveraged: Vec<SimulationPoint>,
    pub unleveraged: Option<Vec<SimulationPoint>>,
    pub metrics: SimulationMetrics,
    pub skipped_days: u32,
    pub corruption_resets: u32,
    pub warnings: Vec<SimulationWarning>,
}

/// Final leveraged value for one start day
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepPoint {
    pub start_date: String,
    pub final_value: f64,
}

/// Full sweep response
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    pub points: Vec<SweepPoint>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_request_defaults() {
        let req: SimulationRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.start_index, 0);
        assert_eq!(req.leverage_factor, 3.0);
        assert_eq!(req.baseline, Baseline::Normalized);
        assert!(req.include_baseline);
    }

    #[test]
    fn test_simulation_request_camel_case() {
        let req: SimulationRequest = serde_json::from_str(
            r#"{"startIndex": 5, "leverageFactor": 2.5, "includeBaseline": false}"#,
        )
        .unwrap();
        assert_eq!(req.start_index, 5);
        assert_eq!(req.leverage_factor, 2.5);
        assert!(!req.include_baseline);
    }

    #[test]
    fn test_baseline_variants_parse() {
        let normalized: Baseline = serde_json::from_str(r#""normalized""#).unwrap();
        let open_price: Baseline = serde_json::from_str(r#""openPrice""#).unwrap();
        assert_eq!(normalized, Baseline::Normalized);
        assert_eq!(open_price, Baseline::OpenPrice);
    }

    #[test]
    fn test_sweep_request_defaults() {
        let req: SweepRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.start_index, 0);
        assert_eq!(req.leverage_factor, 3.0);
        assert_eq!(req.min_days, 10);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = SimulationResponse {
            leveraged: vec![SimulationPoint {
                date: "2024-01-02".to_string(),
                value: 1.2,
            }],
            unleveraged: None,
            metrics: SimulationMetrics::default(),
            skipped_days: 1,
            corruption_resets: 0,
            warnings: Vec::new(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"skippedDays\":1"));
        assert!(json.contains("\"corruptionResets\":0"));
        assert!(json.contains("\"unleveraged\":null"));
    }

    #[test]
    fn test_sweep_point_serializes_camel_case() {
        let point = SweepPoint {
            start_date: "2024-01-02".to_string(),
            final_value: 1.5,
        };
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("\"startDate\""));
        assert!(json.contains("\"finalValue\""));
    }
}
