//! Leverage simulation JSON API
//!
//! Holds the loaded price series as process-wide state and serves the
//! compounding engine to the chart frontend.
//!
//! Run: SIM_CSV=data/HistoricalData.csv cargo run --release --bin server

use axum::http::StatusCode;
use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use leverage_sim::{
    load_csv_path, load_csv_str, run_simulation, run_start_sweep, PriceSeries, SimulationRequest,
    SimulationResponse, SweepRequest, SweepResponse,
};

// ============================================================================
// State & Config
// ============================================================================

/// Server configuration derived from environment variables.
#[derive(Debug, Clone)]
struct ServerConfig {
    bind: String,
    port: u16,
    csv_path: PathBuf,
}

fn env_str(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    fn from_env() -> Self {
        ServerConfig {
            bind: env_str("SIM_BIND", "127.0.0.1"),
            port: env_u16("SIM_PORT", 3030),
            csv_path: PathBuf::from(env_str("SIM_CSV", "data/HistoricalData.csv")),
        }
    }
}

struct AppState {
    /// Replaced wholesale by /load; handlers snapshot the Arc at call time
    /// so an in-flight simulation never sees a half-swapped series.
    series: RwLock<Arc<PriceSeries>>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
struct DatesResponse {
    dates: Vec<String>,
    count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadResponse {
    rows: usize,
    invalid_rows: usize,
    first_date: Option<String>,
    last_date: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_dates(State(state): State<Arc<AppState>>) -> Json<DatesResponse> {
    let series = state.series.read().await.clone();
    let dates = series.dates();
    let count = dates.len();
    Json(DatesResponse { dates, count })
}

async fn simulate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationResponse>, (StatusCode, String)> {
    let start = Instant::now();
    let series = state.series.read().await.clone();

    match run_simulation(&series, &request) {
        Ok(response) => {
            tracing::info!(
                "simulated {} days in {:.2}ms",
                response.leveraged.len(),
                start.elapsed().as_secs_f64() * 1000.0
            );
            Ok(Json(response))
        }
        Err(e) => {
            tracing::warn!("simulation rejected: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

async fn sweep(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SweepRequest>,
) -> Result<Json<SweepResponse>, (StatusCode, String)> {
    let start = Instant::now();
    let series = state.series.read().await.clone();

    match run_start_sweep(&series, &request) {
        Ok(response) => {
            tracing::info!(
                "swept {} start dates in {:.2}ms",
                response.count,
                start.elapsed().as_secs_f64() * 1000.0
            );
            Ok(Json(response))
        }
        Err(e) => {
            tracing::warn!("sweep rejected: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

async fn load(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<LoadResponse>, (StatusCode, String)> {
    match load_csv_str(&body) {
        Ok(series) => {
            let response = LoadResponse {
                rows: series.len(),
                invalid_rows: series.count_invalid(),
                first_date: series.first_date().map(str::to_string),
                last_date: series.last_date().map(str::to_string),
            };
            *state.series.write().await = Arc::new(series);
            tracing::info!(
                "replaced price series: {} rows ({} invalid)",
                response.rows,
                response.invalid_rows
            );
            Ok(Json(response))
        }
        Err(e) => {
            tracing::warn!("load rejected: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

// ============================================================================
// Startup
// ============================================================================

fn initial_series(cfg: &ServerConfig) -> PriceSeries {
    match load_csv_path(&cfg.csv_path) {
        Ok(series) => {
            tracing::info!(
                "loaded {} rows ({} invalid) from {}",
                series.len(),
                series.count_invalid(),
                cfg.csv_path.display()
            );
            series
        }
        Err(e) => {
            tracing::warn!(
                "failed to load {}: {}; starting with empty series, POST /load to supply data",
                cfg.csv_path.display(),
                e
            );
            PriceSeries::default()
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = ServerConfig::from_env();
    let series = initial_series(&cfg);

    let state = Arc::new(AppState {
        series: RwLock::new(Arc::new(series)),
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/dates", get(list_dates))
        .route("/simulate", post(simulate))
        .route("/sweep", post(sweep))
        .route("/load", post(load))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024)) // 50MB for long price histories
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", cfg.bind, cfg.port)
        .parse()
        .expect("invalid bind address");
    println!("Leverage simulation server on http://{}", addr);
    println!("  GET  /health    - liveness check");
    println!("  GET  /dates     - available start dates");
    println!("  POST /simulate  - leveraged vs unleveraged value curves");
    println!("  POST /sweep     - final value per start date");
    println!("  POST /load      - replace the price series (raw CSV body)");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
