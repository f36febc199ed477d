//! Error types for loading and simulation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the simulation engine.
///
/// Malformed rows and non-finite intermediate values are handled inside the
/// walk and never reach the caller; only an unusable input range does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The loaded series has no rows
    #[error("price series is empty")]
    EmptySeries,

    /// Requested start index past the end of the series
    #[error("start index {index} out of range for series of length {len}")]
    StartIndexOutOfRange { index: usize, len: usize },
}

/// Errors from turning CSV text into a price series.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the input file failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The CSV reader rejected the input outright
    #[error("csv parse error: {0}")]
    Csv(String),

    /// Input had a header but no data rows
    #[error("no data rows found")]
    Empty,
}
