//! CSV price history loader.
//!
//! Normalizes exported price files into a chronological [`PriceSeries`].
//! Handles both observed column orders, currency formatting, and
//! newest-first exports; malformed fields become NaN holes that the
//! engine's validity check skips instead of failing the whole load.

use std::path::Path;

use crate::error::LoadError;
use crate::series::{DailyRecord, PriceSeries};

/// Column indices in [date, open, high, low, close] order.
type ColumnPositions = [usize; 5];

/// Nasdaq-style export layout: date, close, open, high, low
const CLOSE_FIRST: ColumnPositions = [0, 2, 3, 4, 1];

/// Locate the date/open/high/low/close columns by header name.
///
/// Names are matched case-insensitively with punctuation stripped, so
/// "Close/Last" and " Close " both count as the close column. Returns
/// `None` when any of the five is missing.
fn column_positions(headers: &csv::StringRecord) -> Option<ColumnPositions> {
    let mut date = None;
    let mut open = None;
    let mut high = None;
    let mut low = None;
    let mut close = None;

    for (i, name) in headers.iter().enumerate() {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "date" => date = Some(i),
            "open" => open = Some(i),
            "high" => high = Some(i),
            "low" => low = Some(i),
            _ if key.starts_with("close") => close = Some(i),
            _ => {}
        }
    }

    Some([date?, open?, high?, low?, close?])
}

/// Parse a price field, tolerating "$1,234.56" formatting.
/// Anything unparseable becomes NaN and is caught by the validity check.
fn parse_price(field: &str) -> f64 {
    let cleaned = field.trim().replace(['$', ','], "");
    cleaned.parse().unwrap_or(f64::NAN)
}

fn field(row: &csv::StringRecord, index: usize) -> f64 {
    row.get(index).map(parse_price).unwrap_or(f64::NAN)
}

/// Parse CSV text into a chronological price series.
///
/// The first line is always treated as a header. When the header names the
/// five columns they are mapped by name; otherwise the close-first export
/// layout is assumed. Rows stay in the series even when fields fail to
/// parse, so day counts line up with the source file.
pub fn load_csv_str(text: &str) -> Result<PriceSeries, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Csv(e.to_string()))?
        .clone();

    let positions = match column_positions(&headers) {
        Some(positions) => positions,
        None => {
            tracing::warn!(
                "unrecognized header {:?}, assuming date,close,open,high,low layout",
                headers
            );
            CLOSE_FIRST
        }
    };
    let [date_col, open_col, high_col, low_col, close_col] = positions;

    let mut records: Vec<DailyRecord> = Vec::new();
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("skipping unreadable row: {}", e);
                continue;
            }
        };

        records.push(DailyRecord {
            date: row.get(date_col).unwrap_or("").trim().to_string(),
            open: field(&row, open_col),
            high: field(&row, high_col),
            low: field(&row, low_col),
            close: field(&row, close_col),
        });
    }

    if records.is_empty() {
        return Err(LoadError::Empty);
    }

    // Exports are often newest-first; the engine needs oldest-first.
    // Junk leader/trailer rows have no usable date, so compare the first
    // and last rows that parse.
    let first = records.iter().find_map(|r| r.parsed_date());
    let last = records.iter().rev().find_map(|r| r.parsed_date());
    if let (Some(first), Some(last)) = (first, last) {
        if first > last {
            records.reverse();
            tracing::debug!("input was newest-first, reversed {} rows", records.len());
        }
    }

    let series = PriceSeries::new(records);
    tracing::debug!(
        "loaded {} rows ({} invalid)",
        series.len(),
        series.count_invalid()
    );
    Ok(series)
}

/// Read and parse a CSV file from disk.
pub fn load_csv_path(path: &Path) -> Result<PriceSeries, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_csv_str(&text)
}
