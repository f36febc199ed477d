//! Daily price records and the chronological series the engine walks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date formats seen in exported price history (ISO and US order).
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// One trading day of OHLC data.
///
/// Fields hold whatever the loader saw: unparseable numbers land as NaN and
/// the raw date string is kept as-is for display, so a malformed row can sit
/// in the series and be skipped day-by-day instead of aborting a load.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DailyRecord {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl DailyRecord {
    /// Parse the raw date string, accepting ISO or MM/DD/YYYY order
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// A record contributes a return only when open and close are finite,
    /// the open is positive, and the date is a real calendar date.
    pub fn is_valid(&self) -> bool {
        self.open.is_finite() && self.close.is_finite() && self.open > 0.0 && self.parsed_date().is_some()
    }

    /// Open-to-close fractional return, `None` for invalid records
    ///
    /// Formula: (Close - Open) / Open
    pub fn daily_return(&self) -> Option<f64> {
        if self.is_valid() {
            Some((self.close - self.open) / self.open)
        } else {
            None
        }
    }
}

/// Ordered daily records, oldest first.
///
/// Chronological order is the loader's responsibility; the engine assumes
/// index i+1 is the trading day after index i.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    records: Vec<DailyRecord>,
}

impl PriceSeries {
    pub fn new(records: Vec<DailyRecord>) -> Self {
        PriceSeries { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&DailyRecord> {
        self.records.get(index)
    }

    /// Raw date strings in series order, for start-date pickers
    pub fn dates(&self) -> Vec<String> {
        self.records.iter().map(|r| r.date.clone()).collect()
    }

    /// Find the index of a date, matching the raw string first and falling
    /// back to calendar comparison so "2021-10-18" finds "10/18/2021".
    pub fn index_of_date(&self, date: &str) -> Option<usize> {
        if let Some(i) = self.records.iter().position(|r| r.date == date) {
            return Some(i);
        }
        let target = parse_date(date)?;
        self.records
            .iter()
            .position(|r| r.parsed_date() == Some(target))
    }

    pub fn first_date(&self) -> Option<&str> {
        self.records.first().map(|r| r.date.as_str())
    }

    pub fn last_date(&self) -> Option<&str> {
        self.records.last().map(|r| r.date.as_str())
    }

    /// Count of records that fail the validity check
    pub fn count_invalid(&self) -> usize {
        self.records.iter().filter(|r| !r.is_valid()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, open: f64, close: f64) -> DailyRecord {
        DailyRecord {
            date: date.to_string(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
        }
    }

    #[test]
    fn test_valid_record() {
        let r = record("2024-01-02", 100.0, 110.0);
        assert!(r.is_valid());
        assert!((r.daily_return().unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_zero_open_invalid() {
        let r = record("2024-01-02", 0.0, 110.0);
        assert!(!r.is_valid());
        assert_eq!(r.daily_return(), None);
    }

    #[test]
    fn test_negative_open_invalid() {
        assert!(!record("2024-01-02", -5.0, 110.0).is_valid());
    }

    #[test]
    fn test_nan_fields_invalid() {
        assert!(!record("2024-01-02", f64::NAN, 110.0).is_valid());
        assert!(!record("2024-01-02", 100.0, f64::NAN).is_valid());
        assert!(!record("2024-01-02", 100.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_negative_close_still_valid() {
        // A negative close is bad data but still yields a finite return
        let r = record("2024-01-02", 100.0, -10.0);
        assert!(r.is_valid());
        assert!((r.daily_return().unwrap() - (-1.1)).abs() < 1e-12);
    }

    #[test]
    fn test_unparseable_date_invalid() {
        assert!(!record("not-a-date", 100.0, 110.0).is_valid());
        assert!(!record("2024-13-45", 100.0, 110.0).is_valid());
    }

    #[test]
    fn test_both_date_formats_parse() {
        assert!(record("2021-10-18", 100.0, 110.0).parsed_date().is_some());
        assert!(record("10/18/2021", 100.0, 110.0).parsed_date().is_some());
        assert_eq!(
            record("10/18/2021", 100.0, 110.0).parsed_date(),
            record("2021-10-18", 100.0, 110.0).parsed_date()
        );
    }

    #[test]
    fn test_index_of_date_exact_and_cross_format() {
        let series = PriceSeries::new(vec![
            record("10/18/2021", 100.0, 101.0),
            record("10/19/2021", 101.0, 102.0),
        ]);
        assert_eq!(series.index_of_date("10/19/2021"), Some(1));
        assert_eq!(series.index_of_date("2021-10-18"), Some(0));
        assert_eq!(series.index_of_date("2021-10-20"), None);
        assert_eq!(series.index_of_date("garbage"), None);
    }

    #[test]
    fn test_count_invalid() {
        let series = PriceSeries::new(vec![
            record("2024-01-02", 100.0, 101.0),
            record("2024-01-03", 0.0, 101.0),
            record("bad", 101.0, 102.0),
        ]);
        assert_eq!(series.count_invalid(), 2);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_first_last_date() {
        let series = PriceSeries::new(vec![
            record("2024-01-02", 100.0, 101.0),
            record("2024-01-03", 101.0, 102.0),
        ]);
        assert_eq!(series.first_date(), Some("2024-01-02"));
        assert_eq!(series.last_date(), Some("2024-01-03"));
        assert!(PriceSeries::default().first_date().is_none());
    }
}
