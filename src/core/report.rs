//! Composition of the dividend pipeline for one symbol.
use super::detect::detect_frequency_change;
use super::normalize::{ChartPoint, normalize_series};
use super::range::TimeRange;
use super::record::DividendRecord;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendReport {
    pub range: TimeRange,
    pub frequency_changed: bool,
    pub points: Vec<ChartPoint>,
}

/// Filters a series to `range`, detects a frequency change within that window
/// and builds the chart points.
pub fn dividend_report(
    records: &[DividendRecord],
    range: TimeRange,
    today: NaiveDate,
    payments_per_year: Option<u32>,
) -> DividendReport {
    let filtered = range.filter(records, today);
    let frequency_changed = detect_frequency_change(&filtered);
    let points = normalize_series(&filtered, frequency_changed, payments_per_year);
    DividendReport {
        range,
        frequency_changed,
        points,
    }
}
