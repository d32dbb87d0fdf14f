//! Normalized per-payment rates for series whose payment frequency changed.
use super::frequency::Frequency;
use super::record::DividendRecord;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

const WEEKS_PER_YEAR: u32 = 52;
const DEFAULT_PAYMENTS_PER_YEAR: u32 = 12;

/// One payment as consumed by chart renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub ex_date: NaiveDate,
    pub amount: Decimal,
    pub normalized_rate: Option<Decimal>,
}

/// Payments per year for a record: caller override, then the declared count,
/// then the interval-derived schedule, then monthly.
pub fn resolve_payments_per_year(
    override_count: Option<u32>,
    record: &DividendRecord,
    interval: Option<Frequency>,
) -> u32 {
    override_count
        .filter(|n| *n > 0)
        .or(record.frequency_num)
        .or_else(|| interval.and_then(|f| f.payments_per_year()))
        .unwrap_or(DEFAULT_PAYMENTS_PER_YEAR)
}

/// Schedule implied by the gap between a regular record and its nearest
/// regular neighbour, preferring the previous one.
pub fn interval_frequency(records: &[DividendRecord], index: usize) -> Option<Frequency> {
    let current = records.get(index)?;
    let previous = records[..index].iter().rev().find(|r| r.is_regular());
    let gap = match previous {
        Some(prev) => (current.ex_date - prev.ex_date).num_days(),
        None => {
            let next = records[index + 1..].iter().find(|r| r.is_regular())?;
            (next.ex_date - current.ex_date).num_days()
        }
    };
    match Frequency::classify_interval(gap) {
        Frequency::Irregular => None,
        freq => Some(freq),
    }
}

/// A payment's annualized value expressed as a weekly rate.
///
/// Returns `None` for non-regular payments, when the series frequency did not
/// change (the adjusted amount is already comparable), and when the result is
/// not strictly positive. No rounding is applied.
pub fn normalized_rate(
    record: &DividendRecord,
    frequency_changed: bool,
    payments_per_year: u32,
) -> Option<Decimal> {
    if !record.is_regular() || !frequency_changed {
        return None;
    }
    record
        .effective_amount()?
        .checked_mul(Decimal::from(payments_per_year))?
        .checked_div(Decimal::from(WEEKS_PER_YEAR))
        .filter(|rate| *rate > Decimal::ZERO)
}

/// Chart points for every record carrying a valid amount, in series order.
pub fn normalize_series(
    records: &[DividendRecord],
    frequency_changed: bool,
    override_count: Option<u32>,
) -> Vec<ChartPoint> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let amount = record.effective_amount()?;
            let normalized_rate = if frequency_changed && record.is_regular() {
                let interval = interval_frequency(records, index);
                let count = resolve_payments_per_year(override_count, record, interval);
                normalized_rate(record, frequency_changed, count)
            } else {
                None
            };
            Some(ChartPoint {
                ex_date: record.ex_date,
                amount,
                normalized_rate,
            })
        })
        .collect()
}
