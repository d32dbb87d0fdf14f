//! Calendar-year totals of dividend payments.
use super::record::DividendRecord;
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyAggregate {
    pub year: i32,
    pub total: Decimal,
    pub count: u32,
    pub avg_amount: Decimal,
}

/// Sums valid adjusted amounts per ex-date year, ascending by year.
///
/// Records without a valid amount are skipped, and years that end up without
/// a positive total are omitted.
pub fn aggregate_by_year(records: &[DividendRecord]) -> Vec<YearlyAggregate> {
    let mut years: BTreeMap<i32, (Decimal, u32)> = BTreeMap::new();
    for record in records {
        if let Some(amount) = record.effective_amount() {
            let entry = years
                .entry(record.ex_date.year())
                .or_insert((Decimal::ZERO, 0));
            entry.0 += amount;
            entry.1 += 1;
        }
    }

    years
        .into_iter()
        .filter(|(_, (total, count))| *total > Decimal::ZERO && *count > 0)
        .map(|(year, (total, count))| YearlyAggregate {
            year,
            total,
            count,
            avg_amount: total / Decimal::from(count),
        })
        .collect()
}

/// The most recent years shown on a chart: 20 when at least 20 exist, else 10
/// when at least 10 exist, else all of them.
pub fn chart_window(aggregates: &[YearlyAggregate]) -> &[YearlyAggregate] {
    let available = aggregates.len();
    let shown = if available >= 20 {
        20
    } else if available >= 10 {
        10
    } else {
        available
    };
    &aggregates[available - shown..]
}
