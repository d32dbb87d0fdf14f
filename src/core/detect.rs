//! Detection of payment frequency changes within a dividend history.
//!
//! Three independent signals are consulted in order of objectivity: measured
//! intervals between ex-dates, the declared payments-per-year, and finally the
//! free-text frequency label. The first signal able to give a verdict wins.
use super::frequency::Frequency;
use super::record::DividendRecord;
use std::collections::BTreeSet;
use tracing::debug;

/// Gaps outside `(0, MAX_VALID_GAP_DAYS)` are data errors or duplicates.
const MAX_VALID_GAP_DAYS: i64 = 400;

/// A verdict, or `None` when the strategy has nothing to say.
type Signal = Option<bool>;

struct Strategy {
    name: &'static str,
    evaluate: fn(&[&DividendRecord]) -> Signal,
}

const STRATEGIES: [Strategy; 3] = [
    Strategy {
        name: "interval",
        evaluate: interval_signal,
    },
    Strategy {
        name: "frequency_num",
        evaluate: declared_count_signal,
    },
    Strategy {
        name: "frequency_label",
        evaluate: label_signal,
    },
];

/// Returns true when the payment frequency of a chronological series changes.
///
/// Only regular payments are considered. Special and initial payments are
/// one-offs and would show up as spurious irregular intervals.
pub fn detect_frequency_change(records: &[DividendRecord]) -> bool {
    let regular: Vec<&DividendRecord> = records.iter().filter(|r| r.is_regular()).collect();
    if regular.len() < 2 {
        debug!(
            regular = regular.len(),
            "Not enough regular payments to detect a frequency change"
        );
        return false;
    }

    for strategy in &STRATEGIES {
        if let Some(changed) = (strategy.evaluate)(&regular) {
            debug!(strategy = strategy.name, changed, "Frequency change verdict");
            return changed;
        }
        debug!(strategy = strategy.name, "No signal, falling back");
    }
    false
}

/// Day gaps between consecutive records that fall inside the valid window.
pub(crate) fn valid_gaps(records: &[&DividendRecord]) -> Vec<i64> {
    records
        .windows(2)
        .map(|pair| (pair[1].ex_date - pair[0].ex_date).num_days())
        .filter(|gap| *gap > 0 && *gap < MAX_VALID_GAP_DAYS)
        .collect()
}

fn interval_signal(records: &[&DividendRecord]) -> Signal {
    let gaps = valid_gaps(records);
    if gaps.len() < 2 {
        return None;
    }
    let categories: BTreeSet<Frequency> = gaps
        .iter()
        .map(|gap| Frequency::classify_interval(*gap))
        .collect();
    Some(categories.len() != 1)
}

fn declared_count_signal(records: &[&DividendRecord]) -> Signal {
    let declared: Vec<u32> = records.iter().filter_map(|r| r.frequency_num).collect();
    transition_signal(&declared)
}

fn label_signal(records: &[&DividendRecord]) -> Signal {
    let labels: Vec<Frequency> = records
        .iter()
        .filter_map(|r| r.frequency.as_deref())
        .map(Frequency::from_label)
        .filter(|f| *f != Frequency::Irregular)
        .collect();
    transition_signal(&labels)
}

fn transition_signal<T: PartialEq>(values: &[T]) -> Signal {
    if values.len() < 2 {
        return None;
    }
    Some(values.windows(2).any(|pair| pair[0] != pair[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::test_support::*;
    use crate::core::record::{RawDividendRecord, ingest};

    fn labelled(ex_date: &str, label: Option<&str>, count: Option<u32>) -> RawDividendRecord {
        let mut r = typed(raw(ex_date, 0.1), "Regular");
        r.frequency = label.map(str::to_string);
        r.frequency_num = count;
        r
    }

    #[test]
    fn weekly_series_is_stable() {
        let records = series_with_gaps("2024-01-05", &[7, 6, 8, 7, 7, 8, 6], 0.1);
        assert!(!detect_frequency_change(&records));
    }

    #[test]
    fn monthly_then_quarterly_is_a_change() {
        let records = series_with_gaps("2023-01-15", &[30, 91], 0.1);
        assert!(detect_frequency_change(&records));
    }

    #[test]
    fn special_payment_does_not_flip_monthly_series() {
        let mut raws: Vec<RawDividendRecord> = ["2024-01-15", "2024-02-15", "2024-03-15", "2024-04-15"]
            .iter()
            .map(|d| raw(d, 0.2))
            .collect();
        raws.push(raw("2024-03-18", 1.5));
        let records = ingest(raws);

        assert!(!detect_frequency_change(&records));
    }

    #[test]
    fn declared_special_is_excluded() {
        let raws = vec![
            typed(raw("2024-01-15", 0.2), "Regular"),
            typed(raw("2024-01-29", 2.0), "Special"),
            typed(raw("2024-02-15", 0.2), "Regular"),
            typed(raw("2024-03-15", 0.2), "Regular"),
        ];
        assert!(!detect_frequency_change(&ingest(raws)));
    }

    #[test]
    fn insufficient_regular_records() {
        assert!(!detect_frequency_change(&[]));
        let records = ingest(vec![raw("2024-01-15", 0.2)]);
        assert!(!detect_frequency_change(&records));
    }

    #[test]
    fn falls_back_to_declared_count() {
        let records = ingest(vec![
            labelled("2023-01-15", None, Some(4)),
            labelled("2024-06-15", None, Some(12)),
        ]);
        assert!(detect_frequency_change(&records));

        let records = ingest(vec![
            labelled("2023-01-15", Some("Weekly"), Some(12)),
            labelled("2024-06-15", Some("Monthly"), Some(12)),
        ]);
        assert!(!detect_frequency_change(&records));
    }

    #[test]
    fn falls_back_to_label() {
        let records = ingest(vec![
            labelled("2023-01-15", Some("Quarterly"), None),
            labelled("2024-06-15", Some("monthly"), None),
        ]);
        assert!(detect_frequency_change(&records));

        let records = ingest(vec![
            labelled("2023-01-15", Some("Monthly"), None),
            labelled("2024-06-15", Some("MONTHLY"), None),
        ]);
        assert!(!detect_frequency_change(&records));
    }

    #[test]
    fn interval_signal_takes_precedence() {
        let records = ingest(vec![
            labelled("2024-01-15", Some("Weekly"), Some(52)),
            labelled("2024-02-15", Some("Monthly"), Some(12)),
            labelled("2024-03-15", Some("Quarterly"), Some(4)),
        ]);
        assert!(!detect_frequency_change(&records));
    }

    #[test]
    fn no_signal_defaults_to_unchanged() {
        let records = ingest(vec![
            labelled("2020-01-15", Some("sometimes"), None),
            labelled("2024-01-15", None, None),
        ]);
        assert!(!detect_frequency_change(&records));
    }

    #[test]
    fn ignores_out_of_window_gaps() {
        // One valid gap plus an oversized one: not enough interval evidence.
        let records = ingest(vec![
            labelled("2022-01-15", None, Some(12)),
            labelled("2024-01-15", None, Some(12)),
            labelled("2024-02-15", None, Some(12)),
        ]);
        assert!(!detect_frequency_change(&records));
    }
}
