//! Dividend records and the ingestion boundary that validates them.
use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use tracing::debug;

/// Gap in days at or below which an untyped payment is treated as special.
const SPECIAL_PAYMENT_MAX_GAP_DAYS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    Regular,
    Special,
    Initial,
}

impl Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PaymentType::Regular => "Regular",
                PaymentType::Special => "Special",
                PaymentType::Initial => "Initial",
            }
        )
    }
}

impl PaymentType {
    fn parse(label: &str) -> Option<PaymentType> {
        match label.trim().to_lowercase().as_str() {
            "regular" => Some(PaymentType::Regular),
            "special" => Some(PaymentType::Special),
            "initial" => Some(PaymentType::Initial),
            _ => None,
        }
    }
}

/// A distribution as supplied by a data source, before validation.
///
/// Amounts are kept as `f64` so that non-finite values coming from loosely
/// typed sources can be represented here and rejected during ingestion.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDividendRecord {
    pub ex_date: NaiveDate,
    pub pay_date: Option<NaiveDate>,
    pub record_date: Option<NaiveDate>,
    pub declare_date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub adj_amount: Option<f64>,
    pub frequency: Option<String>,
    pub frequency_num: Option<u32>,
    pub payment_type: Option<String>,
}

/// A validated distribution. Amounts are either positive or absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendRecord {
    pub ex_date: NaiveDate,
    pub pay_date: Option<NaiveDate>,
    pub record_date: Option<NaiveDate>,
    pub declare_date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub adj_amount: Option<Decimal>,
    pub frequency: Option<String>,
    pub frequency_num: Option<u32>,
    pub payment_type: PaymentType,
}

impl DividendRecord {
    /// The adjusted amount, falling back to the raw amount.
    pub fn effective_amount(&self) -> Option<Decimal> {
        self.adj_amount.or(self.amount)
    }

    pub fn is_regular(&self) -> bool {
        self.payment_type == PaymentType::Regular
    }
}

/// Payment and record dates published for an ex-date by a corporate action feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporateActionDates {
    pub payment_date: Option<NaiveDate>,
    pub record_date: Option<NaiveDate>,
}

fn valid_amount(value: Option<f64>) -> Option<Decimal> {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .and_then(Decimal::from_f64)
        .filter(|d| d.is_sign_positive() && !d.is_zero())
}

/// Validates raw records into a chronological series.
///
/// Invalid amounts become `None`, a zero `frequencyNum` is dropped, and a
/// missing or unknown payment type is inferred from the gap to the previous
/// ex-date.
pub fn ingest(mut raws: Vec<RawDividendRecord>) -> Vec<DividendRecord> {
    raws.sort_by_key(|r| r.ex_date);

    let mut records: Vec<DividendRecord> = Vec::with_capacity(raws.len());
    let mut prev_ex_date: Option<NaiveDate> = None;

    for raw in raws {
        let payment_type = match raw.payment_type.as_deref().and_then(PaymentType::parse) {
            Some(declared) => declared,
            None => match prev_ex_date {
                Some(prev) if (raw.ex_date - prev).num_days() <= SPECIAL_PAYMENT_MAX_GAP_DAYS => {
                    debug!(ex_date = %raw.ex_date, "Inferred special payment from short gap");
                    PaymentType::Special
                }
                _ => PaymentType::Regular,
            },
        };

        let amount = valid_amount(raw.amount);
        let adj_amount = valid_amount(raw.adj_amount);
        if amount.is_none() && adj_amount.is_none() {
            debug!(ex_date = %raw.ex_date, "Record has no valid amount");
        }

        prev_ex_date = Some(raw.ex_date);
        records.push(DividendRecord {
            ex_date: raw.ex_date,
            pay_date: raw.pay_date,
            record_date: raw.record_date,
            declare_date: raw.declare_date,
            amount,
            adj_amount,
            frequency: raw.frequency.filter(|f| !f.trim().is_empty()),
            frequency_num: raw.frequency_num.filter(|n| *n > 0),
            payment_type,
        });
    }

    records
}

/// Fills payment and record dates from corporate action data keyed by ex-date.
///
/// Dates missing from the feed keep the record's own values.
pub fn enrich(
    records: &[DividendRecord],
    actions: &HashMap<NaiveDate, CorporateActionDates>,
) -> Vec<DividendRecord> {
    records
        .iter()
        .map(|record| {
            let mut enriched = record.clone();
            if let Some(dates) = actions.get(&record.ex_date) {
                enriched.pay_date = dates.payment_date.or(record.pay_date);
                enriched.record_date = dates.record_date.or(record.record_date);
            }
            enriched
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn raw(ex_date: &str, amount: f64) -> RawDividendRecord {
        RawDividendRecord {
            ex_date: date(ex_date),
            pay_date: None,
            record_date: None,
            declare_date: None,
            amount: Some(amount),
            adj_amount: Some(amount),
            frequency: None,
            frequency_num: None,
            payment_type: None,
        }
    }

    /// Builds a regular series with the given gaps in days between payments.
    pub fn series_with_gaps(start: &str, gaps: &[i64], amount: f64) -> Vec<DividendRecord> {
        let mut current = date(start);
        let mut raws = vec![typed(raw(&current.to_string(), amount), "Regular")];
        for gap in gaps {
            current += chrono::Duration::days(*gap);
            raws.push(typed(raw(&current.to_string(), amount), "Regular"));
        }
        ingest(raws)
    }

    pub fn typed(mut raw: RawDividendRecord, payment_type: &str) -> RawDividendRecord {
        raw.payment_type = Some(payment_type.to_string());
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use std::str::FromStr;

    #[test]
    fn sorts_and_validates_amounts() {
        let mut bad = raw("2024-02-15", f64::NAN);
        bad.adj_amount = Some(-1.0);
        let mut fallback = raw("2024-03-15", 0.5);
        fallback.adj_amount = Some(f64::INFINITY);

        let records = ingest(vec![fallback, raw("2024-01-15", 0.25), bad]);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].ex_date, date("2024-01-15"));
        assert_eq!(records[1].effective_amount(), None);
        assert_eq!(records[2].adj_amount, None);
        assert_eq!(
            records[2].effective_amount(),
            Some(Decimal::from_str("0.5").unwrap())
        );
    }

    #[test]
    fn keeps_decimal_precision_of_amounts() {
        let records = ingest(vec![raw("2024-01-15", 4.6530)]);
        assert_eq!(
            records[0].adj_amount,
            Some(Decimal::from_str("4.653").unwrap())
        );
    }

    #[test]
    fn infers_payment_type_from_gap() {
        let records = ingest(vec![
            raw("2024-01-15", 0.25),
            raw("2024-01-18", 1.00),
            raw("2024-02-15", 0.25),
        ]);
        assert_eq!(records[0].payment_type, PaymentType::Regular);
        assert_eq!(records[1].payment_type, PaymentType::Special);
        assert_eq!(records[2].payment_type, PaymentType::Regular);
    }

    #[test]
    fn declared_payment_type_wins_over_inference() {
        let records = ingest(vec![
            typed(raw("2024-01-15", 0.25), "initial"),
            typed(raw("2024-01-17", 0.25), "REGULAR"),
            typed(raw("2024-02-15", 0.25), "bonus"),
        ]);
        assert_eq!(records[0].payment_type, PaymentType::Initial);
        assert_eq!(records[1].payment_type, PaymentType::Regular);
        assert_eq!(records[2].payment_type, PaymentType::Regular);
    }

    #[test]
    fn drops_zero_frequency_num_and_blank_labels() {
        let mut r = raw("2024-01-15", 0.25);
        r.frequency_num = Some(0);
        r.frequency = Some("  ".to_string());
        let records = ingest(vec![r]);
        assert_eq!(records[0].frequency_num, None);
        assert_eq!(records[0].frequency, None);
    }

    #[test]
    fn enrich_prefers_feed_dates_and_keeps_native_fallback() {
        let mut r = raw("2024-01-15", 0.25);
        r.pay_date = Some(date("2024-01-31"));
        r.record_date = Some(date("2024-01-16"));
        let records = ingest(vec![r, raw("2024-02-15", 0.25)]);

        let actions = HashMap::from([(
            date("2024-01-15"),
            CorporateActionDates {
                payment_date: Some(date("2024-02-01")),
                record_date: None,
            },
        )]);
        let enriched = enrich(&records, &actions);

        assert_eq!(enriched[0].pay_date, Some(date("2024-02-01")));
        assert_eq!(enriched[0].record_date, Some(date("2024-01-16")));
        assert_eq!(enriched[1], records[1]);
        assert_eq!(records[0].pay_date, Some(date("2024-01-31")));
    }
}
