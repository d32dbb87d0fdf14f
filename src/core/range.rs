//! Time range selection for dividend histories.

use super::record::DividendRecord;
use anyhow::Result;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeRange {
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    ThreeYears,
    FiveYears,
    TenYears,
    TwentyYears,
    All,
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TimeRange::OneWeek => "1W",
                TimeRange::OneMonth => "1M",
                TimeRange::ThreeMonths => "3M",
                TimeRange::SixMonths => "6M",
                TimeRange::OneYear => "1Y",
                TimeRange::ThreeYears => "3Y",
                TimeRange::FiveYears => "5Y",
                TimeRange::TenYears => "10Y",
                TimeRange::TwentyYears => "20Y",
                TimeRange::All => "ALL",
            }
        )
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1W" => Ok(TimeRange::OneWeek),
            "1M" => Ok(TimeRange::OneMonth),
            "3M" => Ok(TimeRange::ThreeMonths),
            "6M" => Ok(TimeRange::SixMonths),
            "1Y" => Ok(TimeRange::OneYear),
            "3Y" => Ok(TimeRange::ThreeYears),
            "5Y" => Ok(TimeRange::FiveYears),
            "10Y" => Ok(TimeRange::TenYears),
            "20Y" => Ok(TimeRange::TwentyYears),
            "ALL" => Ok(TimeRange::All),
            _ => Err(anyhow::anyhow!("Invalid time range: {}", s)),
        }
    }
}

impl TryFrom<String> for TimeRange {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeRange> for String {
    fn from(range: TimeRange) -> String {
        range.to_string()
    }
}

impl TimeRange {
    /// Earliest ex-date kept by this range, `None` for `ALL`.
    ///
    /// Months and years are subtracted on the calendar, so `3Y` from
    /// 2024-05-10 is 2021-05-10. Days past the end of the target month clamp
    /// to its last day.
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            TimeRange::OneWeek => today.checked_sub_days(Days::new(7)),
            TimeRange::OneMonth => today.checked_sub_months(Months::new(1)),
            TimeRange::ThreeMonths => today.checked_sub_months(Months::new(3)),
            TimeRange::SixMonths => today.checked_sub_months(Months::new(6)),
            TimeRange::OneYear => today.checked_sub_months(Months::new(12)),
            TimeRange::ThreeYears => today.checked_sub_months(Months::new(3 * 12)),
            TimeRange::FiveYears => today.checked_sub_months(Months::new(5 * 12)),
            TimeRange::TenYears => today.checked_sub_months(Months::new(10 * 12)),
            TimeRange::TwentyYears => today.checked_sub_months(Months::new(20 * 12)),
            TimeRange::All => None,
        }
    }

    /// Records with an ex-date on or after the cutoff. The input is untouched.
    pub fn filter(&self, records: &[DividendRecord], today: NaiveDate) -> Vec<DividendRecord> {
        match self.cutoff(today) {
            Some(cutoff) => records
                .iter()
                .filter(|r| r.ex_date >= cutoff)
                .cloned()
                .collect(),
            None => records.to_vec(),
        }
    }
}
