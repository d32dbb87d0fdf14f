//! Payment frequency categories and the interval classifier.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Payment schedule of an instrument, as observed or declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    Irregular,
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Frequency::Weekly => "weekly",
                Frequency::Monthly => "monthly",
                Frequency::Quarterly => "quarterly",
                Frequency::SemiAnnual => "semi-annual",
                Frequency::Annual => "annual",
                Frequency::Irregular => "irregular",
            }
        )
    }
}

impl Frequency {
    /// Maps the day gap between two consecutive ex-dates to a category.
    ///
    /// Each category spans a window around its nominal day count, with gaps
    /// left between windows so no day count is ambiguous.
    pub fn classify_interval(days: i64) -> Frequency {
        match days {
            5..=10 => Frequency::Weekly,
            20..=40 => Frequency::Monthly,
            60..=110 => Frequency::Quarterly,
            150..=210 => Frequency::SemiAnnual,
            300..=380 => Frequency::Annual,
            _ => Frequency::Irregular,
        }
    }

    /// Canonical payments per year, `None` for irregular schedules.
    pub fn payments_per_year(&self) -> Option<u32> {
        match self {
            Frequency::Weekly => Some(52),
            Frequency::Monthly => Some(12),
            Frequency::Quarterly => Some(4),
            Frequency::SemiAnnual => Some(2),
            Frequency::Annual => Some(1),
            Frequency::Irregular => None,
        }
    }

    pub fn from_payments_per_year(count: u32) -> Frequency {
        match count {
            52 => Frequency::Weekly,
            12 => Frequency::Monthly,
            4 => Frequency::Quarterly,
            2 => Frequency::SemiAnnual,
            1 => Frequency::Annual,
            _ => Frequency::Irregular,
        }
    }

    /// Normalizes a free-text frequency label such as "Monthly" or "Semi-Annually".
    ///
    /// Matching is a case-insensitive substring test. "semi" is checked before
    /// "annual" since semi-annual labels contain both.
    pub fn from_label(label: &str) -> Frequency {
        let label = label.to_lowercase();
        if label.contains("week") {
            Frequency::Weekly
        } else if label.contains("month") {
            Frequency::Monthly
        } else if label.contains("quarter") {
            Frequency::Quarterly
        } else if label.contains("semi") {
            Frequency::SemiAnnual
        } else if label.contains("annual") {
            Frequency::Annual
        } else {
            Frequency::Irregular
        }
    }
}
