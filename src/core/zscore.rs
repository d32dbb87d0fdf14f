//! Premium/discount Z-score for closed-end funds.
//!
//! The premium or discount of a fund is `price / nav - 1`. Its Z-score over a
//! lookback of up to three years tells how far today's premium sits from its
//! own history, which the ranking uses as the fund's volatility figure.
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

const LOOKBACK_MONTHS: u32 = 3 * 12;
/// About one year of trading days.
pub const MIN_DATA_POINTS: usize = 252;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZScore {
    pub z_score: f64,
    pub current_pd: f64,
    pub avg_pd: f64,
    pub stddev_pd: f64,
    pub data_points: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ZScoreOutcome {
    Active(ZScore),
    InsufficientData { data_points: usize, required: usize },
}

impl ZScoreOutcome {
    pub fn z_score(&self) -> Option<f64> {
        match self {
            ZScoreOutcome::Active(z) => Some(z.z_score),
            ZScoreOutcome::InsufficientData { .. } => None,
        }
    }
}

/// Computes the premium/discount Z-score as of `current_date`.
///
/// Price and NAV closes are joined on date, keeping days where both are
/// positive. The window runs from three calendar years before the latest
/// joined date up to that date. Uses the population standard deviation; a
/// flat history gives a Z-score of zero. Returns `None` when the two series
/// share no usable day.
pub fn premium_discount_zscore(
    prices: &[PricePoint],
    navs: &[PricePoint],
    current_date: NaiveDate,
) -> Option<ZScoreOutcome> {
    let navs: BTreeMap<NaiveDate, f64> = navs
        .iter()
        .filter(|p| p.close > 0.0 && p.close.is_finite())
        .map(|p| (p.date, p.close))
        .collect();
    let joined: BTreeMap<NaiveDate, f64> = prices
        .iter()
        .filter(|p| p.close > 0.0 && p.close.is_finite() && p.date <= current_date)
        .filter_map(|p| navs.get(&p.date).map(|nav| (p.date, p.close / nav - 1.0)))
        .collect();

    let (&end_date, _) = joined.last_key_value()?;
    let start_date = end_date.checked_sub_months(Months::new(LOOKBACK_MONTHS))?;
    let window: Vec<f64> = joined.range(start_date..=end_date).map(|(_, pd)| *pd).collect();

    if window.len() < MIN_DATA_POINTS {
        debug!(
            data_points = window.len(),
            required = MIN_DATA_POINTS,
            "Insufficient premium/discount history"
        );
        return Some(ZScoreOutcome::InsufficientData {
            data_points: window.len(),
            required: MIN_DATA_POINTS,
        });
    }

    let n = window.len() as f64;
    let current_pd = *window.last()?;
    let avg_pd = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|pd| (pd - avg_pd).powi(2)).sum::<f64>() / n;
    let stddev_pd = variance.sqrt();
    // Rounding noise on a flat history is not a real spread.
    let flat_tolerance = f64::EPSILON * avg_pd.abs().max(1.0) * n;
    let z_score = if stddev_pd <= flat_tolerance {
        0.0
    } else {
        (current_pd - avg_pd) / stddev_pd
    };

    Some(ZScoreOutcome::Active(ZScore {
        z_score,
        current_pd,
        avg_pd,
        stddev_pd,
        data_points: window.len(),
        start_date,
        end_date,
    }))
}
