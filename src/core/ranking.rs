//! Weighted multi-factor ranking of income instruments.
//!
//! Each instrument exposes a yield, a volatility figure (for closed-end funds
//! the premium/discount Z-score) and total returns per timeframe. Every
//! sub-metric is first scaled across the cohort to a 0-100 score by a
//! [`ScoringPolicy`], then combined under user weights that must sum to
//! exactly 100.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Display;
use thiserror::Error;
use tracing::{debug, warn};

const WEIGHT_TOTAL: u32 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RankingError {
    #[error("Ranking weights must sum to 100, got {sum}")]
    WeightSum { sum: u32 },

    #[error("Weight for {name} must be between 0 and 100, got {value}")]
    WeightOutOfRange { name: &'static str, value: u32 },
}

/// Lookback used for the total return sub-metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "12mo")]
    TwelveMonths,
}

impl Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Timeframe::ThreeMonths => "3mo",
                Timeframe::SixMonths => "6mo",
                Timeframe::TwelveMonths => "12mo",
            }
        )
    }
}

impl std::str::FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "3mo" => Ok(Timeframe::ThreeMonths),
            "6mo" => Ok(Timeframe::SixMonths),
            "12mo" => Ok(Timeframe::TwelveMonths),
            _ => Err(anyhow::anyhow!("Invalid timeframe: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingWeights {
    #[serde(rename = "yield")]
    pub yield_weight: u32,
    pub volatility: u32,
    pub total_return: u32,
    pub timeframe: Timeframe,
}

impl Default for RankingWeights {
    fn default() -> Self {
        RankingWeights {
            yield_weight: 40,
            volatility: 30,
            total_return: 30,
            timeframe: Timeframe::TwelveMonths,
        }
    }
}

impl RankingWeights {
    /// Checks each weight is in range and that they sum to exactly 100.
    ///
    /// Weights are never renormalized; a bad sum is rejected as is.
    pub fn validate(&self) -> Result<(), RankingError> {
        for (name, value) in [
            ("yield", self.yield_weight),
            ("volatility", self.volatility),
            ("totalReturn", self.total_return),
        ] {
            if value > WEIGHT_TOTAL {
                return Err(RankingError::WeightOutOfRange { name, value });
            }
        }
        let sum = self.yield_weight + self.volatility + self.total_return;
        if sum != WEIGHT_TOTAL {
            return Err(RankingError::WeightSum { sum });
        }
        Ok(())
    }
}

/// Fund structure. It decides what the volatility figure measures: a price
/// volatility percentage for ETFs, a premium/discount Z-score for CEFs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    #[default]
    Etf,
    Cef,
}

/// Raw per-instrument figures supplied to the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentMetrics {
    pub symbol: String,
    #[serde(default)]
    pub kind: InstrumentKind,
    #[serde(rename = "yield")]
    pub yield_pct: Option<f64>,
    pub volatility: Option<f64>,
    #[serde(default)]
    pub total_return: BTreeMap<Timeframe, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedInstrument {
    pub rank: usize,
    pub symbol: String,
    pub composite: Option<f64>,
    pub yield_score: Option<f64>,
    pub volatility_score: Option<f64>,
    pub total_return_score: Option<f64>,
}

/// Scales one metric across a cohort to scores in `0..=100`, higher is better.
/// Missing values stay missing. The result must have one entry per input value.
pub trait ScoringPolicy: Send + Sync {
    fn scale(&self, values: &[Option<f64>]) -> Vec<Option<f64>>;
}

/// Share of the other present values strictly below each value.
pub struct PercentilePolicy;

impl ScoringPolicy for PercentilePolicy {
    fn scale(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let n = present.len();
        values
            .iter()
            .map(|value| {
                value.map(|v| {
                    if n <= 1 {
                        return 100.0;
                    }
                    let below = present.iter().filter(|other| **other < v).count();
                    100.0 * below as f64 / (n - 1) as f64
                })
            })
            .collect()
    }
}

/// Linear scaling between the cohort minimum and maximum.
pub struct MinMaxPolicy;

impl ScoringPolicy for MinMaxPolicy {
    fn scale(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let present = values.iter().flatten().copied();
        let min = present.clone().fold(f64::INFINITY, f64::min);
        let max = present.fold(f64::NEG_INFINITY, f64::max);
        values
            .iter()
            .map(|value| {
                value.map(|v| {
                    if max > min {
                        (v - min) / (max - min) * 100.0
                    } else {
                        100.0
                    }
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicyKind {
    #[default]
    Percentile,
    MinMax,
}

impl ScoringPolicyKind {
    pub fn policy(&self) -> &'static dyn ScoringPolicy {
        match self {
            ScoringPolicyKind::Percentile => &PercentilePolicy,
            ScoringPolicyKind::MinMax => &MinMaxPolicy,
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn score_at(scores: &[Option<f64>], index: usize) -> Option<f64> {
    scores.get(index).copied().flatten()
}

fn scale_checked(policy: &dyn ScoringPolicy, values: &[Option<f64>]) -> Vec<Option<f64>> {
    let scores = policy.scale(values);
    if scores.len() != values.len() {
        warn!(
            expected = values.len(),
            got = scores.len(),
            "Scoring policy returned wrong number of scores"
        );
    }
    scores
}

/// Scales `values` separately within each instrument kind.
fn scale_per_kind(
    policy: &dyn ScoringPolicy,
    instruments: &[InstrumentMetrics],
    values: &[Option<f64>],
) -> Vec<Option<f64>> {
    let mut scores = vec![None; values.len()];
    for kind in [InstrumentKind::Etf, InstrumentKind::Cef] {
        let members: Vec<usize> = instruments
            .iter()
            .enumerate()
            .filter(|(_, instrument)| instrument.kind == kind)
            .map(|(index, _)| index)
            .collect();
        if members.is_empty() {
            continue;
        }
        let cohort: Vec<Option<f64>> = members.iter().map(|&index| score_at(values, index)).collect();
        let scaled = scale_checked(policy, &cohort);
        for (&index, score) in members.iter().zip(scaled) {
            scores[index] = score;
        }
    }
    scores
}

/// Ranks instruments by weighted composite score, best first.
///
/// Ties are broken by symbol. Instruments missing a sub-metric whose weight is
/// non-zero get no composite and are ranked last, ordered by symbol. Volatility
/// is scaled within each instrument kind since ETF and CEF figures have
/// different units.
pub fn rank_instruments(
    instruments: &[InstrumentMetrics],
    weights: &RankingWeights,
    policy: &dyn ScoringPolicy,
) -> Result<Vec<RankedInstrument>, RankingError> {
    if let Err(e) = weights.validate() {
        warn!(error = %e, "Rejected ranking weights");
        return Err(e);
    }

    let yields: Vec<Option<f64>> = instruments.iter().map(|i| finite(i.yield_pct)).collect();
    // Lower volatility (or a deeper discount Z-score) ranks better.
    let volatilities: Vec<Option<f64>> = instruments
        .iter()
        .map(|i| finite(i.volatility).map(|v| -v))
        .collect();
    let returns: Vec<Option<f64>> = instruments
        .iter()
        .map(|i| finite(i.total_return.get(&weights.timeframe).copied()))
        .collect();

    let yield_scores = scale_checked(policy, &yields);
    let volatility_scores = scale_per_kind(policy, instruments, &volatilities);
    let return_scores = scale_checked(policy, &returns);

    let mut ranked: Vec<RankedInstrument> = instruments
        .iter()
        .enumerate()
        .map(|(i, instrument)| {
            let yield_score = score_at(&yield_scores, i);
            let volatility_score = score_at(&volatility_scores, i);
            let total_return_score = score_at(&return_scores, i);
            let parts = [
                (yield_score, weights.yield_weight),
                (volatility_score, weights.volatility),
                (total_return_score, weights.total_return),
            ];
            let composite = parts
                .iter()
                .filter(|(_, weight)| *weight > 0)
                .try_fold(0.0, |acc, (score, weight)| {
                    score.map(|s| acc + s * *weight as f64)
                })
                .map(|total| total / WEIGHT_TOTAL as f64);
            if composite.is_none() {
                debug!(symbol = %instrument.symbol, "Missing sub-metric, ranking last");
            }
            RankedInstrument {
                rank: 0,
                symbol: instrument.symbol.clone(),
                composite,
                yield_score,
                volatility_score,
                total_return_score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| match (a.composite, b.composite) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.symbol.cmp(&b.symbol)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.symbol.cmp(&b.symbol),
    });
    for (position, instrument) in ranked.iter_mut().enumerate() {
        instrument.rank = position + 1;
    }

    Ok(ranked)
}
