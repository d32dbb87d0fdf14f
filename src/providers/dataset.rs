//! File-backed source of dividend histories and instrument metrics.
//!
//! A dataset is a YAML or JSON document (chosen by file extension) exported
//! by whatever system collects the raw data:
//!
//! ```yaml
//! dividends:
//!   JEPI:
//!     - { exDate: 2024-01-02, amount: 0.32, adjAmount: 0.32, frequencyNum: 12 }
//! corporateActions:
//!   JEPI:
//!     2024-01-02: { paymentDate: 2024-01-05, recordDate: 2024-01-03 }
//! instruments:
//!   - symbol: GOF
//!     kind: cef
//!     yield: 14.2
//!     totalReturn: { 3mo: 2.1, 6mo: 4.0, 12mo: 9.5 }
//!     prices: [{ date: 2024-01-02, close: 15.1 }]
//!     navs: [{ date: 2024-01-02, close: 12.9 }]
//! ```
use crate::core::history::{CorporateActionProvider, DividendHistoryProvider};
use crate::core::ranking::{InstrumentKind, InstrumentMetrics, Timeframe};
use crate::core::record::{CorporateActionDates, RawDividendRecord};
use crate::core::zscore::{PricePoint, premium_discount_zscore};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentEntry {
    pub symbol: String,
    #[serde(default)]
    pub kind: InstrumentKind,
    #[serde(rename = "yield")]
    pub yield_pct: Option<f64>,
    pub volatility: Option<f64>,
    #[serde(default)]
    pub total_return: BTreeMap<Timeframe, f64>,
    #[serde(default)]
    pub prices: Vec<PricePoint>,
    #[serde(default)]
    pub navs: Vec<PricePoint>,
}

impl InstrumentEntry {
    /// Ranking inputs for this instrument. A closed-end fund without an explicit
    /// volatility figure uses its premium/discount Z-score instead.
    pub fn metrics(&self, today: NaiveDate) -> InstrumentMetrics {
        let volatility = self.volatility.or_else(|| {
            if self.kind != InstrumentKind::Cef {
                return None;
            }
            let z = premium_discount_zscore(&self.prices, &self.navs, today)?.z_score();
            debug!(symbol = %self.symbol, z_score = ?z, "Computed premium/discount Z-score");
            z
        });
        InstrumentMetrics {
            symbol: self.symbol.clone(),
            kind: self.kind,
            yield_pct: self.yield_pct,
            volatility,
            total_return: self.total_return.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub dividends: HashMap<String, Vec<RawDividendRecord>>,
    #[serde(default)]
    pub corporate_actions: HashMap<String, HashMap<NaiveDate, CorporateActionDates>>,
    #[serde(default)]
    pub instruments: Vec<InstrumentEntry>,
}

impl Dataset {
    pub fn parse(content: &str, json: bool) -> Result<Self> {
        let dataset: Dataset = if json {
            serde_json::from_str(content).context("Failed to parse JSON dataset")?
        } else {
            serde_yaml::from_str(content).context("Failed to parse YAML dataset")?
        };
        Ok(dataset.with_uppercase_symbols())
    }

    fn with_uppercase_symbols(self) -> Self {
        Dataset {
            dividends: self
                .dividends
                .into_iter()
                .map(|(k, v)| (k.to_uppercase(), v))
                .collect(),
            corporate_actions: self
                .corporate_actions
                .into_iter()
                .map(|(k, v)| (k.to_uppercase(), v))
                .collect(),
            instruments: self.instruments,
        }
    }
}

pub struct DatasetProvider {
    dataset: Dataset,
    today: NaiveDate,
}

impl DatasetProvider {
    pub fn new(dataset: Dataset, today: NaiveDate) -> Self {
        Self { dataset, today }
    }

    pub fn load<P: AsRef<Path>>(path: P, today: NaiveDate) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;
        let json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let dataset = Dataset::parse(&content, json)
            .with_context(|| format!("Invalid dataset file: {}", path.display()))?;
        debug!(
            symbols = dataset.dividends.len(),
            instruments = dataset.instruments.len(),
            "Loaded dataset"
        );
        Ok(Self::new(dataset, today))
    }

    pub fn instruments(&self) -> Vec<InstrumentMetrics> {
        self.dataset
            .instruments
            .iter()
            .map(|entry| entry.metrics(self.today))
            .collect()
    }
}

#[async_trait]
impl DividendHistoryProvider for DatasetProvider {
    /// Records within `years_back` calendar years of today; 0 keeps everything.
    async fn fetch_dividend_history(
        &self,
        symbol: &str,
        years_back: u32,
    ) -> Result<Vec<RawDividendRecord>> {
        let records = self
            .dataset
            .dividends
            .get(&symbol.to_uppercase())
            .ok_or_else(|| anyhow!("No dividend history for {}", symbol))?;

        let cutoff = match years_back {
            0 => None,
            years => self.today.checked_sub_months(Months::new(years * 12)),
        };
        Ok(records
            .iter()
            .filter(|r| cutoff.is_none_or(|c| r.ex_date >= c))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CorporateActionProvider for DatasetProvider {
    async fn fetch_corporate_action_dates(
        &self,
        symbol: &str,
    ) -> Result<HashMap<NaiveDate, CorporateActionDates>> {
        Ok(self
            .dataset
            .corporate_actions
            .get(&symbol.to_uppercase())
            .cloned()
            .unwrap_or_default())
    }
}
