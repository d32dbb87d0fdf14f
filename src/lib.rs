pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::range::TimeRange;
use crate::core::ranking::{RankingWeights, Timeframe};
use crate::providers::DatasetProvider;
use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info};

/// Caller-supplied overrides on top of the configured ranking weights.
#[derive(Debug, Clone, Default)]
pub struct WeightOverrides {
    pub yield_weight: Option<u32>,
    pub volatility: Option<u32>,
    pub total_return: Option<u32>,
    pub timeframe: Option<Timeframe>,
}

impl WeightOverrides {
    pub fn apply(&self, base: &RankingWeights) -> RankingWeights {
        RankingWeights {
            yield_weight: self.yield_weight.unwrap_or(base.yield_weight),
            volatility: self.volatility.unwrap_or(base.volatility),
            total_return: self.total_return.unwrap_or(base.total_return),
            timeframe: self.timeframe.unwrap_or(base.timeframe),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Dividends {
        symbol: String,
        compare: Vec<String>,
        range: Option<TimeRange>,
        payments_per_year: Option<u32>,
    },
    Yearly {
        symbol: String,
    },
    Rank(WeightOverrides),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Dividend tracker starting...");

    let config_file = match config_path {
        Some(path) => PathBuf::from(path),
        None => AppConfig::default_config_path()?,
    };
    let config = AppConfig::load_from_path(&config_file)?;
    debug!("Loaded config: {config:#?}");

    let today = Utc::now().date_naive();
    let provider = DatasetProvider::load(config.dataset_path(&config_file), today)?;
    let years_back = config.defaults.years_back;

    match command {
        AppCommand::Dividends {
            symbol,
            compare,
            range,
            payments_per_year,
        } => {
            let options = cli::dividends::DividendsOptions {
                symbol: &symbol,
                comparisons: &compare,
                range: range.unwrap_or(config.defaults.time_range),
                payments_per_year,
                years_back,
                today,
            };
            cli::dividends::run(&provider, &provider, &options).await
        }
        AppCommand::Yearly { symbol } => cli::yearly::run(&provider, &symbol, years_back).await,
        AppCommand::Rank(overrides) => {
            let weights = overrides.apply(&config.ranking.weights);
            cli::rank::run(&provider.instruments(), &weights, config.ranking.policy)
        }
    }
}
