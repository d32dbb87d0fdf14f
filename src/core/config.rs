use super::range::TimeRange;
use super::ranking::{RankingWeights, ScoringPolicyKind};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RankingConfig {
    #[serde(default)]
    pub weights: RankingWeights,
    #[serde(default)]
    pub policy: ScoringPolicyKind,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayDefaults {
    #[serde(default = "default_time_range")]
    pub time_range: TimeRange,
    #[serde(default = "default_years_back")]
    pub years_back: u32,
}

fn default_time_range() -> TimeRange {
    TimeRange::FiveYears
}

fn default_years_back() -> u32 {
    20
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        DisplayDefaults {
            time_range: default_time_range(),
            years_back: default_years_back(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub dataset: String,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub defaults: DisplayDefaults,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "divtrack", "divtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Dataset location, with relative paths taken from the config file's directory.
    pub fn dataset_path(&self, config_file: &Path) -> PathBuf {
        let dataset = Path::new(&self.dataset);
        match config_file.parent() {
            Some(dir) if dataset.is_relative() => dir.join(dataset),
            _ => dataset.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ranking::Timeframe;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
dataset: "/data/funds.yaml"
ranking:
  weights:
    yield: 50
    volatility: 20
    totalReturn: 30
    timeframe: 3mo
  policy: min_max
defaults:
  time_range: 10Y
  years_back: 15
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.dataset, "/data/funds.yaml");
        assert_eq!(config.ranking.weights.yield_weight, 50);
        assert_eq!(config.ranking.weights.volatility, 20);
        assert_eq!(config.ranking.weights.total_return, 30);
        assert_eq!(config.ranking.weights.timeframe, Timeframe::ThreeMonths);
        assert_eq!(config.ranking.policy, ScoringPolicyKind::MinMax);
        assert_eq!(config.defaults.time_range, TimeRange::TenYears);
        assert_eq!(config.defaults.years_back, 15);
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig =
            serde_yaml::from_str("dataset: funds.json\n").expect("Failed to deserialize");
        assert_eq!(config.ranking.weights, RankingWeights::default());
        assert_eq!(config.ranking.policy, ScoringPolicyKind::Percentile);
        assert_eq!(config.defaults.time_range, TimeRange::FiveYears);
        assert_eq!(config.defaults.years_back, 20);
    }

    #[test]
    fn test_config_keeps_invalid_weights_for_apply_time_check() {
        let yaml_str = r#"
dataset: funds.yaml
ranking:
  weights: { yield: 30, volatility: 30, totalReturn: 39, timeframe: 12mo }
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert!(config.ranking.weights.validate().is_err());
    }

    #[test]
    fn test_dataset_path_resolution() {
        let mut config: AppConfig =
            serde_yaml::from_str("dataset: data/funds.yaml\n").expect("Failed to deserialize");
        assert_eq!(
            config.dataset_path(Path::new("/etc/divtrack/config.yaml")),
            PathBuf::from("/etc/divtrack/data/funds.yaml")
        );

        config.dataset = "/srv/funds.json".to_string();
        assert_eq!(
            config.dataset_path(Path::new("/etc/divtrack/config.yaml")),
            PathBuf::from("/srv/funds.json")
        );
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = AppConfig::load_from_path("/nonexistent/divtrack/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
