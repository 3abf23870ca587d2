//! Configuration module for batchtrade.
//!
//! A sweep is described by a TOML file (dimensions, backtest window, service
//! endpoint). A handful of operational settings can be overridden from the
//! environment, see [`SweepEnvConfig`].

mod sweep_env_config;

pub use sweep_env_config::SweepEnvConfig;

use crate::domain::errors::ConfigError;
use crate::domain::parameters::{DateRange, TradingPair};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "batcher.toml";

fn default_gekko_path() -> PathBuf {
    PathBuf::from("../gekko")
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_parallel_queries() -> usize {
    2
}

fn default_results_path() -> PathBuf {
    PathBuf::from("results/batch.csv")
}

fn default_request_timeout_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateRangeConfig {
    pub from: String,
    pub to: String,
}

/// Full description of one sweep.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Root of the Gekko checkout; strategy settings live under `config/strategies`
    #[serde(default = "default_gekko_path")]
    pub gekko_path: PathBuf,
    /// Overrides the strategies directory derived from `gekko_path`
    #[serde(default)]
    pub strategies_dir: Option<PathBuf>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    pub candle_sizes: Vec<u32>,
    pub history_sizes: Vec<u32>,
    pub trading_pairs: Vec<TradingPair>,
    pub methods: Vec<String>,
    pub daterange: DateRangeConfig,
    /// Maximum number of backtests in flight
    #[serde(default = "default_parallel_queries")]
    pub parallel_queries: usize,
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl SweepConfig {
    /// Reads and validates a sweep file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SweepConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from(DEFAULT_CONFIG_PATH),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides, then re-validates.
    pub fn with_env(mut self, overrides: &SweepEnvConfig) -> Result<Self, ConfigError> {
        if let Some(api_url) = &overrides.api_url {
            self.api_url = api_url.clone();
        }
        if let Some(parallel_queries) = overrides.parallel_queries {
            self.parallel_queries = parallel_queries;
        }
        if let Some(shuffle) = overrides.shuffle {
            self.shuffle = shuffle;
        }
        if let Some(results_path) = &overrides.results_path {
            self.results_path = results_path.clone();
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.candle_sizes.is_empty() {
            return Err(ConfigError::EmptyDimension {
                dimension: "candle_sizes",
            });
        }
        if self.history_sizes.is_empty() {
            return Err(ConfigError::EmptyDimension {
                dimension: "history_sizes",
            });
        }
        if self.trading_pairs.is_empty() {
            return Err(ConfigError::EmptyDimension {
                dimension: "trading_pairs",
            });
        }
        if self.methods.is_empty() {
            return Err(ConfigError::EmptyDimension {
                dimension: "methods",
            });
        }
        if self.parallel_queries == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "parallel_queries".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "request_timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        self.date_range()?;
        Ok(())
    }

    pub fn date_range(&self) -> Result<DateRange, ConfigError> {
        DateRange::parse(&self.daterange.from, &self.daterange.to)
    }

    pub fn strategies_dir(&self) -> PathBuf {
        self.strategies_dir
            .clone()
            .unwrap_or_else(|| self.gekko_path.join("config").join("strategies"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Number of jobs the sweep expands to.
    pub fn combination_count(&self) -> usize {
        self.candle_sizes.len()
            * self.history_sizes.len()
            * self.trading_pairs.len()
            * self.methods.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWEEP: &str = r#"
        api_url = "http://gekko:3000"
        gekko_path = "/opt/gekko"
        candle_sizes = [15, 60]
        history_sizes = [10, 20, 30]
        trading_pairs = [["binance", "usdt", "btc"], ["poloniex", "btc", "eth"]]
        methods = ["MACD", "RSI"]
        parallel_queries = 4

        [daterange]
        from = "2018-01-01 00:00"
        to = "2018-06-01 00:00"
    "#;

    #[test]
    fn test_parse_sweep_file() {
        let config = SweepConfig::from_toml_str(SWEEP).unwrap();
        assert_eq!(config.api_url, "http://gekko:3000");
        assert_eq!(config.trading_pairs[1], TradingPair::new("poloniex", "btc", "eth"));
        assert_eq!(config.parallel_queries, 4);
        assert!(!config.shuffle);
        assert_eq!(config.results_path, PathBuf::from("results/batch.csv"));
        assert_eq!(config.combination_count(), 2 * 3 * 2 * 2);
        assert_eq!(
            config.strategies_dir(),
            PathBuf::from("/opt/gekko/config/strategies")
        );
    }

    #[test]
    fn test_env_overrides() {
        let overrides = SweepEnvConfig {
            api_url: Some("http://other:3000".to_string()),
            parallel_queries: Some(8),
            shuffle: Some(true),
            results_path: None,
        };
        let config = SweepConfig::from_toml_str(SWEEP)
            .unwrap()
            .with_env(&overrides)
            .unwrap();
        assert_eq!(config.api_url, "http://other:3000");
        assert_eq!(config.parallel_queries, 8);
        assert!(config.shuffle);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let overrides = SweepEnvConfig {
            parallel_queries: Some(0),
            ..Default::default()
        };
        let result = SweepConfig::from_toml_str(SWEEP)
            .unwrap()
            .with_env(&overrides);
        assert!(matches!(result, Err(ConfigError::InvalidSetting { .. })));
    }

    #[test]
    fn test_empty_dimension_rejected() {
        let sweep = SWEEP.replace(r#"methods = ["MACD", "RSI"]"#, "methods = []");
        assert!(matches!(
            SweepConfig::from_toml_str(&sweep),
            Err(ConfigError::EmptyDimension { dimension: "methods" })
        ));
    }

    #[test]
    fn test_inverted_daterange_rejected() {
        let sweep = SWEEP.replace("2018-06-01 00:00", "2017-06-01 00:00");
        assert!(matches!(
            SweepConfig::from_toml_str(&sweep),
            Err(ConfigError::InvalidDateRange { .. })
        ));
    }
}
