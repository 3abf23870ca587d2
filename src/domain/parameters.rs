//! Sweep dimensions and the parameter combinations expanded from them.

use crate::domain::errors::ConfigError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Market a backtest runs against.
///
/// In sweep files a pair is written as an `[exchange, currency, asset]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String, String)")]
pub struct TradingPair {
    pub exchange: String,
    pub currency: String,
    pub asset: String,
}

impl TradingPair {
    pub fn new(
        exchange: impl Into<String>,
        currency: impl Into<String>,
        asset: impl Into<String>,
    ) -> Self {
        Self {
            exchange: exchange.into(),
            currency: currency.into(),
            asset: asset.into(),
        }
    }
}

impl From<(String, String, String)> for TradingPair {
    fn from((exchange, currency, asset): (String, String, String)) -> Self {
        Self {
            exchange,
            currency,
            asset,
        }
    }
}

/// Backtest window shared by every job of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, ConfigError> {
        if from >= to {
            return Err(ConfigError::InvalidDateRange {
                reason: format!("start {} is not before end {}", from, to),
            });
        }
        Ok(Self { from, to })
    }

    /// Parses both ends. Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]` or `YYYY-MM-DD` (UTC).
    pub fn parse(from: &str, to: &str) -> Result<Self, ConfigError> {
        Self::new(parse_timestamp(from)?, parse_timestamp(to)?)
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ConfigError::InvalidDateRange {
            reason: format!("unrecognised timestamp '{}'", raw),
        })
}

/// One point of the sweep's parameter space.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterCombination {
    pub candle_size: u32,
    pub history_size: u32,
    pub trading_pair: TradingPair,
    pub method: String,
    /// Settings of `method`, shared with every other combination using the same method
    pub strategy_settings: Arc<Value>,
}

impl ParameterCombination {
    /// Short operator-facing label, e.g. `MACD USDT/BTC 60/10 Binance`.
    pub fn label(&self) -> String {
        job_label(
            &self.method,
            &self.trading_pair,
            self.candle_size,
            self.history_size,
        )
    }
}

pub(crate) fn job_label(
    method: &str,
    pair: &TradingPair,
    candle_size: u32,
    history_size: u32,
) -> String {
    format!(
        "{} {}/{} {}/{} {}",
        method,
        pair.currency.to_uppercase(),
        pair.asset.to_uppercase(),
        candle_size,
        history_size,
        capitalize(&pair.exchange)
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
