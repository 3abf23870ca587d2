//! Durable result rows.
//!
//! Column titles and order are schema v1 of the batch results file and must
//! stay stable so older result files remain comparable.

use crate::domain::outcome::BacktestSummary;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RECORD_SCHEMA_VERSION: u32 = 1;

/// Header row, in column order.
pub const RESULT_COLUMNS: [&str; 25] = [
    "Method",
    "Market performance (%)",
    "Strat performance (%)",
    "Profit",
    "Run date",
    "Run time",
    "Start date",
    "End date",
    "Currency pair",
    "Candle size",
    "History size",
    "Currency",
    "Asset",
    "Exchange",
    "Timespan",
    "Yearly profit",
    "Yearly profit (%)",
    "Start price",
    "End price",
    "Trades",
    "Start balance",
    "Sharpe",
    "Alpha",
    "Config",
    "Downside",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "Market performance (%)")]
    pub market_performance_percent: f64,
    #[serde(rename = "Strat performance (%)")]
    pub relative_profit: f64,
    #[serde(rename = "Profit")]
    pub profit: f64,
    #[serde(rename = "Run date")]
    pub run_date: String,
    #[serde(rename = "Run time")]
    pub run_time: String,
    #[serde(rename = "Start date")]
    pub start_date: String,
    #[serde(rename = "End date")]
    pub end_date: String,
    #[serde(rename = "Currency pair")]
    pub currency_pair: String,
    #[serde(rename = "Candle size")]
    pub candle_size: u32,
    #[serde(rename = "History size")]
    pub history_size: u32,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Asset")]
    pub asset: String,
    #[serde(rename = "Exchange")]
    pub exchange: String,
    #[serde(rename = "Timespan")]
    pub timespan: String,
    #[serde(rename = "Yearly profit")]
    pub yearly_profit: f64,
    #[serde(rename = "Yearly profit (%)")]
    pub yearly_profit_percent: f64,
    #[serde(rename = "Start price")]
    pub start_price: f64,
    #[serde(rename = "End price")]
    pub end_price: f64,
    #[serde(rename = "Trades")]
    pub trades: u64,
    #[serde(rename = "Start balance")]
    pub start_balance: f64,
    #[serde(rename = "Sharpe")]
    pub sharpe: f64,
    #[serde(rename = "Alpha")]
    pub alpha: f64,
    #[serde(rename = "Config")]
    pub config: String,
    #[serde(rename = "Downside")]
    pub downside: f64,
}

impl ResultRecord {
    pub fn from_summary(summary: &BacktestSummary, run_at: DateTime<Utc>) -> Self {
        let performance = &summary.performance;
        let currency = summary.market.currency.to_uppercase();
        let asset = summary.market.asset.to_uppercase();

        Self {
            method: summary.method.clone(),
            market_performance_percent: performance.market,
            relative_profit: performance.relative_profit,
            profit: performance.profit,
            run_date: run_at.format("%b %-d, %Y").to_string(),
            run_time: run_at.format("%-I:%M %p").to_string(),
            start_date: humanize_date(&performance.start_time),
            end_date: humanize_date(&performance.end_time),
            currency_pair: format!("{}/{}", currency, asset),
            candle_size: summary.candle_size,
            history_size: summary.history_size,
            currency,
            asset,
            exchange: summary.market.exchange.clone(),
            timespan: performance.timespan.clone(),
            // Legacy layout: "Yearly profit" holds the relative profit
            yearly_profit: performance.relative_profit,
            yearly_profit_percent: performance.yearly_profit,
            start_price: performance.start_price,
            end_price: performance.end_price,
            trades: performance.trades,
            start_balance: performance.start_balance,
            sharpe: performance.sharpe,
            alpha: performance.alpha,
            config: summary.strategy_parameters.to_string(),
            downside: performance.downside,
        }
    }
}

/// `2018-01-01 00:00:00` -> `Jan 1, 2018 00:00`; anything else is kept as-is.
fn humanize_date(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
