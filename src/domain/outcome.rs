//! Classification of raw backtest responses into job outcomes.

use crate::domain::errors::JobError;
use crate::domain::parameters::TradingPair;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

/// Decimal places kept for profit and performance percentages
pub const PERCENT_PRECISION: u32 = 2;
/// Decimal places kept for sharpe, alpha and downside
pub const RATIO_PRECISION: u32 = 3;

/// Result of executing a single backtest job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Success(Box<BacktestSummary>),
    /// The service ran the backtest but it produced no trading activity
    Empty,
    Error { cause: JobError },
}

/// Normalized result of a successful backtest.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSummary {
    pub method: String,
    pub market: TradingPair,
    pub candle_size: u32,
    pub history_size: u32,
    pub performance: PerformanceSummary,
    pub strategy_parameters: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub profit: f64,
    pub relative_profit: f64,
    pub market: f64,
    pub yearly_profit: f64,
    pub sharpe: f64,
    pub alpha: f64,
    pub downside: f64,
    pub trades: u64,
    pub start_balance: f64,
    pub start_price: f64,
    pub end_price: f64,
    pub start_time: String,
    pub end_time: String,
    pub timespan: String,
}

#[derive(Debug, Deserialize)]
struct RawMarket {
    exchange: String,
    currency: String,
    asset: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTradingAdvisor {
    method: String,
    candle_size: u32,
    history_size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPerformanceReport {
    profit: f64,
    relative_profit: f64,
    market: f64,
    #[serde(default)]
    yearly_profit: Option<f64>,
    // Ratios come back as null when the window has too few trades
    #[serde(default)]
    sharpe: Option<f64>,
    #[serde(default)]
    alpha: Option<f64>,
    #[serde(default)]
    downside: Option<f64>,
    trades: u64,
    start_balance: f64,
    start_price: f64,
    end_price: f64,
    #[serde(default)]
    start_time: Value,
    #[serde(default)]
    end_time: Value,
    #[serde(default)]
    timespan: Value,
}

/// Rounds half away from zero to `places` decimals, on the value as written
/// (`1.005` -> `1.01`) rather than on its binary approximation.
pub fn round_to(value: f64, places: u32) -> f64 {
    // Shortest round-trip text, so 1.005 is seen as 1.005 and not 1.00499..
    match Decimal::from_str(&value.to_string()) {
        Ok(decimal) => decimal
            .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
            .to_string()
            .parse()
            .unwrap_or(value),
        // Non-finite or beyond Decimal's range
        Err(_) => {
            let factor = 10f64.powi(places as i32);
            (value * factor).round() / factor
        }
    }
}

/// Emptiness as the backtest service's clients have always judged it:
/// null, zero, and empty strings, arrays and objects are empty.
fn is_empty(section: Option<&Value>) -> bool {
    match section {
        None | Some(Value::Null) => true,
        Some(Value::Bool(_)) => false,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
    }
}

fn text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn section<T: serde::de::DeserializeOwned>(
    body: &Value,
    name: &str,
) -> Result<T, JobError> {
    let raw = body.get(name).cloned().unwrap_or(Value::Null);
    serde_json::from_value(raw).map_err(|e| JobError::Decode {
        reason: format!("{}: {}", name, e),
    })
}

/// Classifies one raw service response. Pure: equal inputs give equal outcomes.
pub fn classify(response: &Result<Value, JobError>) -> JobOutcome {
    let body = match response {
        Ok(body) => body,
        Err(cause) => {
            return JobOutcome::Error {
                cause: cause.clone(),
            };
        }
    };

    if is_empty(body.get("tradingAdvisor")) || is_empty(body.get("performanceReport")) {
        return JobOutcome::Empty;
    }

    match summarize(body) {
        Ok(summary) => JobOutcome::Success(Box::new(summary)),
        Err(cause) => JobOutcome::Error { cause },
    }
}

fn summarize(body: &Value) -> Result<BacktestSummary, JobError> {
    let market: RawMarket = section(body, "market")?;
    let advisor: RawTradingAdvisor = section(body, "tradingAdvisor")?;
    let report: RawPerformanceReport = section(body, "performanceReport")?;
    let strategy_parameters = body
        .get("strategyParameters")
        .cloned()
        .unwrap_or(Value::Null);

    Ok(BacktestSummary {
        method: advisor.method,
        market: TradingPair {
            exchange: market.exchange,
            currency: market.currency,
            asset: market.asset,
        },
        candle_size: advisor.candle_size,
        history_size: advisor.history_size,
        performance: PerformanceSummary {
            profit: round_to(report.profit, PERCENT_PRECISION),
            relative_profit: round_to(report.relative_profit, PERCENT_PRECISION),
            market: round_to(report.market, PERCENT_PRECISION),
            yearly_profit: round_to(report.yearly_profit.unwrap_or(0.0), PERCENT_PRECISION),
            sharpe: round_to(report.sharpe.unwrap_or(0.0), RATIO_PRECISION),
            alpha: round_to(report.alpha.unwrap_or(0.0), RATIO_PRECISION),
            downside: round_to(report.downside.unwrap_or(0.0), RATIO_PRECISION),
            trades: report.trades,
            start_balance: report.start_balance,
            start_price: report.start_price,
            end_price: report.end_price,
            start_time: text(report.start_time),
            end_time: text(report.end_time),
            timespan: text(report.timespan),
        },
        strategy_parameters,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn gekko_response(relative_profit: f64) -> Value {
        json!({
            "market": { "exchange": "binance", "currency": "usdt", "asset": "btc" },
            "tradingAdvisor": { "method": "MACD", "candleSize": 60, "historySize": 10 },
            "strategyParameters": { "short": 10, "long": 21 },
            "performanceReport": {
                "startTime": "2018-01-01 00:00:00",
                "endTime": "2018-02-01 00:00:00",
                "timespan": "a month",
                "market": -12.34567,
                "profit": 3.14159,
                "relativeProfit": relative_profit,
                "yearlyProfit": 40.123456,
                "startPrice": 13380.0,
                "endPrice": 10285.1,
                "trades": 17,
                "startBalance": 13480.0,
                "sharpe": 1.234567,
                "alpha": 0.98772,
                "downside": -0.45678
            }
        })
    }

    #[test]
    fn test_success_is_rounded() {
        let outcome = classify(&Ok(gekko_response(5.6789)));
        let JobOutcome::Success(summary) = outcome else {
            panic!("expected success");
        };

        assert_eq!(summary.method, "MACD");
        assert_eq!(summary.market.asset, "btc");
        assert_eq!(summary.candle_size, 60);
        assert_eq!(summary.performance.relative_profit, 5.68);
        assert_eq!(summary.performance.market, -12.35);
        assert_eq!(summary.performance.profit, 3.14);
        assert_eq!(summary.performance.yearly_profit, 40.12);
        assert_eq!(summary.performance.sharpe, 1.235);
        assert_eq!(summary.performance.alpha, 0.988);
        assert_eq!(summary.performance.downside, -0.457);
        assert_eq!(summary.performance.trades, 17);
        assert_eq!(summary.performance.start_price, 13380.0);
        assert_eq!(summary.performance.timespan, "a month");
        assert_eq!(summary.strategy_parameters["long"], 21);
    }

    #[test]
    fn test_empty_when_either_section_missing() {
        let mut no_report = gekko_response(1.0);
        no_report["performanceReport"] = json!({});
        assert_eq!(classify(&Ok(no_report)), JobOutcome::Empty);

        let mut no_advisor = gekko_response(1.0);
        no_advisor
            .as_object_mut()
            .unwrap()
            .remove("tradingAdvisor");
        assert_eq!(classify(&Ok(no_advisor)), JobOutcome::Empty);

        let mut null_report = gekko_response(1.0);
        null_report["performanceReport"] = Value::Null;
        assert_eq!(classify(&Ok(null_report)), JobOutcome::Empty);
    }

    #[test]
    fn test_transport_failure_is_error() {
        let outcome = classify(&Err(JobError::Status { status: 500 }));
        assert_eq!(
            outcome,
            JobOutcome::Error {
                cause: JobError::Status { status: 500 }
            }
        );
    }

    #[test]
    fn test_malformed_report_is_error() {
        let mut body = gekko_response(1.0);
        body["performanceReport"] = json!({ "profit": "lots" });
        assert!(matches!(
            classify(&Ok(body)),
            JobOutcome::Error {
                cause: JobError::Decode { .. }
            }
        ));
    }

    #[test]
    fn test_null_ratios_read_as_zero() {
        let mut body = gekko_response(1.0);
        body["performanceReport"]["sharpe"] = Value::Null;
        let JobOutcome::Success(summary) = classify(&Ok(body)) else {
            panic!("expected success");
        };
        assert_eq!(summary.performance.sharpe, 0.0);
    }

    #[test]
    fn test_classification_is_pure() {
        let response = Ok(gekko_response(2.5));
        assert_eq!(classify(&response), classify(&response));

        let failure = Err(JobError::Transport {
            reason: "connection refused".to_string(),
        });
        assert_eq!(classify(&failure), classify(&failure));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.005, 0), 1.0);
        assert_eq!(round_to(-2.345, 1), -2.3);
        assert_eq!(round_to(0.12345, 3), 0.123);
    }

    #[test]
    fn test_round_to_written_midpoints() {
        assert_eq!(round_to(1.005, 2), 1.01);
        assert_eq!(round_to(1.255, 2), 1.26);
        assert_eq!(round_to(2.675, 2), 2.68);
        assert_eq!(round_to(-1.005, 2), -1.01);
        assert_eq!(round_to(0.0005, 3), 0.001);
        assert_eq!(round_to(1.2345, 3), 1.235);
    }

    #[test]
    fn test_round_to_out_of_range() {
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
        assert!((round_to(1e30, 2) / 1e30 - 1.0).abs() < 1e-12);
    }
}
