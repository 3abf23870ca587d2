//! Backtest job requests sent to the evaluation service.
//!
//! A `JobRequest` serializes to the nested configuration object the Gekko
//! `/api/backtest` endpoint expects. Paper-trader costs and the analyzer
//! setup are fixed for every sweep and are not part of the parameter space.

use crate::domain::parameters::{DateRange, ParameterCombination, TradingPair, job_label};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const FEE_MAKER: f64 = 0.25;
pub const FEE_TAKER: f64 = 0.25;
pub const SLIPPAGE: f64 = 0.05;
pub const SIMULATION_ASSET_BALANCE: f64 = 1.0;
pub const SIMULATION_CURRENCY_BALANCE: f64 = 100.0;
pub const RISK_FREE_RETURN: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub watch: TradingPair,
    pub paper_trader: PaperTrader,
    pub trading_advisor: TradingAdvisor,
    pub backtest: Backtest,
    pub backtest_result_exporter: ResultExporter,
    pub performance_analyzer: PerformanceAnalyzer,
    pub valid: bool,
    /// Strategy settings keyed by method name
    #[serde(flatten)]
    pub strategy: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperTrader {
    pub fee_maker: f64,
    pub fee_taker: f64,
    pub fee_using: String,
    pub slippage: f64,
    pub simulation_balance: SimulationBalance,
    pub report_roundtrips: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationBalance {
    pub asset: f64,
    pub currency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingAdvisor {
    pub enabled: bool,
    pub method: String,
    pub candle_size: u32,
    pub history_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Backtest {
    pub daterange: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultExporter {
    pub enabled: bool,
    pub write_to_disk: bool,
    pub data: ExporterData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExporterData {
    pub strat_updates: bool,
    pub roundtrips: bool,
    pub strat_candles: bool,
    pub strat_candle_props: Vec<String>,
    pub trades: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAnalyzer {
    pub risk_free_return: f64,
    pub enabled: bool,
}

impl JobRequest {
    /// Builds the request for one parameter combination. Never fails.
    pub fn build(combination: &ParameterCombination, daterange: DateRange) -> Self {
        let mut strategy = BTreeMap::new();
        strategy.insert(
            combination.method.clone(),
            combination.strategy_settings.as_ref().clone(),
        );

        Self {
            watch: combination.trading_pair.clone(),
            paper_trader: PaperTrader {
                fee_maker: FEE_MAKER,
                fee_taker: FEE_TAKER,
                fee_using: "maker".to_string(),
                slippage: SLIPPAGE,
                simulation_balance: SimulationBalance {
                    asset: SIMULATION_ASSET_BALANCE,
                    currency: SIMULATION_CURRENCY_BALANCE,
                },
                report_roundtrips: true,
                enabled: true,
            },
            trading_advisor: TradingAdvisor {
                enabled: true,
                method: combination.method.clone(),
                candle_size: combination.candle_size,
                history_size: combination.history_size,
            },
            backtest: Backtest { daterange },
            backtest_result_exporter: ResultExporter {
                enabled: true,
                write_to_disk: false,
                data: ExporterData {
                    strat_updates: false,
                    roundtrips: false,
                    strat_candles: false,
                    strat_candle_props: vec!["open".to_string()],
                    trades: false,
                },
            },
            performance_analyzer: PerformanceAnalyzer {
                risk_free_return: RISK_FREE_RETURN,
                enabled: true,
            },
            valid: true,
            strategy,
        }
    }

    pub fn label(&self) -> String {
        job_label(
            &self.trading_advisor.method,
            &self.watch,
            self.trading_advisor.candle_size,
            self.trading_advisor.history_size,
        )
    }
}
