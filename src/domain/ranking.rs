//! Display-only projection of successful backtests and their ordering.

use crate::domain::outcome::BacktestSummary;
use std::cmp::Ordering;

/// Maximum number of rows shown in the console summary
pub const TOP_N: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct RankingRow {
    pub method: String,
    pub currency: String,
    pub asset: String,
    pub candle_size: u32,
    pub history_size: u32,
    pub exchange: String,
    pub relative_profit_pct: f64,
    pub market_performance_pct: f64,
}

impl From<&BacktestSummary> for RankingRow {
    fn from(summary: &BacktestSummary) -> Self {
        Self {
            method: summary.method.clone(),
            currency: summary.market.currency.to_uppercase(),
            asset: summary.market.asset.to_uppercase(),
            candle_size: summary.candle_size,
            history_size: summary.history_size,
            exchange: summary.market.exchange.clone(),
            relative_profit_pct: summary.performance.relative_profit,
            market_performance_pct: summary.performance.market,
        }
    }
}

/// Best first: relative profit descending, then market performance descending,
/// then method name so equal rows always land in the same order.
pub fn compare_rows(a: &RankingRow, b: &RankingRow) -> Ordering {
    b.relative_profit_pct
        .total_cmp(&a.relative_profit_pct)
        .then_with(|| b.market_performance_pct.total_cmp(&a.market_performance_pct))
        .then_with(|| a.method.cmp(&b.method))
}

/// Sorts a copy of `rows` and keeps the best `top_n`.
pub fn rank(rows: &[RankingRow], top_n: usize) -> Vec<RankingRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(compare_rows);
    sorted.truncate(top_n);
    sorted
}
