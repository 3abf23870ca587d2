//! Console summary of a finished sweep.

use crate::application::sweep::aggregator::{Aggregator, SweepStats};
use crate::domain::ranking::{RankingRow, TOP_N, rank};

pub const NO_RESULTS: &str = "There are no results";

/// Renders the ranked summary once every job has resolved.
pub struct SweepReporter {
    top_n: usize,
}

impl SweepReporter {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Prints the sweep size before execution starts.
    pub fn print_plan(&self, combinations: usize, concurrency: usize) {
        println!("{}", "=".repeat(80));
        println!("🔍 BACKTEST SWEEP");
        println!("{} combinations", combinations);
        println!("Parallel queries: {}", concurrency);
        println!("{}", "=".repeat(80));
    }

    /// Ranked table, or the "no results" notice when nothing succeeded.
    pub fn render(&self, aggregator: &Aggregator) -> String {
        self.render_rows(
            aggregator.ranking(),
            aggregator.success_count(),
            &aggregator.record_location(),
        )
    }

    pub fn render_rows(&self, ranking: &[RankingRow], success_count: usize, location: &str) -> String {
        if success_count == 0 {
            return format!("{}\n", NO_RESULTS);
        }

        let mut out = String::new();
        if ranking.len() > self.top_n {
            out.push_str(&format!("{} most profitable results:\n", self.top_n));
        } else {
            out.push_str("Results:\n");
        }

        let line = "-".repeat(142);
        out.push_str(&format!("{}\n", line));
        out.push_str(&format!(
            "{:<16} | {:<8} | {:<8} | {:>11} | {:>12} | {:<12} | {:>24} | {:>22}\n",
            "Method",
            "Currency",
            "Asset",
            "Candle size",
            "History size",
            "Exchange",
            "Strategy performance (%)",
            "Market performance (%)"
        ));
        out.push_str(&format!("{}\n", line));

        // Text columns are cut to width; the full values are in the record
        for row in rank(ranking, self.top_n) {
            out.push_str(&format!(
                "{:<16.16} | {:<8.8} | {:<8.8} | {:>11} | {:>12} | {:<12.12} | {:>24.2} | {:>22.2}\n",
                row.method,
                row.currency,
                row.asset,
                row.candle_size,
                row.history_size,
                row.exchange,
                row.relative_profit_pct,
                row.market_performance_pct
            ));
        }

        out.push_str(&format!("{}\n", line));
        out.push_str(&format!("See full results in {}\n", location));
        out
    }

    /// One-line tally. Unlike the table, this tells empty runs from failed ones.
    pub fn render_stats(&self, stats: &SweepStats) -> String {
        let mut tally = format!(
            "{} jobs: {} succeeded, {} without trades, {} failed",
            stats.total, stats.successes, stats.empty, stats.errors
        );
        if stats.record_failures > 0 {
            tally.push_str(&format!(", {} not recorded", stats.record_failures));
        }
        tally
    }
}

impl Default for SweepReporter {
    fn default() -> Self {
        Self::new(TOP_N)
    }
}
