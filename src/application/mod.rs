// Backtest sweep orchestration
pub mod sweep;
