use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a sweep before any job is submitted
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Strategy settings for '{method}' could not be loaded: {reason}")]
    StrategySettings { method: String, reason: String },

    #[error("Sweep dimension '{dimension}' is empty")]
    EmptyDimension { dimension: &'static str },

    #[error("Invalid date range: {reason}")]
    InvalidDateRange { reason: String },

    #[error("Invalid setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },
}

/// Errors for a single backtest job. Never fatal to the sweep.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobError {
    #[error("Request failed: {reason}")]
    Transport { reason: String },

    #[error("Backtest service returned status {status}")]
    Status { status: u16 },

    #[error("Unreadable backtest response: {reason}")]
    Decode { reason: String },
}

/// Errors appending to the durable result record
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Result record I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Result record encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Result record writer is unavailable: {reason}")]
    Unavailable { reason: String },
}
