use crate::domain::errors::{ConfigError, JobError, RecordError};
use crate::domain::job::JobRequest;
use crate::domain::record::ResultRecord;
use async_trait::async_trait;
use serde_json::Value;

/// Remote service that evaluates one backtest per request.
#[async_trait]
pub trait BacktestService: Send + Sync {
    /// Submits one job and returns the raw response body.
    async fn run_backtest(&self, request: &JobRequest) -> Result<Value, JobError>;
}

/// Source of per-method strategy settings.
pub trait StrategySettingsLoader: Send + Sync {
    fn load(&self, method: &str) -> Result<Value, ConfigError>;
}

/// Append-only store for successful results.
pub trait ResultRecorder: Send + Sync {
    /// Durably appends one row. Returns only once the row is written.
    fn append(&self, record: &ResultRecord) -> Result<(), RecordError>;

    /// Where operators can find the complete record.
    fn location(&self) -> String;
}
