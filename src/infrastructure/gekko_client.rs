//! HTTP client for the Gekko backtest API.

use crate::domain::errors::{ConfigError, JobError};
use crate::domain::job::JobRequest;
use crate::domain::ports::BacktestService;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct GekkoClient {
    client: Client,
    url: String,
}

impl GekkoClient {
    /// `api_url` is the service root, e.g. `http://localhost:3000`.
    ///
    /// No retry layer: a failed backtest is reported once and the sweep moves on.
    /// `timeout` is the only bound on a hung job.
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let url = format!("{}/api/backtest", api_url.trim_end_matches('/'));
        Url::parse(&url).map_err(|e| ConfigError::InvalidSetting {
            key: "api_url".to_string(),
            reason: format!("{}: {}", api_url, e),
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ConfigError::InvalidSetting {
                key: "request_timeout_secs".to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl BacktestService for GekkoClient {
    async fn run_backtest(&self, request: &JobRequest) -> Result<Value, JobError> {
        debug!(url = %self.url, job = %request.label(), "Posting backtest");

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| JobError::Transport {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(JobError::Status {
                status: response.status().as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| JobError::Decode {
            reason: e.to_string(),
        })
    }
}
