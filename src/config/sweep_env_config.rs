//! Environment overrides for the sweep file.

use std::env;
use std::path::PathBuf;

/// Values taken from the environment (or `.env`) that win over the sweep file.
#[derive(Debug, Clone, Default)]
pub struct SweepEnvConfig {
    pub api_url: Option<String>,
    pub parallel_queries: Option<usize>,
    pub shuffle: Option<bool>,
    pub results_path: Option<PathBuf>,
}

impl SweepEnvConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("BATCHER_API_URL").ok(),
            parallel_queries: env::var("BATCHER_PARALLEL_QUERIES")
                .ok()
                .and_then(|v| v.parse().ok()),
            shuffle: env::var("BATCHER_SHUFFLE")
                .ok()
                .and_then(|v| v.parse().ok()),
            results_path: env::var("BATCHER_RESULTS_PATH").ok().map(PathBuf::from),
        }
    }
}
