//! Bounded-concurrency execution of backtest jobs.

use crate::application::sweep::aggregator::{Aggregator, SweepStats};
use crate::domain::errors::JobError;
use crate::domain::job::JobRequest;
use crate::domain::outcome::{JobOutcome, classify};
use crate::domain::ports::BacktestService;
use futures::StreamExt;
use futures::stream;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs jobs against a [`BacktestService`] with at most `concurrency` in flight.
///
/// Jobs are admitted in input order; a new job is admitted only when a running
/// one resolves. Each job runs in its own task so a failure or panic in one
/// never affects the others. There is no executor-level timeout: a request
/// that never resolves keeps its slot until the client gives up.
pub struct BoundedExecutor {
    service: Arc<dyn BacktestService>,
    concurrency: usize,
}

impl BoundedExecutor {
    /// A `concurrency` of zero is treated as one.
    pub fn new(service: Arc<dyn BacktestService>, concurrency: usize) -> Self {
        Self {
            service,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Executes every request and feeds each outcome to `aggregator` as it
    /// arrives. Returns once all jobs have resolved.
    pub async fn run(&self, requests: Vec<JobRequest>, aggregator: &mut Aggregator) -> SweepStats {
        let total = requests.len();
        info!(
            jobs = total,
            concurrency = self.concurrency,
            "Starting backtests"
        );

        let mut outcomes = stream::iter(requests)
            .map(|request| {
                let service = Arc::clone(&self.service);
                let job = request.label();
                info!(job = %job, "Started");
                let handle = tokio::spawn(async move {
                    let response = service.run_backtest(&request).await;
                    classify(&response)
                });
                async move {
                    let outcome = handle.await.unwrap_or_else(|e| JobOutcome::Error {
                        cause: JobError::Transport {
                            reason: format!("backtest task aborted: {}", e),
                        },
                    });
                    (job, outcome)
                }
            })
            .buffer_unordered(self.concurrency);

        let mut resolved = 0;
        while let Some((job, outcome)) = outcomes.next().await {
            resolved += 1;
            debug!(job = %job, resolved, total, "Job resolved");
            aggregator.record(&job, outcome);
        }

        aggregator.stats(total)
    }
}
