//! Collects job outcomes as they complete.
//!
//! The aggregator is the only holder of sweep results. Every success is
//! appended to the durable record first and only then counted and ranked, so
//! the live view never runs ahead of what is on disk.

use crate::domain::errors::JobError;
use crate::domain::outcome::JobOutcome;
use crate::domain::ports::ResultRecorder;
use crate::domain::ranking::RankingRow;
use crate::domain::record::ResultRecord;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

/// Failure reported on the sweep's failure channel.
#[derive(Debug, Clone, PartialEq)]
pub enum JobFailure {
    /// The backtest request itself failed
    Backtest { job: String, cause: JobError },
    /// The backtest succeeded but its row could not be recorded
    Record { job: String, reason: String },
}

/// Final tally of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepStats {
    pub total: usize,
    pub successes: usize,
    pub empty: usize,
    pub errors: usize,
    pub record_failures: usize,
}

impl SweepStats {
    /// Outcomes that reached the aggregator.
    pub fn resolved(&self) -> usize {
        self.successes + self.empty + self.errors + self.record_failures
    }
}

pub struct Aggregator {
    recorder: Arc<dyn ResultRecorder>,
    failures: Option<UnboundedSender<JobFailure>>,
    success_count: usize,
    empty_count: usize,
    error_count: usize,
    record_failure_count: usize,
    ranking: Vec<RankingRow>,
}

impl Aggregator {
    pub fn new(recorder: Arc<dyn ResultRecorder>) -> Self {
        Self {
            recorder,
            failures: None,
            success_count: 0,
            empty_count: 0,
            error_count: 0,
            record_failure_count: 0,
            ranking: Vec::new(),
        }
    }

    /// Routes failures to `sender` instead of logging them here.
    pub fn with_failure_channel(mut self, sender: UnboundedSender<JobFailure>) -> Self {
        self.failures = Some(sender);
        self
    }

    /// Consumes one outcome. Called once per job, in completion order.
    pub fn record(&mut self, job: &str, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Success(summary) => {
                let record = ResultRecord::from_summary(&summary, Utc::now());
                if let Err(e) = self.recorder.append(&record) {
                    self.record_failure_count += 1;
                    self.report(JobFailure::Record {
                        job: job.to_string(),
                        reason: e.to_string(),
                    });
                    return;
                }
                self.success_count += 1;
                self.ranking.push(RankingRow::from(summary.as_ref()));
                info!(
                    job,
                    relative_profit = summary.performance.relative_profit,
                    "Complete"
                );
            }
            JobOutcome::Empty => {
                self.empty_count += 1;
                info!(job, "No trades");
            }
            JobOutcome::Error { cause } => {
                self.error_count += 1;
                self.report(JobFailure::Backtest {
                    job: job.to_string(),
                    cause,
                });
            }
        }
    }

    fn report(&self, failure: JobFailure) {
        let failure = match &self.failures {
            Some(sender) => match sender.send(failure) {
                Ok(()) => return,
                // Receiver gone: fall back to logging
                Err(unsent) => unsent.0,
            },
            None => failure,
        };
        log_failure(&failure);
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn ranking(&self) -> &[RankingRow] {
        &self.ranking
    }

    pub fn record_location(&self) -> String {
        self.recorder.location()
    }

    pub fn stats(&self, total: usize) -> SweepStats {
        SweepStats {
            total,
            successes: self.success_count,
            empty: self.empty_count,
            errors: self.error_count,
            record_failures: self.record_failure_count,
        }
    }
}

/// Log line for one failure.
pub fn log_failure(failure: &JobFailure) {
    match failure {
        JobFailure::Backtest { job, cause } => warn!(job = %job, error = %cause, "Backtest failed"),
        JobFailure::Record { job, reason } => {
            error!(job = %job, error = %reason, "Failed to record result")
        }
    }
}
