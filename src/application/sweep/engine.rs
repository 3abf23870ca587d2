//! Sweep engine: turns a sweep configuration into jobs and runs them.

use crate::application::sweep::aggregator::{Aggregator, SweepStats};
use crate::application::sweep::executor::BoundedExecutor;
use crate::application::sweep::expander::{ParameterSpace, shuffle_combinations};
use crate::config::SweepConfig;
use crate::domain::errors::ConfigError;
use crate::domain::job::JobRequest;
use crate::domain::ports::{BacktestService, StrategySettingsLoader};
use rand::Rng;
use std::sync::Arc;
use tracing::info;

/// Jobs ready for execution, in admission order.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub requests: Vec<JobRequest>,
}

impl SweepPlan {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

pub struct SweepEngine {
    executor: BoundedExecutor,
    loader: Arc<dyn StrategySettingsLoader>,
}

impl SweepEngine {
    pub fn new(
        service: Arc<dyn BacktestService>,
        loader: Arc<dyn StrategySettingsLoader>,
        concurrency: usize,
    ) -> Self {
        Self {
            executor: BoundedExecutor::new(service, concurrency),
            loader,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.executor.concurrency()
    }

    /// Expands and builds every job. Configuration problems surface here,
    /// before anything is submitted.
    pub fn plan(&self, config: &SweepConfig) -> Result<SweepPlan, ConfigError> {
        self.plan_with_rng(config, &mut rand::rng())
    }

    pub fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        config: &SweepConfig,
        rng: &mut R,
    ) -> Result<SweepPlan, ConfigError> {
        let daterange = config.date_range()?;
        let mut combinations = ParameterSpace::from_config(config).expand(self.loader.as_ref())?;

        if config.shuffle {
            shuffle_combinations(&mut combinations, rng);
            info!("Combinations shuffled");
        }

        let requests = combinations
            .iter()
            .map(|combination| JobRequest::build(combination, daterange))
            .collect();

        Ok(SweepPlan { requests })
    }

    /// Runs every planned job; returns once all of them have resolved.
    pub async fn execute(&self, plan: SweepPlan, aggregator: &mut Aggregator) -> SweepStats {
        let stats = self.executor.run(plan.requests, aggregator).await;
        info!(
            total = stats.total,
            successes = stats.successes,
            empty = stats.empty,
            errors = stats.errors,
            record_failures = stats.record_failures,
            "Sweep finished"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sweep::aggregator::tests::MemoryRecorder;
    use crate::application::sweep::expander::tests::StaticLoader;
    use crate::domain::errors::JobError;
    use crate::domain::outcome::tests::gekko_response;
    use crate::domain::ranking::rank;
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::Value;

    const SWEEP: &str = r#"
        candle_sizes = [15, 60]
        history_sizes = [10, 20]
        trading_pairs = [["binance", "usdt", "btc"]]
        methods = ["MACD", "RSI"]
        parallel_queries = 2

        [daterange]
        from = "2018-01-01"
        to = "2018-02-01"
    "#;

    struct AlwaysProfitable;

    #[async_trait]
    impl BacktestService for AlwaysProfitable {
        async fn run_backtest(&self, request: &JobRequest) -> Result<Value, JobError> {
            Ok(gekko_response(request.trading_advisor.candle_size as f64 / 10.0))
        }
    }

    fn engine() -> SweepEngine {
        SweepEngine::new(Arc::new(AlwaysProfitable), Arc::new(StaticLoader::default()), 2)
    }

    #[test]
    fn test_plan_keeps_nested_order() {
        let config = SweepConfig::from_toml_str(SWEEP).unwrap();
        let plan = engine().plan(&config).unwrap();

        assert_eq!(plan.len(), 8);
        let labels: Vec<String> = plan.requests.iter().map(|r| r.label()).collect();
        assert_eq!(labels[0], "MACD USDT/BTC 15/10 Binance");
        assert_eq!(labels[1], "RSI USDT/BTC 15/10 Binance");
        assert_eq!(labels[7], "RSI USDT/BTC 60/20 Binance");
        assert!(plan.requests.iter().all(|r| r.backtest.daterange == config.date_range().unwrap()));
    }

    #[test]
    fn test_plan_shuffle_is_seeded_permutation() {
        let mut config = SweepConfig::from_toml_str(SWEEP).unwrap();
        let ordered = engine().plan(&config).unwrap();

        config.shuffle = true;
        let first = engine()
            .plan_with_rng(&config, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let second = engine()
            .plan_with_rng(&config, &mut StdRng::seed_from_u64(42))
            .unwrap();

        assert_eq!(first.requests, second.requests);
        assert_eq!(first.len(), ordered.len());
        for request in &ordered.requests {
            assert!(first.requests.contains(request));
        }
    }

    #[test]
    fn test_plan_missing_settings_fails() {
        let config = SweepConfig::from_toml_str(SWEEP).unwrap();
        let loader = StaticLoader {
            missing: vec!["MACD".to_string()],
            ..Default::default()
        };
        let engine = SweepEngine::new(Arc::new(AlwaysProfitable), Arc::new(loader), 2);

        assert!(matches!(
            engine.plan(&config),
            Err(ConfigError::StrategySettings { .. })
        ));
    }

    #[tokio::test]
    async fn test_execute_resolves_every_job() {
        let config = SweepConfig::from_toml_str(SWEEP).unwrap();
        let engine = engine();
        let plan = engine.plan(&config).unwrap();
        let recorder = Arc::new(MemoryRecorder::default());
        let mut aggregator = Aggregator::new(recorder.clone());

        let stats = engine.execute(plan, &mut aggregator).await;

        assert_eq!(stats.total, 8);
        assert_eq!(stats.successes, 8);
        assert_eq!(stats.resolved(), stats.total);
        assert_eq!(recorder.rows.lock().unwrap().len(), 8);
        let best = rank(aggregator.ranking(), 1);
        assert_eq!(best[0].relative_profit_pct, 6.0);
    }
}
