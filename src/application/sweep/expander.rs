//! Expansion of the sweep dimensions into individual parameter combinations.

use crate::config::SweepConfig;
use crate::domain::errors::ConfigError;
use crate::domain::parameters::{ParameterCombination, TradingPair};
use crate::domain::ports::StrategySettingsLoader;
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// The four sweep dimensions, in expansion order (outermost first).
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpace {
    pub candle_sizes: Vec<u32>,
    pub history_sizes: Vec<u32>,
    pub trading_pairs: Vec<TradingPair>,
    pub methods: Vec<String>,
}

impl ParameterSpace {
    pub fn from_config(config: &SweepConfig) -> Self {
        Self {
            candle_sizes: config.candle_sizes.clone(),
            history_sizes: config.history_sizes.clone(),
            trading_pairs: config.trading_pairs.clone(),
            methods: config.methods.clone(),
        }
    }

    /// Number of combinations `expand` produces.
    pub fn len(&self) -> usize {
        self.candle_sizes.len()
            * self.history_sizes.len()
            * self.trading_pairs.len()
            * self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product, candle size outermost and method innermost.
    ///
    /// Strategy settings are loaded for every distinct method before anything
    /// is generated; a single failed load aborts the whole expansion.
    pub fn expand(
        &self,
        loader: &dyn StrategySettingsLoader,
    ) -> Result<Vec<ParameterCombination>, ConfigError> {
        let mut settings: HashMap<&str, Arc<Value>> = HashMap::new();
        for method in &self.methods {
            if !settings.contains_key(method.as_str()) {
                settings.insert(method.as_str(), Arc::new(loader.load(method)?));
            }
        }

        let mut combinations = Vec::with_capacity(self.len());
        for &candle_size in &self.candle_sizes {
            for &history_size in &self.history_sizes {
                for trading_pair in &self.trading_pairs {
                    for method in &self.methods {
                        combinations.push(ParameterCombination {
                            candle_size,
                            history_size,
                            trading_pair: trading_pair.clone(),
                            method: method.clone(),
                            strategy_settings: Arc::clone(&settings[method.as_str()]),
                        });
                    }
                }
            }
        }

        info!(
            combinations = combinations.len(),
            methods = settings.len(),
            "Parameter space expanded"
        );
        Ok(combinations)
    }
}

/// Uniformly permutes the whole job list once.
pub fn shuffle_combinations<R: Rng + ?Sized>(
    combinations: &mut [ParameterCombination],
    rng: &mut R,
) {
    combinations.shuffle(rng);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Returns `{ "name": <method> }` and remembers every lookup.
    #[derive(Default)]
    pub(crate) struct StaticLoader {
        pub missing: Vec<String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl StrategySettingsLoader for StaticLoader {
        fn load(&self, method: &str) -> Result<Value, ConfigError> {
            self.calls.lock().unwrap().push(method.to_string());
            if self.missing.iter().any(|m| m == method) {
                return Err(ConfigError::StrategySettings {
                    method: method.to_string(),
                    reason: "no such file".to_string(),
                });
            }
            Ok(json!({ "name": method }))
        }
    }

    pub(crate) fn space() -> ParameterSpace {
        ParameterSpace {
            candle_sizes: vec![15, 60],
            history_sizes: vec![10, 20, 30],
            trading_pairs: vec![
                TradingPair::new("binance", "usdt", "btc"),
                TradingPair::new("poloniex", "btc", "eth"),
            ],
            methods: vec!["MACD".to_string(), "RSI".to_string(), "DEMA".to_string()],
        }
    }

    #[test]
    fn test_expand_produces_full_product() {
        let space = space();
        let combinations = space.expand(&StaticLoader::default()).unwrap();

        assert_eq!(combinations.len(), 2 * 3 * 2 * 3);
        assert_eq!(combinations.len(), space.len());

        let distinct: HashSet<_> = combinations
            .iter()
            .map(|c| {
                (
                    c.candle_size,
                    c.history_size,
                    c.trading_pair.clone(),
                    c.method.clone(),
                )
            })
            .collect();
        assert_eq!(distinct.len(), combinations.len());

        for combination in &combinations {
            assert!(space.trading_pairs.contains(&combination.trading_pair));
            assert!(space.methods.contains(&combination.method));
            assert_eq!(combination.strategy_settings["name"], combination.method);
        }
    }

    #[test]
    fn test_expand_nested_order() {
        let combinations = space().expand(&StaticLoader::default()).unwrap();

        let first = &combinations[0];
        assert_eq!((first.candle_size, first.history_size), (15, 10));
        assert_eq!(first.method, "MACD");
        assert_eq!(combinations[1].method, "RSI");
        assert_eq!(combinations[2].method, "DEMA");
        assert_eq!(combinations[3].trading_pair.exchange, "poloniex");
        assert_eq!(combinations[6].history_size, 20);
        assert_eq!(combinations[18].candle_size, 60);
    }

    #[test]
    fn test_settings_loaded_once_per_method() {
        let mut space = space();
        space.methods.push("MACD".to_string());
        let loader = StaticLoader::default();

        let combinations = space.expand(&loader).unwrap();

        assert_eq!(combinations.len(), 2 * 3 * 2 * 4);
        assert_eq!(*loader.calls.lock().unwrap(), vec!["MACD", "RSI", "DEMA"]);
    }

    #[test]
    fn test_missing_settings_abort_expansion() {
        let loader = StaticLoader {
            missing: vec!["RSI".to_string()],
            ..Default::default()
        };
        let err = space().expand(&loader).unwrap_err();
        assert!(matches!(err, ConfigError::StrategySettings { ref method, .. } if method == "RSI"));
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let ordered = space().expand(&StaticLoader::default()).unwrap();
        let mut shuffled = ordered.clone();
        shuffle_combinations(&mut shuffled, &mut StdRng::seed_from_u64(7));

        assert_eq!(shuffled.len(), ordered.len());
        assert_ne!(shuffled, ordered);
        for combination in &ordered {
            assert!(shuffled.contains(combination));
        }
    }
}
