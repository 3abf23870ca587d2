//! Loads per-method strategy settings from Gekko's TOML files.

use crate::domain::errors::ConfigError;
use crate::domain::ports::StrategySettingsLoader;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Reads `<dir>/<method>.toml` and hands the table on as JSON.
pub struct TomlStrategyLoader {
    dir: PathBuf,
}

impl TomlStrategyLoader {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn settings_path(&self, method: &str) -> PathBuf {
        self.dir.join(format!("{}.toml", method))
    }
}

impl StrategySettingsLoader for TomlStrategyLoader {
    fn load(&self, method: &str) -> Result<Value, ConfigError> {
        let path = self.settings_path(method);
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::StrategySettings {
            method: method.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let table: toml::Table =
            toml::from_str(&content).map_err(|e| ConfigError::StrategySettings {
                method: method.to_string(),
                reason: format!("failed to parse {}: {}", path.display(), e),
            })?;
        let settings = serde_json::to_value(table).map_err(|e| ConfigError::StrategySettings {
            method: method.to_string(),
            reason: e.to_string(),
        })?;

        debug!(method, path = %path.display(), "Loaded strategy settings");
        Ok(settings)
    }
}
