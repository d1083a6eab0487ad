pub mod topology_config;

pub use topology_config::*;

use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use crate::RouterId;
use crate::error::ConfigError;

pub const DEFAULT_STABILITY_THRESHOLD: usize = 2;
pub const DEFAULT_MAX_ROUNDS: usize = 20;
pub const DEFAULT_TURN_INTERVAL_MS: u64 = 800;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Consecutive rounds without any update before declaring convergence.
    pub stability_threshold: usize,
    /// Hard cap on rounds. When unset, see [`SimulationConfig::max_rounds_for`].
    pub max_rounds: Option<usize>,
    /// Delay between turns when pacing a run. 0 runs turns back to back.
    pub turn_interval_ms: u64,
    /// Round-robin order. Defaults to node declaration order.
    pub order: Option<Vec<RouterId>>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            stability_threshold: DEFAULT_STABILITY_THRESHOLD,
            max_rounds: None,
            turn_interval_ms: DEFAULT_TURN_INTERVAL_MS,
            order: None,
        }
    }
}

impl SimulationConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stability_threshold == 0 {
            return Err(ConfigError::InvalidSetting(
                "stability_threshold must be at least 1".to_string(),
            ));
        }
        if self.max_rounds == Some(0) {
            return Err(ConfigError::InvalidSetting(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Explicit `max_rounds`, or else 20 rounds, raised for larger networks
    /// so that a connected graph always has room for its N-1 propagation
    /// rounds plus the quiet rounds.
    pub fn max_rounds_for(&self, node_count: usize) -> usize {
        self.max_rounds.unwrap_or_else(|| {
            DEFAULT_MAX_ROUNDS.max(node_count + self.stability_threshold + 1)
        })
    }

    pub fn turn_interval(&self) -> Duration {
        Duration::from_millis(self.turn_interval_ms)
    }
}
