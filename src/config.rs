//! Workspace configuration
//!
//! Every field has a default, so an empty JSON object is a valid configuration.

use crate::commands::{VsmError, VsmResult};
use crate::history::DEFAULT_CAPACITY;
use crate::metrics::DEFAULT_TAKT_HYSTERESIS;
use crate::simulation::{KanbanPropagation, ShortagePolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables of a [`VsmWorkspace`](crate::workspace::VsmWorkspace)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VsmConfig {
    /// Retained undo snapshots
    pub history_capacity: usize,
    /// Simulation tick period in milliseconds
    pub tick_interval_ms: u64,
    /// Minimum difference before calculated takt overwrites the visible takt
    pub takt_hysteresis: f64,
    /// Takt of a fresh workspace, seconds
    pub default_takt: f64,
    /// Per-tick probability of a random customer shortage
    pub shortage_probability: f64,
    /// How customer shortages are decided
    pub shortage_policy: ShortagePolicy,
    /// Which node state the kanban edge pass reads
    pub kanban_propagation: KanbanPropagation,
    /// Horizontal gap when merging templates and generated maps
    pub merge_gap: f64,
    /// Horizontal gap when merging generative results
    pub generative_merge_gap: f64,
    /// Seed for the simulation's random source; random when absent
    pub rng_seed: Option<u64>,
}

impl Default for VsmConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            tick_interval_ms: 500,
            takt_hysteresis: DEFAULT_TAKT_HYSTERESIS,
            default_takt: 60.0,
            shortage_probability: 0.05,
            shortage_policy: ShortagePolicy::Random,
            kanban_propagation: KanbanPropagation::Lagged,
            merge_gap: 300.0,
            generative_merge_gap: 400.0,
            rng_seed: None,
        }
    }
}

impl VsmConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> VsmResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> VsmResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check value ranges
    pub fn validate(&self) -> VsmResult<()> {
        if self.history_capacity == 0 {
            return Err(VsmError::Validation(
                "historyCapacity must be at least 1".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(VsmError::Validation(
                "tickIntervalMs must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.shortage_probability) {
            return Err(VsmError::Validation(
                "shortageProbability must be within [0, 1]".to_string(),
            ));
        }
        if self.takt_hysteresis < 0.0 || self.default_takt < 0.0 {
            return Err(VsmError::Validation(
                "taktHysteresis and defaultTakt must not be negative".to_string(),
            ));
        }
        if self.merge_gap < 0.0 || self.generative_merge_gap < 0.0 {
            return Err(VsmError::Validation(
                "merge gaps must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Tick period
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
