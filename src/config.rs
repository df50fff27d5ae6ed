// =============================================================================
// Pipeline configuration
// =============================================================================
//
// Loaded from `pipeline_config.json` at startup.  Every field has a serde
// default so a partial (or missing) file still yields a usable config; the
// binary falls back to defaults with a warning rather than refusing to run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::model::ModelConfig;

fn default_lookback() -> usize {
    60
}

fn default_horizon_days() -> usize {
    30
}

fn default_train_split() -> f64 {
    0.8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Window length the model sees per prediction.
    #[serde(default = "default_lookback")]
    pub lookback: usize,

    /// Cap on how many trailing rows the test partition keeps.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: usize,

    /// Chronological train share of the feature matrix.
    #[serde(default = "default_train_split")]
    pub train_split: f64,

    #[serde(default)]
    pub model: ModelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lookback: default_lookback(),
            horizon_days: default_horizon_days(),
            train_split: default_train_split(),
            model: ModelConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        info!(path = %path.display(), "pipeline config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = PipelineConfig::default();
        assert_eq!(config.lookback, 60);
        assert_eq!(config.horizon_days, 30);
        assert!((config.train_split - 0.8).abs() < 1e-12);
        assert_eq!(config.model.conv1_filters, 64);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"lookback": 45, "model": {"epochs": 5}}"#).unwrap();
        assert_eq!(config.lookback, 45);
        assert_eq!(config.horizon_days, 30);
        assert_eq!(config.model.epochs, 5);
        assert_eq!(config.model.batch_size, 64);
    }

    #[test]
    fn round_trips_through_json() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lookback, config.lookback);
        assert_eq!(back.model.lstm1_hidden, config.model.lstm1_hidden);
    }
}
