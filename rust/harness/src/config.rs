//! Configuration parsing for the experiment harness.

use std::path::{Path, PathBuf};

use foldwise_config::{
    ExperimentSettings, PartitionSettings, Regime, RegimeSettings, RegimeTable, TrainerSettings,
};
use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from TOML. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HarnessConfig {
    #[serde(default)]
    pub experiment: ExperimentSettings,
    #[serde(default)]
    pub partition: PartitionSettings,
    #[serde(default)]
    pub regimes: RegimeTable,
    #[serde(default)]
    pub trainer: TrainerSettings,
}

impl HarnessConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the harness cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        let experiment = &self.experiment;
        let partition = &self.partition;

        if experiment.runs == 0 {
            return invalid("experiment.runs must be > 0".into());
        }
        let fraction = experiment.sample_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return invalid(format!(
                "experiment.sample_fraction must be in (0, 1], got {fraction}"
            ));
        }
        if partition.validation_folds == 0 {
            return invalid("partition.validation_folds must be > 0".into());
        }
        if partition.folds < partition.validation_folds + 2 {
            return invalid(format!(
                "partition.folds ({}) must leave at least one training fold besides {} validation and 1 testing fold",
                partition.folds, partition.validation_folds
            ));
        }
        for regime in Regime::ALL {
            let settings: &RegimeSettings = self.regimes.get(regime);
            if settings.budget().is_empty() {
                return invalid(format!(
                    "regimes.{regime} budget must be non-zero, got {}",
                    settings.budget()
                ));
            }
            if settings.ledger.trim().is_empty() {
                return invalid(format!("regimes.{regime}.ledger must be set"));
            }
        }
        if self.regimes.short.ledger == self.regimes.long.ledger {
            return invalid(format!(
                "both regimes write to the same ledger '{}'",
                self.regimes.short.ledger
            ));
        }
        Ok(())
    }

    /// Path of the ledger file for `regime`.
    #[must_use]
    pub fn ledger_path(&self, regime: Regime) -> PathBuf {
        self.experiment
            .results_dir
            .join(&self.regimes.get(regime).ledger)
    }

    /// Number of (run, fold) cells in a complete experiment.
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.experiment.runs * self.partition.folds
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}
