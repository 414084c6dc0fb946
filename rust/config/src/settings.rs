//! Experiment, partitioning, regime and trainer settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Budget, Regime};

/// Outer-loop experiment settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExperimentSettings {
    /// Dataset file to load.
    #[serde(default = "default_dataset")]
    pub dataset: PathBuf,
    /// Directory holding the two regime ledgers.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Number of independent reshuffle-and-refold cycles.
    #[serde(default = "default_runs")]
    pub runs: usize,
    /// Fraction of the shuffled dataset kept, in `(0, 1]`.
    #[serde(default = "default_sample_fraction")]
    pub sample_fraction: f64,
    /// Run `i` shuffles with seed `i + run_seed_offset`.
    #[serde(default = "default_run_seed_offset")]
    pub run_seed_offset: u64,
    /// Added to the cell index to form the trainer seed.
    #[serde(default = "default_cell_seed_offset")]
    pub cell_seed_offset: u64,
}

fn default_dataset() -> PathBuf {
    PathBuf::from("./datasets/iris.txt")
}
fn default_results_dir() -> PathBuf {
    PathBuf::from("./results")
}
fn default_runs() -> usize {
    3
}
fn default_sample_fraction() -> f64 {
    1.0
}
fn default_run_seed_offset() -> u64 {
    50
}
fn default_cell_seed_offset() -> u64 {
    5
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            results_dir: default_results_dir(),
            runs: default_runs(),
            sample_fraction: default_sample_fraction(),
            run_seed_offset: default_run_seed_offset(),
            cell_seed_offset: default_cell_seed_offset(),
        }
    }
}

impl ExperimentSettings {
    /// Seed of the shuffle/rotation stream for outer run `run`.
    #[must_use]
    pub fn run_seed(&self, run: usize) -> u64 {
        run as u64 + self.run_seed_offset
    }

    /// Seed handed to the trainer for cell `(run, fold)`.
    #[must_use]
    pub fn cell_seed(&self, run: usize, fold: usize, folds: usize) -> u64 {
        (run * folds + fold) as u64 + self.cell_seed_offset
    }
}

/// Fold construction and rotation settings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartitionSettings {
    #[serde(default = "default_folds")]
    pub folds: usize,
    /// Folds drawn for validation on each rotation; the rest (minus the
    /// testing fold) are training.
    #[serde(default = "default_validation_folds")]
    pub validation_folds: usize,
}

fn default_folds() -> usize {
    10
}
fn default_validation_folds() -> usize {
    2
}

impl Default for PartitionSettings {
    fn default() -> Self {
        Self {
            folds: default_folds(),
            validation_folds: default_validation_folds(),
        }
    }
}

impl PartitionSettings {
    #[must_use]
    pub fn training_folds(&self) -> usize {
        self.folds.saturating_sub(self.validation_folds + 1)
    }
}

/// Per-regime settings: console label, ledger file and budget.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RegimeSettings {
    pub label: String,
    /// Ledger file name, relative to `results_dir`.
    pub ledger: String,
    pub generations: usize,
    pub epochs: usize,
}

impl RegimeSettings {
    #[must_use]
    pub fn budget(&self) -> Budget {
        Budget::new(self.generations, self.epochs)
    }

    #[must_use]
    pub fn default_for(regime: Regime) -> Self {
        match regime {
            Regime::Short => Self {
                label: "SHORT".into(),
                ledger: "short_budget.txt".into(),
                generations: 64,
                epochs: 4000,
            },
            Regime::Long => Self {
                label: "LONG".into(),
                ledger: "long_budget.txt".into(),
                generations: 40000,
                epochs: 40000,
            },
        }
    }
}

fn default_short() -> RegimeSettings {
    RegimeSettings::default_for(Regime::Short)
}
fn default_long() -> RegimeSettings {
    RegimeSettings::default_for(Regime::Long)
}

/// Settings for both regimes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RegimeTable {
    #[serde(default = "default_short")]
    pub short: RegimeSettings,
    #[serde(default = "default_long")]
    pub long: RegimeSettings,
}

impl Default for RegimeTable {
    fn default() -> Self {
        Self {
            short: default_short(),
            long: default_long(),
        }
    }
}

impl RegimeTable {
    #[must_use]
    pub fn get(&self, regime: Regime) -> &RegimeSettings {
        match regime {
            Regime::Short => &self.short,
            Regime::Long => &self.long,
        }
    }
}

/// Baseline trainer hyperparameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainerSettings {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Initial weights are drawn from `[-weight_range, weight_range]`.
    #[serde(default = "default_weight_range")]
    pub weight_range: f64,
}

fn default_learning_rate() -> f64 {
    0.1
}
fn default_weight_range() -> f64 {
    5.0
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            weight_range: default_weight_range(),
        }
    }
}
