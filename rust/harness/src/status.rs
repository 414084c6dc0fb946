//! Read-only summary of the ledgers, for the `status` subcommand.

use std::{fmt, path::PathBuf};

use foldwise_config::Regime;
use serde::Serialize;

use crate::{
    config::HarnessConfig,
    state::{LedgerError, LedgerProbe, Record, Suggestion, read_records},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerStatus {
    pub regime: Regime,
    pub label: String,
    pub path: PathBuf,
    pub present: bool,
    pub records: usize,
    pub mean_accuracy: Option<f64>,
    pub mean_mse: Option<f64>,
}

impl LedgerStatus {
    fn collect(config: &HarnessConfig, regime: Regime) -> Result<Self, LedgerError> {
        let path = config.ledger_path(regime);
        let present = path.exists();
        let records = if present {
            read_records(&path)?
        } else {
            Vec::new()
        };
        let mean = |field: fn(&Record) -> f64| {
            (!records.is_empty())
                .then(|| records.iter().map(field).sum::<f64>() / records.len() as f64)
        };

        Ok(Self {
            regime,
            label: config.regimes.get(regime).label.clone(),
            mean_accuracy: mean(|r: &Record| r.accuracy),
            mean_mse: mean(|r: &Record| r.mse),
            records: records.len(),
            path,
            present,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub total_cells: usize,
    pub ledgers: Vec<LedgerStatus>,
    /// `None` when the next `run` starts fresh.
    pub suggestion: Option<Suggestion>,
}

impl StatusReport {
    pub fn collect(config: &HarnessConfig) -> Result<Self, LedgerError> {
        let ledgers = Regime::ALL
            .into_iter()
            .map(|regime| LedgerStatus::collect(config, regime))
            .collect::<Result<Vec<_>, _>>()?;
        let probe = LedgerProbe::inspect(
            &config.ledger_path(Regime::Short),
            &config.ledger_path(Regime::Long),
        )?;

        Ok(Self {
            total_cells: config.total_cells(),
            ledgers,
            suggestion: probe
                .suggested_resume(config.experiment.runs, config.partition.folds),
        })
    }
}

impl StatusReport {
    /// Keep only the ledger of `regime`.
    #[must_use]
    pub fn only(mut self, regime: Regime) -> Self {
        self.ledgers.retain(|ledger| ledger.regime == regime);
        self
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Ledger Status ===")?;
        for ledger in &self.ledgers {
            write!(f, "{:6} {}: ", ledger.label, ledger.path.display())?;
            if !ledger.present {
                writeln!(f, "MISSING")?;
                continue;
            }
            write!(f, "{}/{} records", ledger.records, self.total_cells)?;
            if let (Some(acc), Some(mse)) = (ledger.mean_accuracy, ledger.mean_mse) {
                write!(f, " (mean acc {acc:.4}, mean mse {mse:.4})")?;
            }
            writeln!(f)?;
        }
        match self.suggestion {
            None => writeln!(f, "Next run starts fresh."),
            Some(Suggestion::Complete) => writeln!(f, "All cells recorded."),
            Some(Suggestion::Resume(point)) => writeln!(f, "Resume at {point}"),
        }
    }
}
