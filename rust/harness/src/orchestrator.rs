//! Drives the (run, fold, regime) cells in order and records each result.

use std::borrow::Cow;

use foldwise_config::Regime;
use foldwise_data::{Dataset, FoldSet, Partition, SeedStream, Split};
use foldwise_training::{TrainRequest, Trainer, accuracy};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::{
    HarnessError,
    config::HarnessConfig,
    state::{Cell, ExperimentState, LedgerPair},
};

/// Column header of the console report.
pub const REPORT_HEADER: &str = "TYPE\t\ti\tj\tacc\tmse";

/// Counts of what one [`Orchestrator::run`] call executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub cells: usize,
    pub short_records: usize,
    pub long_records: usize,
}

/// Progress bar over all cells of the experiment.
#[must_use]
pub fn cell_progress(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {msg:12} [{wide_bar:.cyan/blue}] {pos:>4}/{len:4} [{eta:>5}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#*-"),
    );
    pb
}

pub struct Orchestrator<'a, T: Trainer> {
    config: &'a HarnessConfig,
    source: &'a Dataset,
    trainer: T,
    ledgers: LedgerPair,
    progress: ProgressBar,
}

impl<'a, T: Trainer> Orchestrator<'a, T> {
    #[must_use]
    pub fn new(
        config: &'a HarnessConfig,
        source: &'a Dataset,
        trainer: T,
        ledgers: LedgerPair,
    ) -> Self {
        Self {
            config,
            source,
            trainer,
            ledgers,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on `progress` instead of a hidden bar.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn trainer(&self) -> &T {
        &self.trainer
    }

    /// Execute every cell from `state` to the end of the experiment.
    pub fn run(&mut self, mut state: ExperimentState) -> Result<RunSummary, HarnessError> {
        let runs = self.config.experiment.runs;
        let folds = self.config.partition.folds;
        let mut summary = RunSummary::default();

        let start = state.start(folds);
        self.progress.set_position(start.ordinal(folds).min(runs * folds) as u64);
        if start.run >= runs {
            tracing::info!("Nothing left to run");
            return Ok(summary);
        }
        self.progress.suspend(|| println!("{REPORT_HEADER}"));

        for run in start.run..runs {
            let first_fold = if run == start.run { start.fold } else { 0 };
            let mut stream = SeedStream::new(self.config.experiment.run_seed(run));
            let shuffled = self.source.shuffled(&mut stream);
            let sampled: Cow<'_, Dataset> =
                shuffled.subsample(self.config.experiment.sample_fraction)?;
            let fold_set = FoldSet::stratified(&sampled, folds)?;
            tracing::info!(
                "Run {run}: {} samples in {folds} folds (seed {})",
                sampled.len(),
                stream.seed()
            );

            // Replay the rotation draws of folds already on disk so the
            // stream is where an uninterrupted run would have left it.
            for fold in 0..first_fold {
                self.partition(fold, &mut stream)?;
            }

            for fold in first_fold..folds {
                let cell = Cell::new(run, fold);
                let partition = self.partition(fold, &mut stream)?;
                tracing::debug!("Cell {cell}: {partition}");
                let split = fold_set.materialize(&partition)?;

                self.progress.set_message(format!("i={run} j={fold}"));
                if state.short_enabled() {
                    self.run_regime(Regime::Short, cell, &split)?;
                    summary.short_records += 1;
                } else {
                    tracing::info!("Cell {cell}: short budget already recorded, skipping");
                }
                self.run_regime(Regime::Long, cell, &split)?;
                summary.long_records += 1;

                summary.cells += 1;
                state = state.advance(cell);
                self.progress.inc(1);
            }
        }

        self.progress.finish_with_message("done");
        tracing::info!(
            "Experiment complete: {} cells ({} short, {} long records)",
            summary.cells,
            summary.short_records,
            summary.long_records
        );
        Ok(summary)
    }

    fn partition(&self, fold: usize, stream: &mut SeedStream) -> Result<Partition, HarnessError> {
        let partition = &self.config.partition;
        Ok(Partition::select(
            fold,
            partition.folds,
            partition.validation_folds,
            stream,
        )?)
    }

    /// Train, score and record one regime on one cell.
    fn run_regime(&mut self, regime: Regime, cell: Cell, split: &Split) -> Result<(), HarnessError> {
        let settings = self.config.regimes.get(regime);
        let merged;
        let refinement = match regime {
            Regime::Short => &split.training,
            Regime::Long => {
                merged = split.merged_for_full_training()?;
                &merged
            }
        };
        let request = TrainRequest {
            regime,
            training: &split.training,
            validation: &split.validation,
            refinement,
            budget: settings.budget(),
            seed: self.config.experiment.cell_seed(
                cell.run,
                cell.fold,
                self.config.partition.folds,
            ),
        };
        request.validate()?;

        tracing::debug!("Cell {cell}: training {regime} ({})", request.budget);
        let model = self.trainer.train(&request)?;
        let score = accuracy(&model, &split.testing)?;
        let mse = self.trainer.holdout_error(&model, &split.testing)?;

        self.ledgers.append(regime, cell, score, mse)?;
        self.progress.suspend(|| {
            println!(
                "{}\t{}\t{}\t{:.4}\t{:.4}",
                settings.label, cell.run, cell.fold, -score, mse
            );
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use foldwise_config::Budget;
    use foldwise_training::{Model, TrainError};
    use tempfile::tempdir;

    use super::*;
    use crate::{resume::ResumePoint, state::LedgerProbe};

    /// Predicts the class stored in the first input.
    struct Oracle {
        outputs: usize,
    }

    impl Model for Oracle {
        fn num_inputs(&self) -> usize {
            1
        }

        fn num_outputs(&self) -> usize {
            self.outputs
        }

        fn forward(&self, input: &[f64], output: &mut [f64]) {
            output.fill(0.0);
            output[input[0] as usize] = 1.0;
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Regime, Budget, u64, usize, usize)>,
    }

    impl Trainer for Recorder {
        type Model = Oracle;

        fn train(&mut self, request: &TrainRequest<'_>) -> Result<Oracle, TrainError> {
            self.calls.push((
                request.regime,
                request.budget,
                request.seed,
                request.training.len(),
                request.refinement.len(),
            ));
            Ok(Oracle {
                outputs: request.training.num_outputs(),
            })
        }

        fn holdout_error(&self, _: &Oracle, _: &Dataset) -> Result<f64, TrainError> {
            Ok(0.0)
        }
    }

    /// 40 samples, 2 classes, the class id in the only input.
    fn dataset() -> Dataset {
        let inputs: Vec<Vec<f64>> = (0..40).map(|i| vec![f64::from(i % 2)]).collect();
        let outputs: Vec<Vec<f64>> = (0..40)
            .map(|i| if i % 2 == 0 { vec![1.0, 0.0] } else { vec![0.0, 1.0] })
            .collect();
        Dataset::from_rows(&inputs, &outputs).unwrap()
    }

    fn config(dir: &Path) -> HarnessConfig {
        let mut config = HarnessConfig::default();
        config.experiment.results_dir = dir.to_path_buf();
        config.experiment.runs = 2;
        config.partition.folds = 4;
        config.partition.validation_folds = 1;
        config
    }

    #[test]
    fn test_full_run_records_every_cell() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());
        let data = dataset();
        let (ledgers, _) = LedgerPair::open_for(&config).unwrap();

        let mut orchestrator = Orchestrator::new(&config, &data, Recorder::default(), ledgers);
        let summary = orchestrator.run(ExperimentState::NotStarted).unwrap();
        assert_eq!(
            summary,
            RunSummary {
                cells: 8,
                short_records: 8,
                long_records: 8
            }
        );

        let calls = &orchestrator.trainer().calls;
        assert_eq!(calls.len(), 16);
        // short before long on each cell, same cell seed for both
        assert_eq!(calls[0].0, Regime::Short);
        assert_eq!(calls[1].0, Regime::Long);
        assert_eq!(calls[0].2, 5);
        assert_eq!(calls[1].2, 5);
        assert_eq!(calls[15].2, (4 + 3) as u64 + 5);
        // long refines on training + validation: 2 + 1 folds of 10
        assert_eq!((calls[0].3, calls[0].4), (20, 20));
        assert_eq!((calls[1].3, calls[1].4), (20, 30));
        assert_eq!(calls[1].1, config.regimes.long.budget());

        let probe = LedgerProbe::inspect(
            &config.ledger_path(Regime::Short),
            &config.ledger_path(Regime::Long),
        )
        .unwrap();
        let long = probe.records(Regime::Long);
        assert_eq!(long.len(), 8);
        assert!(long.iter().all(|r| (r.accuracy - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_resume_skips_short_on_first_cell_only() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());
        let data = dataset();
        let (ledgers, _) = LedgerPair::open_for(&config).unwrap();

        let mut orchestrator = Orchestrator::new(&config, &data, Recorder::default(), ledgers);
        let state = ExperimentState::Resuming(ResumePoint {
            run: 1,
            fold: 2,
            run_short: false,
        });
        let summary = orchestrator.run(state).unwrap();
        assert_eq!(
            summary,
            RunSummary {
                cells: 2,
                short_records: 1,
                long_records: 2
            }
        );
        let regimes: Vec<Regime> = orchestrator.trainer().calls.iter().map(|c| c.0).collect();
        assert_eq!(regimes, [Regime::Long, Regime::Short, Regime::Long]);
    }
}
