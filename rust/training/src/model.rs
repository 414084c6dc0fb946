//! The contract between the harness and an external trainer.
//!
//! The harness never looks inside a model. It only needs the model's arity
//! and a forward pass for scoring, plus the trainer's own error measure on a
//! held-out set.

use foldwise_config::{Budget, Regime};
use foldwise_data::Dataset;

use crate::ScoreError;

/// A trained predictor.
pub trait Model {
    fn num_inputs(&self) -> usize;
    fn num_outputs(&self) -> usize;

    /// Evaluate one sample. `input.len() == num_inputs()` and
    /// `output.len() == num_outputs()`.
    fn forward(&self, input: &[f64], output: &mut [f64]);
}

/// Everything a trainer receives for one (run, fold, regime) invocation.
#[derive(Debug, Clone, Copy)]
pub struct TrainRequest<'a> {
    pub regime: Regime,
    /// Data for the search phase.
    pub training: &'a Dataset,
    /// Data used for model selection.
    pub validation: &'a Dataset,
    /// Data for gradient refinement: the training split for the short regime,
    /// training+validation for the long one.
    pub refinement: &'a Dataset,
    pub budget: Budget,
    /// Cell seed; the trainer owns the stream it builds from this.
    pub seed: u64,
}

impl TrainRequest<'_> {
    /// Reject requests no trainer could honour.
    pub fn validate(&self) -> Result<(), TrainError> {
        if self.budget.is_empty() {
            return Err(TrainError::InvalidRequest(format!(
                "empty budget ({})",
                self.budget
            )));
        }
        if self.refinement.is_empty() || self.training.is_empty() {
            return Err(TrainError::InvalidRequest("no training samples".into()));
        }
        let arity = (self.training.num_inputs(), self.training.num_outputs());
        for (name, data) in [
            ("validation", self.validation),
            ("refinement", self.refinement),
        ] {
            if (data.num_inputs(), data.num_outputs()) != arity {
                return Err(TrainError::InvalidRequest(format!(
                    "{name} arity {}x{} differs from training {}x{}",
                    data.num_inputs(),
                    data.num_outputs(),
                    arity.0,
                    arity.1
                )));
            }
        }
        Ok(())
    }
}

/// A black box turning data, a budget and a seed into a model.
pub trait Trainer {
    type Model: Model;

    /// Blocking; returns only once the budget is spent or training converged.
    fn train(&mut self, request: &TrainRequest<'_>) -> Result<Self::Model, TrainError>;

    /// The trainer's own error measure of `model` on held-out data.
    fn holdout_error(&self, model: &Self::Model, testing: &Dataset) -> Result<f64, TrainError>;
}

/// Errors reported by a trainer.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("invalid training request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("trainer failed: {0}")]
    Failed(String),
}
