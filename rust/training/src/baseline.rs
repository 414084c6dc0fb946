//! A minimal trainer that honours the [`Trainer`] contract.
//!
//! One dense sigmoid layer trained by full-batch gradient descent on MSE.
//! After every epoch the validation error is measured and the best weights
//! seen so far are kept, so the validation split drives model selection the
//! way it would for a real search-based trainer. There is no evolutionary
//! phase: the generation budget is only logged.

use foldwise_config::TrainerSettings;
use foldwise_data::{Dataset, SeedStream};

use crate::{Model, TrainError, TrainRequest, Trainer, mean_squared_error};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Single-layer sigmoid network. Weights are row-major
/// `(num_outputs, num_inputs + 1)` with the bias last in each row.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    weights: Vec<f64>,
    num_inputs: usize,
    num_outputs: usize,
}

impl LinearModel {
    /// Weights drawn uniformly from `[-range, range]`.
    #[must_use]
    pub fn random(
        num_inputs: usize,
        num_outputs: usize,
        range: f64,
        stream: &mut SeedStream,
    ) -> Self {
        let weights = (0..num_outputs * (num_inputs + 1))
            .map(|_| stream.symmetric(range))
            .collect();
        Self {
            weights,
            num_inputs,
            num_outputs,
        }
    }

    #[inline]
    fn row(&self, o: usize) -> &[f64] {
        let stride = self.num_inputs + 1;
        &self.weights[o * stride..(o + 1) * stride]
    }

    /// One full-batch gradient step on the MSE over `data`.
    fn step(&mut self, data: &Dataset, lr: f64, grads: &mut [f64], output: &mut [f64]) {
        grads.fill(0.0);
        let stride = self.num_inputs + 1;
        let scale = 2.0 / (data.len() * self.num_outputs) as f64;

        for i in 0..data.len() {
            let x = data.input(i);
            self.forward(x, output);
            for (o, (&y, &t)) in output.iter().zip(data.output(i)).enumerate() {
                let delta = scale * (y - t) * y * (1.0 - y);
                let g = &mut grads[o * stride..(o + 1) * stride];
                for (gw, &xi) in g.iter_mut().zip(x) {
                    *gw += delta * xi;
                }
                g[self.num_inputs] += delta;
            }
        }

        for (w, g) in self.weights.iter_mut().zip(grads.iter()) {
            *w -= lr * g;
        }
    }
}

impl Model for LinearModel {
    fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    fn forward(&self, input: &[f64], output: &mut [f64]) {
        for (o, y) in output.iter_mut().enumerate() {
            let row = self.row(o);
            let z: f64 = row[..self.num_inputs]
                .iter()
                .zip(input)
                .map(|(w, x)| w * x)
                .sum::<f64>()
                + row[self.num_inputs];
            *y = sigmoid(z);
        }
    }
}

/// Gradient-descent baseline with validation-based model selection.
#[derive(Debug, Clone, Default)]
pub struct BaselineTrainer {
    settings: TrainerSettings,
}

impl BaselineTrainer {
    #[must_use]
    pub fn new(settings: TrainerSettings) -> Self {
        Self { settings }
    }
}

impl Trainer for BaselineTrainer {
    type Model = LinearModel;

    fn train(&mut self, request: &TrainRequest<'_>) -> Result<LinearModel, TrainError> {
        request.validate()?;
        if !(self.settings.learning_rate.is_finite() && self.settings.learning_rate > 0.0) {
            return Err(TrainError::InvalidRequest(format!(
                "learning rate must be finite and > 0, got {}",
                self.settings.learning_rate
            )));
        }

        let data = request.refinement;
        let selection = if request.validation.is_empty() {
            data
        } else {
            request.validation
        };

        let mut stream = SeedStream::new(request.seed);
        let mut model = LinearModel::random(
            data.num_inputs(),
            data.num_outputs(),
            self.settings.weight_range,
            &mut stream,
        );

        let mut best = model.clone();
        let mut best_error = mean_squared_error(&model, selection)?;
        let mut best_epoch = 0;

        let mut grads = vec![0.0; model.weights.len()];
        let mut output = vec![0.0; model.num_outputs];
        for epoch in 1..=request.budget.epochs {
            model.step(data, self.settings.learning_rate, &mut grads, &mut output);
            let error = mean_squared_error(&model, selection)?;
            if error < best_error {
                best_error = error;
                best_epoch = epoch;
                best.weights.copy_from_slice(&model.weights);
            }
        }

        tracing::debug!(
            "{} regime: best selection MSE {:.4} at epoch {}/{} (seed {}, {} generations unused)",
            request.regime,
            best_error,
            best_epoch,
            request.budget.epochs,
            request.seed,
            request.budget.generations
        );

        Ok(best)
    }

    fn holdout_error(&self, model: &LinearModel, testing: &Dataset) -> Result<f64, TrainError> {
        Ok(mean_squared_error(model, testing)?)
    }
}
