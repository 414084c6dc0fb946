#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

//! Trainer contract, scoring, and a baseline trainer.

pub mod baseline;
pub mod model;
pub mod scorer;

pub use baseline::{BaselineTrainer, LinearModel};
pub use model::{Model, TrainError, TrainRequest, Trainer};
pub use scorer::{ScoreError, accuracy, mean_squared_error, predicted_class, true_class};
