#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

//! Foldwise Data - datasets and cross-validation partitioning
//!
//! This crate provides:
//! - `Dataset` - row-major supervised dataset with one-hot outputs
//! - `SeedStream` - explicit deterministic random stream
//! - `FoldSet` - seeded shuffling, subsampling and stratified folds
//! - `Partition` / `Split` - rotation of folds into train/validation/test
//! - `load_dataset` - plain-text dataset loader

pub mod dataset;
pub mod error;
pub mod loader;
pub mod partition;
pub mod rotation;
pub mod seed;

#[cfg(test)]
pub(crate) mod test_utils;

pub use dataset::Dataset;
pub use error::{DataError, LoadError};
pub use loader::{load_dataset, parse_dataset};
pub use partition::FoldSet;
pub use rotation::{Partition, Split};
pub use seed::SeedStream;
