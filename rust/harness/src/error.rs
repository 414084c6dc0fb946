use foldwise_data::{DataError, LoadError};
use foldwise_training::{ScoreError, TrainError};

use crate::{config::ConfigError, resume::ResumeError, state::LedgerError};

/// Whether an error came from bad input or from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inconsistent configuration, dataset or resume coordinates.
    Configuration,
    /// A file could not be read, written or locked, or the trainer failed.
    Resource,
}

/// Any error that stops the harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Train(#[from] TrainError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Resume(#[from] ResumeError),
}

impl HarnessError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(ConfigError::Io(..))
            | Self::Load(LoadError::Io(..))
            | Self::Ledger(LedgerError::Io(..) | LedgerError::Lock(..))
            | Self::Resume(ResumeError::Io(_))
            | Self::Train(TrainError::Failed(_)) => ErrorKind::Resource,
            _ => ErrorKind::Configuration,
        }
    }
}
