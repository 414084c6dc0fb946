use std::path::PathBuf;

/// Errors raised while building, partitioning or rotating datasets.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("invalid shape: {0}")]
    Shape(String),
    #[error("sample fraction must be in (0, 1], got {0}")]
    Fraction(f64),
    #[error("fold count must be at least 2, got {0}")]
    Folds(usize),
    #[error("sample {0} has no class indicator (no output equals 1.0)")]
    Unlabelled(usize),
    #[error("class {class} has {members} members, fewer than the {folds} folds requested")]
    SparseClass {
        class: usize,
        members: usize,
        folds: usize,
    },
    #[error("invalid rotation: {0}")]
    Rotation(String),
}

/// Errors raised while reading a dataset file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read dataset file {0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("{0}: missing header line `inputs,outputs,samples`")]
    MissingHeader(PathBuf),
    #[error("{path}:{line}: {msg}")]
    Parse {
        path: PathBuf,
        line: usize,
        msg: String,
    },
    #[error("{path}: header declares {expected} samples, found {found}")]
    SampleCount {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
    #[error("{0}")]
    Data(#[from] DataError),
}
