//! Rotation of folds into training, validation and testing splits.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;

use crate::{DataError, Dataset, FoldSet, SeedStream};

/// Fold indices assigned to each split for one rotation.
///
/// The three sets are pairwise disjoint and together cover `0..folds`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub training: BTreeSet<usize>,
    pub validation: BTreeSet<usize>,
    pub testing: usize,
}

impl Partition {
    /// Draw `validation_folds` distinct indices uniformly from the folds other
    /// than `testing`; the remainder are training.
    pub fn select(
        testing: usize,
        folds: usize,
        validation_folds: usize,
        stream: &mut SeedStream,
    ) -> Result<Self, DataError> {
        if testing >= folds {
            return Err(DataError::Rotation(format!(
                "testing fold {testing} out of range for {folds} folds"
            )));
        }
        if validation_folds == 0 || validation_folds + 1 >= folds {
            return Err(DataError::Rotation(format!(
                "{validation_folds} validation folds leave no training fold out of {folds}"
            )));
        }

        let mut remaining: Vec<usize> = (0..folds).filter(|&f| f != testing).collect();
        let (drawn, rest) = remaining.partial_shuffle(stream.rng(), validation_folds);

        Ok(Self {
            validation: drawn.iter().copied().collect(),
            training: rest.iter().copied().collect(),
            testing,
        })
    }

    /// Total number of folds covered.
    #[must_use]
    pub fn folds(&self) -> usize {
        self.training.len() + self.validation.len() + 1
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "train {:?} / valid {:?} / test {}",
            self.training, self.validation, self.testing
        )
    }
}

/// Concrete datasets for one rotation.
#[derive(Debug, Clone)]
pub struct Split {
    pub training: Dataset,
    pub validation: Dataset,
    pub testing: Dataset,
}

impl Split {
    /// Training followed by validation, for regimes that refine on both.
    pub fn merged_for_full_training(&self) -> Result<Dataset, DataError> {
        Dataset::concat(&[&self.training, &self.validation])
    }
}

impl FoldSet {
    /// Concatenate the folds named by `partition`, in ascending index order.
    pub fn materialize(&self, partition: &Partition) -> Result<Split, DataError> {
        if partition.folds() != self.len() {
            return Err(DataError::Rotation(format!(
                "partition covers {} folds, fold set has {}",
                partition.folds(),
                self.len()
            )));
        }
        let gather = |indices: &BTreeSet<usize>| {
            let parts: Vec<&Dataset> = indices.iter().map(|&i| self.fold(i)).collect();
            Dataset::concat(&parts)
        };

        Ok(Split {
            training: gather(&partition.training)?,
            validation: gather(&partition.validation)?,
            testing: self.fold(partition.testing).clone(),
        })
    }
}
