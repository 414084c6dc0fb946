//! Seeded shuffling, subsampling and stratified fold construction.

use std::{borrow::Cow, collections::BTreeMap};

use rand::seq::SliceRandom;

use crate::{DataError, Dataset, SeedStream};

impl Dataset {
    /// Fisher-Yates permutation of the samples, rows moved together.
    ///
    /// Advances `stream`; the same stream state always yields the same order.
    pub fn shuffle(&mut self, stream: &mut SeedStream) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(stream.rng());
        *self = self.select(&order);
    }

    /// Shuffled copy; `self` is left untouched.
    #[must_use]
    pub fn shuffled(&self, stream: &mut SeedStream) -> Self {
        let mut copy = self.clone();
        copy.shuffle(stream);
        copy
    }

    /// The first `floor(fraction * len)` samples.
    ///
    /// A fraction of exactly 1 borrows `self` instead of copying it.
    pub fn subsample(&self, fraction: f64) -> Result<Cow<'_, Dataset>, DataError> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(DataError::Fraction(fraction));
        }
        if fraction >= 1.0 {
            return Ok(Cow::Borrowed(self));
        }
        let keep = (fraction * self.len() as f64).floor() as usize;
        Ok(Cow::Owned(self.truncated(keep)))
    }
}

/// An ordered set of disjoint, class-stratified folds.
#[derive(Debug, Clone)]
pub struct FoldSet {
    folds: Vec<Dataset>,
}

impl FoldSet {
    /// Split `data` into `k` folds by per-class round robin.
    ///
    /// Classes are visited in ascending order and the round-robin cursor
    /// carries over from one class to the next, so fold sizes differ by at
    /// most one. Within a fold, samples keep their order in `data`.
    pub fn stratified(data: &Dataset, k: usize) -> Result<Self, DataError> {
        if k < 2 {
            return Err(DataError::Folds(k));
        }
        if data.is_empty() {
            return Err(DataError::Shape("cannot fold an empty dataset".into()));
        }

        let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for idx in 0..data.len() {
            let class = data.class_of(idx).ok_or(DataError::Unlabelled(idx))?;
            by_class.entry(class).or_default().push(idx);
        }

        if let Some((&class, members)) = by_class.iter().find(|(_, m)| m.len() < k) {
            return Err(DataError::SparseClass {
                class,
                members: members.len(),
                folds: k,
            });
        }

        let mut assignment = vec![Vec::with_capacity(data.len() / k + 1); k];
        let mut cursor = 0;
        for members in by_class.values() {
            for &idx in members {
                assignment[cursor].push(idx);
                cursor = (cursor + 1) % k;
            }
        }

        let folds: Vec<Dataset> = assignment
            .iter_mut()
            .map(|indices| {
                indices.sort_unstable();
                data.select(indices)
            })
            .collect();

        tracing::debug!(
            "Built {k} folds from {} samples in {} classes (sizes {:?})",
            data.len(),
            by_class.len(),
            folds.iter().map(Dataset::len).collect::<Vec<_>>()
        );

        Ok(Self { folds })
    }

    /// Number of folds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.folds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    /// Panics if `idx >= len`.
    #[must_use]
    pub fn fold(&self, idx: usize) -> &Dataset {
        &self.folds[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dataset> {
        self.folds.iter()
    }
}
