//! Explicit, caller-owned pseudo-random streams.
//!
//! Every randomized decision consumes a `&mut SeedStream`; there is no ambient
//! RNG. Two streams built from the same seed yield identical draws.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Deterministic stream keyed by a `u64` seed.
#[derive(Debug, Clone)]
pub struct SeedStream {
    seed: u64,
    rng: StdRng,
}

impl SeedStream {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The seed this stream was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw from `[-range, range]`.
    pub fn symmetric(&mut self, range: f64) -> f64 {
        if range <= 0.0 {
            return 0.0;
        }
        self.rng.random_range(-range..=range)
    }

    /// Direct access for `rand` adapters such as `SliceRandom`.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}
