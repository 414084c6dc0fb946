//! Training regime identifiers and their computation budgets.

use serde::{Deserialize, Serialize};

/// One of the two training regimes evaluated on every cross-validation cell.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    /// Small budget; trains on the training split and selects on validation.
    Short,
    /// Large budget; refines on training+validation jointly.
    Long,
}

impl Regime {
    /// Both regimes in execution order.
    pub const ALL: [Regime; 2] = [Regime::Short, Regime::Long];
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short => write!(f, "short"),
            Self::Long => write!(f, "long"),
        }
    }
}

impl std::str::FromStr for Regime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" | "in" => Ok(Self::Short),
            "long" | "out" => Ok(Self::Long),
            _ => Err(format!("unknown regime '{s}'. Use: short, long")),
        }
    }
}

/// Computation budget handed to the trainer for a single invocation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Budget {
    /// Generations of the evolutionary search.
    pub generations: usize,
    /// Maximum gradient-refinement epochs.
    pub epochs: usize,
}

impl Budget {
    #[must_use]
    pub fn new(generations: usize, epochs: usize) -> Self {
        Self {
            generations,
            epochs,
        }
    }

    /// A budget with nothing to spend cannot train a model.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generations == 0 || self.epochs == 0
    }
}

impl std::fmt::Display for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} gens / {} epochs", self.generations, self.epochs)
    }
}
