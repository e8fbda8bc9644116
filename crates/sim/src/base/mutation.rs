//! Infinite-sites mutation records.

use serde::{Deserialize, Serialize};

/// Index of a mutation in a population's mutation table.
pub type MutationKey = u32;

/// A single mutation on the continuous interval `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// Position on the locus.
    pub position: f64,
    /// Selection coefficient `s` (0.0 for neutral mutations).
    pub effect: f64,
    /// Dominance `h` of the heterozygous effect.
    pub dominance: f64,
    /// Whether the mutation is neutral.
    pub neutral: bool,
    /// Generation in which the mutation arose.
    pub origin: usize,
    /// Set once a retained fixation has been recorded.
    pub fixed: bool,
}

impl Mutation {
    /// Create a neutral mutation.
    pub fn neutral(position: f64, origin: usize) -> Self {
        Self {
            position,
            effect: 0.0,
            dominance: 1.0,
            neutral: true,
            origin,
            fixed: false,
        }
    }

    /// Create a selected mutation.
    pub fn selected(position: f64, effect: f64, dominance: f64, origin: usize) -> Self {
        Self {
            position,
            effect,
            dominance,
            neutral: false,
            origin,
            fixed: false,
        }
    }

    /// Whether the mutation lowers fitness.
    pub fn is_deleterious(&self) -> bool {
        !self.neutral && self.effect < 0.0
    }
}
