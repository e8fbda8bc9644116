use crate::base::FitnessValue;
use crate::genome::GameteKey;

/// A diploid individual.
///
/// The two haplotypes are indices into the population's gamete pool,
/// so copying an individual is cheap and never duplicates mutation data.
/// Fitness is cached after every generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Individual {
    first: GameteKey,
    second: GameteKey,
    /// Cached fitness value. `None` indicates that the fitness has not
    /// been computed yet.
    fitness: Option<FitnessValue>,
}

impl Individual {
    /// Create a new individual from two gamete keys.
    pub fn new(first: GameteKey, second: GameteKey) -> Self {
        Self {
            first,
            second,
            fitness: None,
        }
    }

    /// Key of the first haplotype.
    #[inline]
    pub fn first(&self) -> GameteKey {
        self.first
    }

    /// Key of the second haplotype.
    #[inline]
    pub fn second(&self) -> GameteKey {
        self.second
    }

    /// Both haplotype keys.
    #[inline]
    pub fn haplotypes(&self) -> (GameteKey, GameteKey) {
        (self.first, self.second)
    }

    #[cfg(test)]
    pub(crate) fn set_haplotypes(&mut self, first: GameteKey, second: GameteKey) {
        self.first = first;
        self.second = second;
    }

    /// Return the cached fitness value for this individual.
    #[inline]
    pub fn cached_fitness(&self) -> Option<FitnessValue> {
        self.fitness
    }

    /// Set the cached fitness value for this individual.
    #[inline]
    pub fn set_cached_fitness(&mut self, fitness: impl Into<FitnessValue>) {
        self.fitness = Some(fitness.into());
    }

    /// Clear the cached fitness value.
    #[inline]
    pub fn clear_cached_fitness(&mut self) {
        self.fitness = None;
    }
}
