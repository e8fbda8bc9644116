//! Fitness of diploids and fitness-proportional parent choice.
//!
//! Only selected mutations contribute to fitness. A mutation carried on
//! one gamete contributes its heterozygous term `h * s`; a mutation
//! carried on both contributes `scaling * s`.

use crate::base::{FitnessValue, Mutation, MutationKey};
use crate::errors::EvolutionError;
use crate::genome::Gamete;
use rand::distr::weighted::WeightedIndex;
use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

/// Trait for computing the fitness of a diploid from its two gametes.
pub trait DiploidFitness {
    /// Fitness of the diploid carrying `first` and `second`.
    fn diploid_fitness(&self, first: &Gamete, second: &Gamete, mutations: &[Mutation])
        -> FitnessValue;
}

/// How selected mutations combine into a fitness value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneticValue {
    /// `w = Π (1 + h s) · Π (1 + scaling · s)`.
    Multiplicative { scaling: f64 },
    /// `w = 1 + Σ h s + Σ scaling · s`.
    Additive { scaling: f64 },
}

impl Default for GeneticValue {
    fn default() -> Self {
        GeneticValue::Multiplicative { scaling: 2.0 }
    }
}

impl GeneticValue {
    fn scaling(&self) -> f64 {
        match *self {
            GeneticValue::Multiplicative { scaling } | GeneticValue::Additive { scaling } => {
                scaling
            }
        }
    }
}

impl DiploidFitness for GeneticValue {
    fn diploid_fitness(
        &self,
        first: &Gamete,
        second: &Gamete,
        mutations: &[Mutation],
    ) -> FitnessValue {
        let scaling = self.scaling();
        match self {
            GeneticValue::Multiplicative { .. } => {
                let mut w = 1.0;
                for_each_genotype(first.selected(), second.selected(), mutations, |m, hom| {
                    w *= if hom {
                        1.0 + scaling * m.effect
                    } else {
                        1.0 + m.dominance * m.effect
                    };
                });
                FitnessValue::new(w)
            }
            GeneticValue::Additive { .. } => {
                let mut sum = 0.0;
                for_each_genotype(first.selected(), second.selected(), mutations, |m, hom| {
                    sum += if hom {
                        scaling * m.effect
                    } else {
                        m.dominance * m.effect
                    };
                });
                FitnessValue::new(1.0 + sum)
            }
        }
    }
}

/// Walk two position-sorted key lists, calling `f(mutation, homozygous)`
/// once per distinct mutation.
fn for_each_genotype<F>(a: &[MutationKey], b: &[MutationKey], mutations: &[Mutation], mut f: F)
where
    F: FnMut(&Mutation, bool),
{
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            f(&mutations[a[i] as usize], true);
            i += 1;
            j += 1;
        } else if mutations[a[i] as usize].position < mutations[b[j] as usize].position {
            f(&mutations[a[i] as usize], false);
            i += 1;
        } else {
            f(&mutations[b[j] as usize], false);
            j += 1;
        }
    }
    for &k in &a[i..] {
        f(&mutations[k as usize], false);
    }
    for &k in &b[j..] {
        f(&mutations[k as usize], false);
    }
}

/// Fitness-proportional choice of parents.
///
/// Falls back to uniform choice when every fitness is equal (including
/// all zero).
#[derive(Debug, Clone)]
pub enum ParentSampler {
    Weighted(WeightedIndex<f64>),
    Uniform(usize),
}

impl ParentSampler {
    /// Build a sampler over the given fitness values.
    ///
    /// # Errors
    /// Returns [`EvolutionError::EmptyPopulation`] if `fitness` is empty.
    pub fn new(fitness: &[f64]) -> Result<Self, EvolutionError> {
        let first = *fitness.first().ok_or(EvolutionError::EmptyPopulation)?;
        if fitness.iter().all(|&w| w == first) {
            return Ok(ParentSampler::Uniform(fitness.len()));
        }
        match WeightedIndex::new(fitness) {
            Ok(index) => Ok(ParentSampler::Weighted(index)),
            Err(_) => Ok(ParentSampler::Uniform(fitness.len())),
        }
    }

    /// Pick the index of one parent.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            ParentSampler::Weighted(index) => index.sample(rng),
            ParentSampler::Uniform(n) => rng.random_range(0..*n),
        }
    }
}
