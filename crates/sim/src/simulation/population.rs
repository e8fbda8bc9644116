//! Population management and operations.
//!
//! A population stores its diploids as pairs of keys into a shared gamete
//! pool, and its gametes as keys into a shared mutation table. Extinct
//! gametes and lost mutations keep their slots so later generations can
//! reuse them.

use crate::base::{FitnessValue, Mutation, MutationKey};
use crate::evolution::DiploidFitness;
use crate::genome::{Gamete, GameteKey, Individual};
use rayon::prelude::*;
use std::collections::HashMap;

/// A single-locus population of diploid individuals.
#[derive(Debug, Clone)]
pub struct Population {
    pub(crate) individuals: Vec<Individual>,
    pub(crate) gametes: Vec<Gamete>,
    pub(crate) mutations: Vec<Mutation>,
    pub(crate) mutation_counts: Vec<u32>,
    fixations: Vec<Mutation>,
    fixation_times: Vec<usize>,
    generation: usize,
    /// Position bits of every mutation still present, mapped to its key.
    lookup: HashMap<u64, MutationKey>,
}

impl Population {
    /// Create a monomorphic population of `n` diploids at generation 0.
    ///
    /// Every diploid carries two copies of one shared empty gamete.
    pub fn new(n: usize) -> Self {
        Self {
            individuals: vec![Individual::new(0, 0); n],
            gametes: vec![Gamete::new(2 * n as u32)],
            mutations: Vec::new(),
            mutation_counts: Vec::new(),
            fixations: Vec::new(),
            fixation_times: Vec::new(),
            generation: 0,
            lookup: HashMap::new(),
        }
    }

    /// Number of diploids.
    pub fn size(&self) -> usize {
        self.individuals.len()
    }

    /// Check if population is empty.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Get the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Increment the generation counter.
    pub(crate) fn increment_generation(&mut self) {
        self.generation += 1;
    }

    /// Get all individuals as a slice.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// The gamete pool, including extinct slots.
    pub fn gametes(&self) -> &[Gamete] {
        &self.gametes
    }

    /// The mutation table, including lost slots.
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Number of chromosomes carrying each mutation.
    pub fn mutation_counts(&self) -> &[u32] {
        &self.mutation_counts
    }

    /// Fixed mutations in order of fixation.
    pub fn fixations(&self) -> &[Mutation] {
        &self.fixations
    }

    /// Generation at which each entry of [`fixations`](Self::fixations) fixed.
    pub fn fixation_times(&self) -> &[usize] {
        &self.fixation_times
    }

    /// Whether a mutation currently occupies `position`.
    pub fn is_occupied(&self, position: f64) -> bool {
        self.lookup.contains_key(&position.to_bits())
    }

    /// Number of mutations still present in the population.
    pub fn segregating(&self) -> usize {
        self.lookup.len()
    }

    /// Neutral and selected mutation counts carried by diploid `index`.
    pub fn individual_mutations(&self, index: usize) -> Option<(usize, usize)> {
        let ind = self.individuals.get(index)?;
        let (a, b) = (&self.gametes[ind.first()], &self.gametes[ind.second()]);
        Some((
            a.neutral().len() + b.neutral().len(),
            a.selected().len() + b.selected().len(),
        ))
    }

    /// Cached fitness of every diploid (1.0 where not yet computed).
    pub fn fitness_values(&self) -> Vec<f64> {
        self.individuals
            .iter()
            .map(|ind| ind.cached_fitness().unwrap_or_default().get())
            .collect()
    }

    /// Mean cached fitness.
    pub fn mean_fitness(&self) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        self.fitness_values().iter().sum::<f64>() / self.size() as f64
    }

    /// Compute fitness values for all individuals.
    pub fn compute_fitness<F>(&self, model: &F) -> Vec<FitnessValue>
    where
        F: DiploidFitness + Sync,
    {
        self.individuals
            .par_iter()
            .map(|ind| {
                model.diploid_fitness(
                    &self.gametes[ind.first()],
                    &self.gametes[ind.second()],
                    &self.mutations,
                )
            })
            .collect()
    }

    /// Update fitness values for all individuals in the population.
    pub fn update_fitness<F>(&mut self, model: &F)
    where
        F: DiploidFitness + Sync,
    {
        let fitness_values = self.compute_fitness(model);
        for (ind, fitness) in self.individuals.iter_mut().zip(fitness_values) {
            ind.set_cached_fitness(fitness);
        }
    }

    /// Recount mutations and handle fixations.
    ///
    /// Mutations carried by all `2N` chromosomes are appended to the
    /// fixation list. Fixed neutral mutations are always removed from the
    /// gametes. Fixed selected mutations are removed only when
    /// `prune_selected` is set; otherwise they stay in the gametes and are
    /// flagged so they are listed once. Removed and lost mutations free
    /// their positions and slots.
    pub fn update_mutations(&mut self, prune_selected: bool) {
        self.recount_mutations();
        let two_n = 2 * self.size() as u32;
        let mut remove = vec![false; self.mutations.len()];
        let mut any_removed = false;

        for (key, mutation) in self.mutations.iter_mut().enumerate() {
            let count = self.mutation_counts[key];
            if count == 0 {
                release(&mut self.lookup, mutation.position, key as MutationKey);
                continue;
            }
            if count != two_n {
                continue;
            }
            if mutation.neutral || prune_selected {
                if !mutation.fixed {
                    self.fixations.push(*mutation);
                    self.fixation_times.push(self.generation);
                }
                remove[key] = true;
                any_removed = true;
                self.mutation_counts[key] = 0;
                release(&mut self.lookup, mutation.position, key as MutationKey);
            } else if !mutation.fixed {
                mutation.fixed = true;
                self.fixations.push(*mutation);
                self.fixation_times.push(self.generation);
            }
        }

        if any_removed {
            self.gametes
                .iter_mut()
                .filter(|g| !g.is_extinct())
                .for_each(|g| g.retain(|k| !remove[k as usize]));
        }
    }

    fn recount_mutations(&mut self) {
        let mut counts = vec![0u32; self.mutations.len()];
        for gamete in self.gametes.iter().filter(|g| !g.is_extinct()) {
            for key in gamete.keys() {
                counts[key as usize] += gamete.count();
            }
        }
        self.mutation_counts = counts;
    }

    /// Slots of extinct gametes.
    pub(crate) fn extinct_gametes(&self) -> Vec<GameteKey> {
        self.gametes
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, g)| g.is_extinct())
            .map(|(k, _)| k)
            .collect()
    }

    /// Slots of mutations no longer carried by any chromosome.
    pub(crate) fn lost_mutations(&self) -> Vec<MutationKey> {
        self.mutation_counts
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, &c)| c == 0)
            .map(|(k, _)| k as MutationKey)
            .collect()
    }

    /// Store a new mutation, reusing a lost slot if one is available.
    pub(crate) fn add_mutation(
        &mut self,
        mutation: Mutation,
        recycled: &mut Vec<MutationKey>,
    ) -> MutationKey {
        let key = match recycled.pop() {
            Some(key) => {
                self.mutations[key as usize] = mutation;
                self.mutation_counts[key as usize] = 0;
                key
            }
            None => {
                self.mutations.push(mutation);
                self.mutation_counts.push(0);
                (self.mutations.len() - 1) as MutationKey
            }
        };
        self.lookup.insert(mutation.position.to_bits(), key);
        key
    }

    /// Store a new gamete, reusing an extinct slot if one is available.
    pub(crate) fn add_gamete(&mut self, gamete: Gamete, recycled: &mut Vec<GameteKey>) -> GameteKey {
        match recycled.pop() {
            Some(key) => {
                self.gametes[key] = gamete;
                key
            }
            None => {
                self.gametes.push(gamete);
                self.gametes.len() - 1
            }
        }
    }

    /// Check the bookkeeping invariants. Used by tests.
    pub fn check_invariants(&self) -> Result<(), String> {
        let total: u64 = self.gametes.iter().map(|g| g.count() as u64).sum();
        if total != 2 * self.size() as u64 {
            return Err(format!("gamete counts sum to {total}, expected {}", 2 * self.size()));
        }
        let mut carried = vec![0u32; self.gametes.len()];
        for ind in &self.individuals {
            carried[ind.first()] += 1;
            carried[ind.second()] += 1;
        }
        for (key, gamete) in self.gametes.iter().enumerate() {
            if carried[key] != gamete.count() {
                return Err(format!("gamete {key} has count {} but {} carriers", gamete.count(), carried[key]));
            }
            for list in [gamete.neutral(), gamete.selected()] {
                let sorted = list.windows(2).all(|w| {
                    self.mutations[w[0] as usize].position < self.mutations[w[1] as usize].position
                });
                if !sorted {
                    return Err(format!("gamete {key} is not position-sorted"));
                }
            }
        }
        let mut counts = vec![0u32; self.mutations.len()];
        for gamete in self.gametes.iter().filter(|g| !g.is_extinct()) {
            for key in gamete.keys() {
                counts[key as usize] += gamete.count();
            }
        }
        if counts != self.mutation_counts {
            return Err("mutation counts do not match gametes".to_string());
        }
        Ok(())
    }
}

fn release(lookup: &mut HashMap<u64, MutationKey>, position: f64, key: MutationKey) {
    let bits = position.to_bits();
    if lookup.get(&bits) == Some(&key) {
        lookup.remove(&bits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::GeneticValue;

    /// Two diploids; gamete 0 carries a neutral and a selected mutation.
    fn fixture() -> Population {
        let mut pop = Population::new(2);
        let mut recycled = Vec::new();
        let n = pop.add_mutation(Mutation::neutral(0.2, 0), &mut recycled);
        let s = pop.add_mutation(Mutation::selected(0.6, -0.1, 0.5, 0), &mut recycled);
        pop.gametes[0] = Gamete::from_keys(4, vec![n], vec![s]);
        pop
    }

    #[test]
    fn test_population_new() {
        let pop = Population::new(5);
        assert_eq!(pop.size(), 5);
        assert_eq!(pop.generation(), 0);
        assert_eq!(pop.gametes().len(), 1);
        assert_eq!(pop.gametes()[0].count(), 10);
        assert!(pop.check_invariants().is_ok());
    }

    #[test]
    fn test_population_empty() {
        let pop = Population::new(0);
        assert!(pop.is_empty());
        assert_eq!(pop.mean_fitness(), 0.0);
    }

    #[test]
    fn test_update_mutations_prunes_neutral_only() {
        let mut pop = fixture();
        pop.update_mutations(false);
        assert_eq!(pop.fixations().len(), 2);
        assert_eq!(pop.fixation_times(), &[0, 0]);
        assert!(pop.gametes()[0].neutral().is_empty());
        assert_eq!(pop.gametes()[0].selected(), &[1]);
        assert!(pop.mutations()[1].fixed);
        assert!(!pop.is_occupied(0.2));
        assert!(pop.is_occupied(0.6));

        // A retained fixation is only listed once.
        pop.increment_generation();
        pop.update_mutations(false);
        assert_eq!(pop.fixations().len(), 2);
        assert!(pop.check_invariants().is_ok());
    }

    #[test]
    fn test_update_mutations_prunes_selected() {
        let mut pop = fixture();
        pop.update_mutations(true);
        assert_eq!(pop.fixations().len(), 2);
        assert!(pop.gametes()[0].is_empty());
        assert_eq!(pop.mutation_counts(), &[0, 0]);
        assert_eq!(pop.lost_mutations(), vec![1, 0]);
        assert_eq!(pop.segregating(), 0);
    }

    #[test]
    fn test_segregating_mutation_not_fixed() {
        let mut pop = Population::new(2);
        let mut recycled = Vec::new();
        let key = pop.add_mutation(Mutation::neutral(0.5, 0), &mut recycled);
        let g = pop.add_gamete(Gamete::from_keys(1, vec![key], vec![]), &mut Vec::new());
        pop.gametes[0].set_count(3);
        pop.individuals[1].set_haplotypes(0, g);
        pop.update_mutations(true);
        assert!(pop.fixations().is_empty());
        assert_eq!(pop.mutation_counts(), &[1]);
        assert_eq!(pop.individual_mutations(1), Some((1, 0)));
        assert_eq!(pop.individual_mutations(0), Some((0, 0)));
        assert!(pop.check_invariants().is_ok());
    }

    #[test]
    fn test_update_fitness() {
        let mut pop = fixture();
        pop.update_fitness(&GeneticValue::default());
        // homozygous for s = -0.1 with scaling 2
        assert!((pop.mean_fitness() - 0.8).abs() < 1e-12);
        assert!(pop.individuals().iter().all(|i| i.cached_fitness().is_some()));
    }

    #[test]
    fn test_add_mutation_reuses_slots() {
        let mut pop = fixture();
        pop.update_mutations(true);
        let mut recycled = pop.lost_mutations();
        let key = pop.add_mutation(Mutation::neutral(0.9, 1), &mut recycled);
        assert_eq!(key, 0);
        assert_eq!(pop.mutations().len(), 2);
        assert!(pop.is_occupied(0.9));
    }

    #[test]
    fn test_clone_is_independent() {
        let pop = fixture();
        let mut copy = pop.clone();
        copy.update_mutations(true);
        assert!(pop.fixations().is_empty());
        assert_eq!(copy.fixations().len(), 2);
    }
}
