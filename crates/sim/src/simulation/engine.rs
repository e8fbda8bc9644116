//! Simulation engine for evolutionary processes.
//!
//! This module provides the generation loop that orchestrates selection,
//! reproduction, recombination and mutation. Two reproduction modes are
//! supported: Wright-Fisher outcrossing and clonal propagation, where each
//! offspring copies both gametes of one fitness-selected parent.

use crate::base::MutationKey;
use crate::errors::EvolutionError;
use crate::evolution::{recombine_keys, MutationModel, ParentSampler, RecombinationMap};
use crate::genome::{Gamete, GameteKey, Individual};
use crate::simulation::{ModelParams, Population, TemporalSampler};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// How offspring are produced from parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReproductionMode {
    /// Two parents, each contributing one recombinant gamete.
    Outcrossing,
    /// One parent, copied with both of its gametes and no recombination.
    Clonal,
}

impl fmt::Display for ReproductionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReproductionMode::Outcrossing => write!(f, "outcrossing"),
            ReproductionMode::Clonal => write!(f, "clonal"),
        }
    }
}

/// Outcome of a call to [`evolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolveSummary {
    /// Number of generations simulated.
    pub generations: usize,
    /// Mean fitness of the final population.
    pub mean_fitness: f64,
    /// Size of the final population.
    pub final_size: usize,
}

/// Slots that may be overwritten during one generation.
struct RecyclingBins {
    gametes: Vec<GameteKey>,
    mutations: Vec<MutationKey>,
}

struct GenerationContext<'a> {
    mutation: &'a MutationModel,
    recombination: &'a RecombinationMap,
    selfing_rate: f64,
    mode: ReproductionMode,
}

/// Evolve `population` through every generation of `params.demography`.
///
/// After each generation the population size is set to the next entry of
/// the demography, the generation counter is incremented, fixations are
/// handled, cached fitness is refreshed and `recorder` is invoked.
///
/// # Errors
/// Returns an error if the parameters do not validate, the population is
/// empty, or the recorder fails.
pub fn evolve<R, S>(
    rng: &mut R,
    population: &mut Population,
    params: &ModelParams,
    mode: ReproductionMode,
    recorder: &mut S,
) -> Result<EvolveSummary, EvolutionError>
where
    R: Rng + ?Sized,
    S: TemporalSampler + ?Sized,
{
    params.validate()?;
    if population.is_empty() {
        return Err(EvolutionError::EmptyPopulation);
    }
    let mutation = params.mutation_model()?;
    let recombination = params.recombination_map()?;
    let ctx = GenerationContext {
        mutation: &mutation,
        recombination: &recombination,
        selfing_rate: params.selfing_rate,
        mode,
    };

    debug!(
        %mode,
        generations = params.generations(),
        start = population.generation(),
        size = population.size(),
        "evolving population"
    );

    population.update_fitness(&params.genetic_value);
    for &n_next in &params.demography {
        let wbar = generation(rng, population, n_next as usize, &ctx)?;
        population.increment_generation();
        population.update_mutations(params.prune_selected);
        population.update_fitness(&params.genetic_value);
        trace!(
            generation = population.generation(),
            size = population.size(),
            wbar,
            segregating = population.segregating(),
            "generation complete"
        );
        recorder.record(population)?;
    }

    let summary = EvolveSummary {
        generations: params.generations(),
        mean_fitness: population.mean_fitness(),
        final_size: population.size(),
    };
    debug!(
        generation = population.generation(),
        mean_fitness = summary.mean_fitness,
        fixations = population.fixations().len(),
        "evolution finished"
    );
    Ok(summary)
}

/// Replace the diploids with `n_next` offspring. Returns the parents' mean
/// fitness.
fn generation<R>(
    rng: &mut R,
    pop: &mut Population,
    n_next: usize,
    ctx: &GenerationContext<'_>,
) -> Result<f64, EvolutionError>
where
    R: Rng + ?Sized,
{
    let fitness = pop.fitness_values();
    let wbar = fitness.iter().sum::<f64>() / fitness.len() as f64;
    let sampler = ParentSampler::new(&fitness)?;

    // Only gametes extinct before this generation may be overwritten.
    let mut bins = RecyclingBins {
        gametes: pop.extinct_gametes(),
        mutations: pop.lost_mutations(),
    };
    pop.gametes.iter_mut().for_each(|g| g.set_count(0));

    let parents = std::mem::take(&mut pop.individuals);
    let origin = pop.generation() + 1;
    let mut offspring = Vec::with_capacity(n_next);

    for _ in 0..n_next {
        let child = match ctx.mode {
            ReproductionMode::Clonal => {
                let parent = parents[sampler.sample(rng)];
                let first = mutate_gamete(rng, pop, parent.first(), ctx.mutation, &mut bins, origin);
                let second =
                    mutate_gamete(rng, pop, parent.second(), ctx.mutation, &mut bins, origin);
                Individual::new(first, second)
            }
            ReproductionMode::Outcrossing => {
                let p1 = sampler.sample(rng);
                let p2 = if ctx.selfing_rate > 0.0 && rng.random::<f64>() < ctx.selfing_rate {
                    p1
                } else {
                    sampler.sample(rng)
                };
                let first = meiosis(rng, pop, parents[p1], ctx, &mut bins, origin);
                let second = meiosis(rng, pop, parents[p2], ctx, &mut bins, origin);
                Individual::new(first, second)
            }
        };
        offspring.push(child);
    }

    pop.individuals = offspring;
    Ok(wbar)
}

/// Pass gamete `key` to one offspring, adding new mutations.
///
/// Without new mutations the parental gamete is shared and its count
/// incremented; otherwise a new gamete with count 1 is stored.
fn mutate_gamete<R>(
    rng: &mut R,
    pop: &mut Population,
    key: GameteKey,
    model: &MutationModel,
    bins: &mut RecyclingBins,
    origin: usize,
) -> GameteKey
where
    R: Rng + ?Sized,
{
    let n = model.sample_count(rng);
    if n == 0 {
        pop.gametes[key].increment();
        return key;
    }
    let parent = &pop.gametes[key];
    let gamete = Gamete::from_keys(1, parent.neutral().to_vec(), parent.selected().to_vec());
    store_mutated(rng, pop, gamete, n, model, bins, origin)
}

/// Produce one recombinant gamete from `parent` and mutate it.
fn meiosis<R>(
    rng: &mut R,
    pop: &mut Population,
    parent: Individual,
    ctx: &GenerationContext<'_>,
    bins: &mut RecyclingBins,
    origin: usize,
) -> GameteKey
where
    R: Rng + ?Sized,
{
    let (mut first, mut second) = parent.haplotypes();
    if rng.random::<bool>() {
        std::mem::swap(&mut first, &mut second);
    }
    let breakpoints = ctx.recombination.breakpoints(rng);
    if breakpoints.is_empty() || first == second {
        return mutate_gamete(rng, pop, first, ctx.mutation, bins, origin);
    }

    let (a, b) = (&pop.gametes[first], &pop.gametes[second]);
    let neutral = recombine_keys(a.neutral(), b.neutral(), &breakpoints, &pop.mutations);
    let selected = recombine_keys(a.selected(), b.selected(), &breakpoints, &pop.mutations);
    let gamete = Gamete::from_keys(1, neutral, selected);
    let n = ctx.mutation.sample_count(rng);
    store_mutated(rng, pop, gamete, n, ctx.mutation, bins, origin)
}

fn store_mutated<R>(
    rng: &mut R,
    pop: &mut Population,
    mut gamete: Gamete,
    n: usize,
    model: &MutationModel,
    bins: &mut RecyclingBins,
    origin: usize,
) -> GameteKey
where
    R: Rng + ?Sized,
{
    for _ in 0..n {
        let mutation = model.sample_mutation(rng, origin, |x| pop.is_occupied(x));
        let key = pop.add_mutation(mutation, &mut bins.mutations);
        gamete.insert(key, &pop.mutations);
    }
    pop.add_gamete(gamete, &mut bins.gametes)
}
