//! Genetic load and mutation burden of a population.

use clonal_sim::simulation::Population;
use rayon::prelude::*;
use serde::Serialize;

/// Load and mutation-burden measures of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GeneticLoad {
    pub mean_fitness: f64,
    /// `1 - mean(w) / max(w)`.
    pub relative_load: f64,
    /// `1 - mean(w)`.
    pub segregating_load: f64,
    /// `1 - Π (1 + 2s)` over fixed selected mutations.
    pub fixed_load: f64,
    pub fixed_deleterious: usize,
    pub fixed_neutral: usize,
    pub mean_deleterious_per_diploid: f64,
    pub mean_neutral_per_diploid: f64,
    pub cumulative_deleterious_frequency: f64,
    pub cumulative_neutral_frequency: f64,
}

/// Compute load measures from the cached fitness and mutation counts of
/// `population`. Means over an empty population are `NaN`.
pub fn genetic_load(population: &Population) -> GeneticLoad {
    let w = population.fitness_values();
    let n = population.size();

    let (mean_w, max_w) = if w.is_empty() {
        (f64::NAN, f64::NAN)
    } else {
        (
            w.iter().sum::<f64>() / n as f64,
            w.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        )
    };

    let selected_fixations: Vec<f64> = population
        .fixations()
        .iter()
        .filter(|m| !m.neutral)
        .map(|m| m.effect)
        .collect();
    let fixed_neutral = population.fixations().iter().filter(|m| m.neutral).count();

    let (neutral_total, selected_total) = (0..n)
        .into_par_iter()
        .filter_map(|i| population.individual_mutations(i))
        .reduce(|| (0, 0), |(a, b), (neutral, selected)| (a + neutral, b + selected));

    let two_n = 2.0 * n as f64;
    let (mut del_freq, mut neu_freq) = (0.0, 0.0);
    for (m, &count) in population.mutations().iter().zip(population.mutation_counts()) {
        if count == 0 {
            continue;
        }
        if m.neutral {
            neu_freq += f64::from(count) / two_n;
        } else {
            del_freq += f64::from(count) / two_n;
        }
    }

    GeneticLoad {
        mean_fitness: mean_w,
        relative_load: 1.0 - mean_w / max_w,
        segregating_load: 1.0 - mean_w,
        fixed_load: 1.0 - selected_fixations.iter().map(|s| 1.0 + 2.0 * s).product::<f64>(),
        fixed_deleterious: selected_fixations.len(),
        fixed_neutral,
        mean_deleterious_per_diploid: per_diploid(selected_total, n),
        mean_neutral_per_diploid: per_diploid(neutral_total, n),
        cumulative_deleterious_frequency: del_freq,
        cumulative_neutral_frequency: neu_freq,
    }
}

fn per_diploid(total: usize, n: usize) -> f64 {
    if n == 0 {
        f64::NAN
    } else {
        total as f64 / n as f64
    }
}
