use crate::simulation::Population;
use serde::{Deserialize, Serialize};

/// Recording strategy for when to sample the population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordingStrategy {
    /// Record every N generations.
    EveryN(usize),

    /// Record at specific generations.
    Specific(Vec<usize>),

    /// Record all generations.
    All,

    /// No recording.
    None,
}

impl RecordingStrategy {
    /// Check if generation should be recorded
    pub fn should_record(&self, generation: usize) -> bool {
        match self {
            Self::EveryN(0) => false,
            Self::EveryN(n) => generation.is_multiple_of(*n),
            Self::Specific(gens) => gens.contains(&generation),
            Self::All => true,
            Self::None => false,
        }
    }
}

/// Summary statistics of a population at one generation.
///
/// Statistics that are undefined for a sample (for instance Tajima's D
/// without segregating sites) are `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    /// Number of diploids.
    pub size: usize,
    pub mean_fitness: f64,
    /// `1 - mean(w) / max(w)`.
    pub relative_load: f64,
    /// `1 - mean(w)`.
    pub segregating_load: f64,
    /// `1 - Π (1 + 2s)` over fixed selected mutations.
    pub fixed_load: f64,
    /// Number of fixed selected mutations.
    pub fixed_deleterious: usize,
    pub fixed_neutral: usize,
    pub mean_deleterious_per_diploid: f64,
    pub mean_neutral_per_diploid: f64,
    /// `Σ count / 2N` over selected mutations present in the population.
    pub cumulative_deleterious_frequency: f64,
    /// `Σ count / 2N` over neutral mutations present in the population.
    pub cumulative_neutral_frequency: f64,
    pub neutral_tajimas_d: f64,
    pub total_tajimas_d: f64,
    pub neutral_pi: f64,
    pub total_pi: f64,
    pub neutral_hprime: f64,
    pub total_hprime: f64,
}

impl GenerationStats {
    /// Column names in storage and export order.
    pub const COLUMNS: [&'static str; 18] = [
        "generation",
        "size",
        "mean_fitness",
        "relative_load",
        "segregating_load",
        "fixed_load",
        "fixed_deleterious",
        "fixed_neutral",
        "mean_deleterious_per_diploid",
        "mean_neutral_per_diploid",
        "cumulative_deleterious_frequency",
        "cumulative_neutral_frequency",
        "neutral_tajimas_d",
        "total_tajimas_d",
        "neutral_pi",
        "total_pi",
        "neutral_hprime",
        "total_hprime",
    ];

    /// Every field as `f64`, in [`Self::COLUMNS`] order.
    pub fn values(&self) -> [f64; 18] {
        [
            self.generation as f64,
            self.size as f64,
            self.mean_fitness,
            self.relative_load,
            self.segregating_load,
            self.fixed_load,
            self.fixed_deleterious as f64,
            self.fixed_neutral as f64,
            self.mean_deleterious_per_diploid,
            self.mean_neutral_per_diploid,
            self.cumulative_deleterious_frequency,
            self.cumulative_neutral_frequency,
            self.neutral_tajimas_d,
            self.total_tajimas_d,
            self.neutral_pi,
            self.total_pi,
            self.neutral_hprime,
            self.total_hprime,
        ]
    }
}

/// Every row recorded during one stage of one replicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: String,
    /// Name of the dominance model.
    pub model: String,
    pub replicate: usize,
    pub rows: Vec<GenerationStats>,
}

/// Aggregated fitness statistics for a generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
}

impl FitnessStats {
    /// Calculate fitness statistics from a population's cached fitness.
    pub fn from_population(pop: &Population) -> Self {
        let fitnesses: Vec<f64> = pop
            .individuals()
            .iter()
            .filter_map(|ind| ind.cached_fitness())
            .map(f64::from)
            .collect();

        if fitnesses.is_empty() {
            return Self {
                mean: 0.0,
                min: 0.0,
                max: 0.0,
                std: 0.0,
            };
        }

        let sum: f64 = fitnesses.iter().sum();
        let mean = sum / fitnesses.len() as f64;

        let min = fitnesses.iter().copied().fold(f64::INFINITY, f64::min);
        let max = fitnesses.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let variance: f64 =
            fitnesses.iter().map(|&f| (f - mean).powi(2)).sum::<f64>() / fitnesses.len() as f64;
        let std = variance.sqrt();

        Self {
            mean,
            min,
            max,
            std,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::GeneticValue;

    #[test]
    fn test_recording_strategy() {
        assert!(RecordingStrategy::EveryN(10).should_record(0));
        assert!(RecordingStrategy::EveryN(10).should_record(20));
        assert!(!RecordingStrategy::EveryN(10).should_record(5));
        assert!(!RecordingStrategy::EveryN(0).should_record(5));
        assert!(RecordingStrategy::Specific(vec![1, 3]).should_record(3));
        assert!(RecordingStrategy::All.should_record(7));
        assert!(!RecordingStrategy::None.should_record(0));
    }

    #[test]
    fn test_values_follow_columns() {
        let row = GenerationStats {
            generation: 7,
            size: 30,
            fixed_neutral: 2,
            total_hprime: -1.5,
            ..Default::default()
        };
        let values = row.values();
        let at = |name: &str| values[GenerationStats::COLUMNS.iter().position(|c| *c == name).unwrap()];
        assert_eq!(at("generation"), 7.0);
        assert_eq!(at("size"), 30.0);
        assert_eq!(at("fixed_neutral"), 2.0);
        assert_eq!(at("total_hprime"), -1.5);
    }

    #[test]
    fn test_fitness_stats_uniform_population() {
        let mut pop = Population::new(4);
        pop.update_fitness(&GeneticValue::default());
        let stats = FitnessStats::from_population(&pop);
        assert_eq!(stats.mean, 1.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 1.0);
        assert_eq!(stats.std, 0.0);
    }

    #[test]
    fn test_fitness_stats_without_cache() {
        let pop = Population::new(4);
        let stats = FitnessStats::from_population(&pop);
        assert_eq!(stats.mean, 0.0);
    }
}
