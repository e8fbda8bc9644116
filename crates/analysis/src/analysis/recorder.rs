//! The per-generation statistics recorder.

use crate::analysis::diversity::{normalized_fay_wu_h, tajimas_d, theta_pi};
use crate::analysis::load::genetic_load;
use crate::analysis::sample::sample_separate;
use clonal_sim::errors::RecorderError;
use clonal_sim::simulation::{Population, StageConfig, StageRecorder, TemporalSampler};
use clonal_sim::storage::{GenerationStats, RecordingStrategy};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::trace;

/// Records load and sample statistics whenever its strategy selects the
/// current generation.
///
/// Samples are drawn with the recorder's own RNG, so recording does not
/// perturb the simulation's random stream.
#[derive(Debug, Clone)]
pub struct RecordStats {
    strategy: RecordingStrategy,
    sample_size: usize,
    rng: Xoshiro256PlusPlus,
    rows: Vec<GenerationStats>,
}

impl RecordStats {
    /// Record every `record_every` generations, sampling `sample_size`
    /// diploids. The RNG is seeded from `seed` and moved to a stream
    /// disjoint from a simulation RNG with the same seed.
    pub fn new(record_every: usize, sample_size: usize, seed: u64) -> Self {
        Self::with_strategy(RecordingStrategy::EveryN(record_every), sample_size, seed)
    }

    pub fn with_strategy(strategy: RecordingStrategy, sample_size: usize, seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        rng.long_jump();
        Self {
            strategy,
            sample_size,
            rng,
            rows: Vec::new(),
        }
    }

    /// A recorder factory for [`clonal_sim::simulation::Scenario`].
    pub fn factory(sample_size: usize) -> impl Fn(&StageConfig, u64) -> RecordStats + Sync + Copy {
        move |stage: &StageConfig, seed: u64| RecordStats::new(stage.record_every, sample_size, seed)
    }

    pub fn rows(&self) -> &[GenerationStats] {
        &self.rows
    }

    /// Compute every statistic for the current generation.
    pub fn compute(&mut self, population: &Population) -> GenerationStats {
        let load = genetic_load(population);
        let (neutral, selected) =
            sample_separate(&mut self.rng, population, self.sample_size, false);
        let combined = neutral.merge(&selected);

        GenerationStats {
            generation: population.generation(),
            size: population.size(),
            mean_fitness: load.mean_fitness,
            relative_load: load.relative_load,
            segregating_load: load.segregating_load,
            fixed_load: load.fixed_load,
            fixed_deleterious: load.fixed_deleterious,
            fixed_neutral: load.fixed_neutral,
            mean_deleterious_per_diploid: load.mean_deleterious_per_diploid,
            mean_neutral_per_diploid: load.mean_neutral_per_diploid,
            cumulative_deleterious_frequency: load.cumulative_deleterious_frequency,
            cumulative_neutral_frequency: load.cumulative_neutral_frequency,
            neutral_tajimas_d: tajimas_d(&neutral),
            total_tajimas_d: tajimas_d(&combined),
            neutral_pi: theta_pi(&neutral),
            total_pi: theta_pi(&combined),
            neutral_hprime: normalized_fay_wu_h(&neutral),
            total_hprime: normalized_fay_wu_h(&combined),
        }
    }
}

impl TemporalSampler for RecordStats {
    fn record(&mut self, population: &Population) -> Result<(), RecorderError> {
        if !self.strategy.should_record(population.generation()) {
            return Ok(());
        }
        if population.is_empty() {
            return Err(RecorderError::Sampling(format!(
                "empty population at generation {}",
                population.generation()
            )));
        }
        let row = self.compute(population);
        trace!(
            generation = row.generation,
            size = row.size,
            mean_fitness = row.mean_fitness,
            total_pi = row.total_pi,
            "recorded statistics"
        );
        self.rows.push(row);
        Ok(())
    }
}

impl StageRecorder for RecordStats {
    fn into_rows(self) -> Vec<GenerationStats> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clonal_sim::evolution::Dfe;
    use clonal_sim::simulation::{evolve, ModelParams, ModelParamsBuilder, ReproductionMode};

    fn params(generations: usize) -> ModelParams {
        ModelParamsBuilder::new()
            .constant_size(40, generations)
            .neutral_region(0.0, 1.0, 1.0)
            .selected_region(0.0, 1.0, 1.0, Dfe::Gamma { mean: -0.05, shape: 0.3 }, 1.0)
            .recombination_region(0.0, 1.0, 1.0)
            .mutation_rates(0.1, 0.01)
            .recombination_rate(0.1)
            .build()
            .unwrap()
    }

    fn run(seed: u64, generations: usize, every: usize) -> Vec<GenerationStats> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut pop = Population::new(40);
        let mut recorder = RecordStats::new(every, 10, seed);
        evolve(&mut rng, &mut pop, &params(generations), ReproductionMode::Outcrossing, &mut recorder)
            .unwrap();
        recorder.into_rows()
    }

    #[test]
    fn test_records_on_schedule() {
        let rows = run(1, 50, 10);
        let gens: Vec<usize> = rows.iter().map(|r| r.generation).collect();
        assert_eq!(gens, vec![10, 20, 30, 40, 50]);
        assert!(rows.iter().all(|r| r.size == 40));
    }

    #[test]
    fn test_statistics_after_mutation() {
        let rows = run(2, 100, 100);
        let last = rows.last().unwrap();
        assert!(last.total_pi >= last.neutral_pi);
        assert!(last.total_pi > 0.0);
        assert!(last.total_tajimas_d.is_finite());
        assert!(last.mean_neutral_per_diploid > 0.0);
        assert!(last.mean_fitness <= 1.0);
    }

    #[test]
    fn test_recorder_is_reproducible() {
        let a = run(3, 30, 5);
        let b = run(3, 30, 5);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.total_pi.to_bits(), y.total_pi.to_bits());
            assert_eq!(x.mean_fitness.to_bits(), y.mean_fitness.to_bits());
        }
    }

    #[test]
    fn test_monomorphic_statistics_are_nan() {
        let mut pop = Population::new(5);
        pop.update_fitness(&clonal_sim::evolution::GeneticValue::default());
        let mut recorder = RecordStats::new(1, 5, 0);
        let row = recorder.compute(&pop);
        assert!(row.neutral_tajimas_d.is_nan());
        assert!(row.total_hprime.is_nan());
        assert_eq!(row.neutral_pi, 0.0);
        assert_eq!(row.relative_load, 0.0);
    }

    #[test]
    fn test_strategy_none_records_nothing() {
        let mut recorder = RecordStats::with_strategy(RecordingStrategy::None, 5, 0);
        recorder.record(&Population::new(5)).unwrap();
        assert!(recorder.rows().is_empty());
    }

    #[test]
    fn test_factory_uses_stage_interval() {
        let stage = StageConfig::new(
            "s",
            clonal_sim::simulation::Trajectory::Constant { size: 5, span: 4 },
            ReproductionMode::Clonal,
            2,
        );
        let make = RecordStats::factory(3);
        let mut recorder = make(&stage, 9);
        let pop = Population::new(5);
        recorder.record(&pop).unwrap();
        assert_eq!(recorder.rows().len(), 1);
        assert_eq!(recorder.rows()[0].generation, 0);
    }
}
