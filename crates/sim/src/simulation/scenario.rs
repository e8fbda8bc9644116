//! Multi-stage demographic scenarios.
//!
//! A scenario starts from a burn-in stage and branches into a tree of
//! child stages. Each child evolves its own copy of its parent's final
//! population, so sibling stages share history up to the branch point and
//! are independent afterwards. Every stage is run once per replicate and
//! per dominance model, and yields one [`StageRecord`].

use crate::errors::{ParameterError, ScenarioError};
use crate::evolution::GeneticValue;
use crate::simulation::{
    evolve, ModelParams, Population, ReproductionMode, TemporalSampler, Trajectory,
};
use crate::storage::{GenerationStats, StageRecord};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// Dominance of new selected mutations, named for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominanceModel {
    pub name: String,
    pub h: f64,
}

impl DominanceModel {
    pub fn new(name: impl Into<String>, h: f64) -> Self {
        Self {
            name: name.into(),
            h,
        }
    }
}

/// One demographic phase and the phases that branch from its end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Unique name, used as the series key in storage.
    pub name: String,
    pub trajectory: Trajectory,
    /// `[start, end)` slice of the trajectory to run; the whole span if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<[usize; 2]>,
    #[serde(default = "default_mode")]
    pub mode: ReproductionMode,
    /// Record statistics when `generation % record_every == 0`.
    pub record_every: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StageConfig>,
}

fn default_mode() -> ReproductionMode {
    ReproductionMode::Outcrossing
}

impl StageConfig {
    /// A stage without children covering the whole trajectory.
    pub fn new(
        name: impl Into<String>,
        trajectory: Trajectory,
        mode: ReproductionMode,
        record_every: usize,
    ) -> Self {
        Self {
            name: name.into(),
            trajectory,
            window: None,
            mode,
            record_every,
            children: Vec::new(),
        }
    }

    /// Restrict the stage to generations `start..end` of its trajectory.
    pub fn with_window(mut self, start: usize, end: usize) -> Self {
        self.window = Some([start, end]);
        self
    }

    /// Add a child stage.
    pub fn with_child(mut self, child: StageConfig) -> Self {
        self.children.push(child);
        self
    }

    /// Population sizes of this stage.
    pub fn demography(&self) -> Result<Vec<u32>, ParameterError> {
        match self.window {
            Some([start, end]) => self.trajectory.window(start, end),
            None => Ok(self.trajectory.sizes()),
        }
    }

    /// Number of generations this stage runs.
    pub fn generations(&self) -> usize {
        match self.window {
            Some([start, end]) => end.saturating_sub(start),
            None => self.trajectory.span(),
        }
    }

    /// This stage and its descendants, depth first.
    pub fn walk(&self) -> Vec<&StageConfig> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }
}

/// A complete scenario, as read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    pub replicates: usize,
    pub seed: u64,
    /// Population-scaled mutation rate `4 N μ` for the whole locus.
    pub theta: f64,
    /// Population-scaled recombination rate `4 N r` for the whole locus.
    pub rho: f64,
    /// Size `N` used to scale `theta` and `rho`, and initial population size.
    pub reference_size: u32,
    /// Number of diploids sampled for the statistics.
    pub sample_size: usize,
    pub dominance_models: Vec<DominanceModel>,
    #[serde(default)]
    pub genetic_value: GeneticValue,
    #[serde(default)]
    pub prune_selected: bool,
    pub burnin: StageConfig,
}

impl ScenarioConfig {
    /// Load a scenario from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a scenario from JSON.
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the scenario to a JSON file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ScenarioError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// All stages, depth first from the burn-in.
    pub fn stages(&self) -> Vec<&StageConfig> {
        self.burnin.walk()
    }

    /// Total generations over every stage of one replicate.
    pub fn total_generations(&self) -> usize {
        self.stages().iter().map(|s| s.generations()).sum()
    }

    /// Check the scenario without running it.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let invalid = |msg: String| -> Result<(), ScenarioError> { Err(ScenarioError::Validation(msg)) };
        if self.replicates == 0 {
            return invalid("replicates must be at least 1".into());
        }
        if self.reference_size == 0 {
            return invalid("reference_size must be positive".into());
        }
        if self.sample_size == 0 {
            return invalid("sample_size must be positive".into());
        }
        if !(self.theta.is_finite() && self.theta >= 0.0) {
            return invalid(format!("theta must be finite and non-negative, got {}", self.theta));
        }
        if !(self.rho.is_finite() && self.rho >= 0.0) {
            return invalid(format!("rho must be finite and non-negative, got {}", self.rho));
        }
        if self.dominance_models.is_empty() {
            return invalid("at least one dominance model is required".into());
        }
        let mut models = HashSet::new();
        for model in &self.dominance_models {
            if !models.insert(model.name.as_str()) {
                return invalid(format!("duplicate dominance model '{}'", model.name));
            }
        }

        let mut names = HashSet::new();
        for stage in self.stages() {
            if stage.name.is_empty() {
                return invalid("stage names must not be empty".into());
            }
            if !names.insert(stage.name.as_str()) {
                return invalid(format!("duplicate stage name '{}'", stage.name));
            }
            if stage.record_every == 0 {
                return invalid(format!("stage '{}': record_every must be positive", stage.name));
            }
            stage
                .trajectory
                .validate()
                .and_then(|_| stage.demography())
                .map_err(|e| ScenarioError::Validation(format!("stage '{}': {e}", stage.name)))?;
            for model in &self.dominance_models {
                self.stage_params(stage, model).map_err(|e| {
                    ScenarioError::Validation(format!(
                        "stage '{}', model '{}': {e}",
                        stage.name, model.name
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Model parameters for one stage under one dominance model.
    pub fn stage_params(
        &self,
        stage: &StageConfig,
        model: &DominanceModel,
    ) -> Result<ModelParams, ParameterError> {
        let mut params = ModelParams::scaled(
            stage.demography()?,
            self.theta,
            self.rho,
            self.reference_size,
            model.h,
        )?;
        params.genetic_value = self.genetic_value;
        params.prune_selected = self.prune_selected;
        params.validate()?;
        Ok(params)
    }

    /// Seed of the `k`-th stage (depth first) of `replicate`:
    /// `seed + replicate + k + 1`.
    ///
    /// Seeds overlap between replicates: the burn-in of replicate `r + 1`
    /// and the first child stage of replicate `r` share a seed. The two
    /// stages start from different populations, so their trajectories
    /// still differ.
    pub fn stage_seed(&self, replicate: usize, k: usize) -> u64 {
        self.seed
            .wrapping_add(replicate as u64)
            .wrapping_add(k as u64)
            .wrapping_add(1)
    }
}

/// A per-stage recorder whose rows are collected once the stage ends.
pub trait StageRecorder: TemporalSampler {
    /// The rows recorded during the stage.
    fn into_rows(self) -> Vec<GenerationStats>;
}

/// A validated scenario plus the recorder each stage uses.
///
/// `factory` is called once per stage with the stage and its seed.
pub struct Scenario<F> {
    config: ScenarioConfig,
    factory: F,
}

impl<F, R> Scenario<F>
where
    F: Fn(&StageConfig, u64) -> R + Sync,
    R: StageRecorder,
{
    /// Validate `config` and pair it with a recorder factory.
    pub fn new(config: ScenarioConfig, factory: F) -> Result<Self, ScenarioError> {
        config.validate()?;
        Ok(Self { config, factory })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Every (replicate, model) pair, replicate-major.
    pub fn jobs(&self) -> Vec<(usize, &DominanceModel)> {
        (0..self.config.replicates)
            .flat_map(|r| self.config.dominance_models.iter().map(move |m| (r, m)))
            .collect()
    }

    /// Run every stage of one replicate under one dominance model.
    pub fn run_replicate(
        &self,
        replicate: usize,
        model: &DominanceModel,
    ) -> Result<Vec<StageRecord>, ScenarioError> {
        info!(
            scenario = %self.config.name,
            replicate,
            model = %model.name,
            "starting replicate"
        );
        let mut population = Population::new(self.config.reference_size as usize);
        let mut records = Vec::new();
        let mut counter = 0;
        self.run_stage(
            &self.config.burnin,
            &mut population,
            replicate,
            model,
            &mut counter,
            &mut records,
        )?;
        info!(replicate, model = %model.name, stages = records.len(), "replicate finished");
        Ok(records)
    }

    fn run_stage(
        &self,
        stage: &StageConfig,
        population: &mut Population,
        replicate: usize,
        model: &DominanceModel,
        counter: &mut usize,
        records: &mut Vec<StageRecord>,
    ) -> Result<(), ScenarioError> {
        let seed = self.config.stage_seed(replicate, *counter);
        *counter += 1;

        let params = self
            .config
            .stage_params(stage, model)
            .map_err(|e| ScenarioError::Stage {
                stage: stage.name.clone(),
                source: e.into(),
            })?;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut recorder = (self.factory)(stage, seed);

        debug!(
            stage = %stage.name,
            replicate,
            seed,
            generations = params.generations(),
            mode = %stage.mode,
            "running stage"
        );
        evolve(&mut rng, population, &params, stage.mode, &mut recorder).map_err(|source| {
            ScenarioError::Stage {
                stage: stage.name.clone(),
                source,
            }
        })?;

        records.push(StageRecord {
            stage: stage.name.clone(),
            model: model.name.clone(),
            replicate,
            rows: recorder.into_rows(),
        });

        for child in &stage.children {
            let mut branch = population.clone();
            self.run_stage(child, &mut branch, replicate, model, counter, records)?;
        }
        Ok(())
    }

    /// Run every replicate under every model in parallel, handing each
    /// job's records to `on_done` as soon as the job finishes.
    ///
    /// `on_done` is called from worker threads and owns the records it is
    /// given. The first error, from a stage or from `on_done`, stops jobs
    /// that have not started yet and is returned. On success returns the
    /// number of records delivered.
    pub fn run_all<C>(&self, on_done: C) -> Result<usize, ScenarioError>
    where
        C: Fn(usize, &str, Vec<StageRecord>) -> Result<(), ScenarioError> + Sync,
    {
        let delivered = AtomicUsize::new(0);
        self.jobs()
            .into_par_iter()
            .try_for_each(|(replicate, model)| -> Result<(), ScenarioError> {
                let records = self.run_replicate(replicate, model)?;
                delivered.fetch_add(records.len(), Ordering::Relaxed);
                on_done(replicate, &model.name, records)
            })?;
        Ok(delivered.into_inner())
    }

    /// Run every job in parallel and keep all records, in job order.
    pub fn collect_all(&self) -> Result<Vec<StageRecord>, ScenarioError> {
        let results: Vec<Vec<StageRecord>> = self
            .jobs()
            .into_par_iter()
            .map(|(replicate, model)| self.run_replicate(replicate, model))
            .collect::<Result<_, ScenarioError>>()?;
        Ok(results.into_iter().flatten().collect())
    }
}
