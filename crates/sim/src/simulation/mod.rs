//! Simulation engine, population management and scenario orchestration.
//!
//! The most commonly used simulation types are re-exported here for
//! convenience so consumers can import them from `clonal_sim::simulation`.
//!
//! - `evolve`: runs a population through a demography in one reproduction
//!   mode, invoking a `TemporalSampler` after every generation.
//! - `Population`: gametes, mutations and diploids of one population.
//! - `ModelParams` / `ModelParamsBuilder`: validated model parameters.
//! - `Scenario`: burn-in plus a tree of demographic stages, run per
//!   replicate and dominance model.

pub mod builder;
pub mod demography;
pub mod engine;
pub mod parameters;
pub mod population;
pub mod sampler;
pub mod scenario;

pub use builder::ModelParamsBuilder;
pub use demography::Trajectory;
pub use engine::{evolve, EvolveSummary, ReproductionMode};
pub use parameters::ModelParams;
pub use population::Population;
pub use sampler::{RecordNothing, TemporalSampler};
pub use scenario::{DominanceModel, Scenario, ScenarioConfig, StageConfig, StageRecorder};
