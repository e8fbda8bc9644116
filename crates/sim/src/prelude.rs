//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use clonal_sim::prelude::*;
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//!
//! let params = ModelParamsBuilder::new()
//!     .constant_size(20, 10)
//!     .neutral_region(0.0, 1.0, 1.0)
//!     .selected_region(0.0, 1.0, 1.0, Dfe::Constant { s: -0.01 }, 0.5)
//!     .mutation_rates(0.01, 0.001)
//!     .build()
//!     .unwrap();
//! let mut population = Population::new(20);
//! let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
//! let summary = evolve(
//!     &mut rng,
//!     &mut population,
//!     &params,
//!     ReproductionMode::Clonal,
//!     &mut RecordNothing,
//! )
//! .unwrap();
//! assert_eq!(summary.generations, 10);
//! ```

pub use crate::base::{FitnessValue, Mutation, MutationKey};
pub use crate::errors::{self, EvolutionError, ParameterError, RecorderError, ScenarioError};
pub use crate::evolution::{Dfe, GeneticValue, Region, SelectedRegion};
pub use crate::genome::{Gamete, Individual};
pub use crate::simulation::{
    evolve, DominanceModel, ModelParams, ModelParamsBuilder, Population, RecordNothing,
    ReproductionMode, Scenario, ScenarioConfig, StageConfig, StageRecorder, TemporalSampler,
    Trajectory,
};
pub use crate::storage::{GenerationStats, StageRecord};
