//! Evolution module providing mutation, recombination, and selection.
//!
//! - **Regions**: weighted intervals and distributions of fitness effects
//! - **Mutation**: Poisson numbers of new infinite-sites mutations
//! - **Recombination**: Poisson crossovers between parental gametes
//! - **Selection**: diploid genetic value and fitness-proportional parent choice

pub mod mutation;
pub mod recombination;
pub mod regions;
pub mod selection;

pub use mutation::MutationModel;
pub use recombination::{recombine_keys, RecombinationMap};
pub use regions::{Dfe, Region, SelectedRegion};
pub use selection::{DiploidFitness, GeneticValue, ParentSampler};
