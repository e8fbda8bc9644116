//! Base types for the infinite-sites model.
//!
//! This module provides the mutation record and the fitness value type
//! shared by the genome and evolution modules.

pub mod fitness;
mod mutation;

pub use fitness::FitnessValue;
pub use mutation::{Mutation, MutationKey};
