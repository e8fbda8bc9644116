//! # Simulation Crate
//!
//! The `clonal-sim` crate provides forward-time simulation of a diploid
//! Wright-Fisher population under the infinite-sites model. Offspring are
//! produced either by outcrossing (meiosis with recombination) or by clonal
//! propagation of a single parent. It includes modules for mutations and
//! gametes, evolutionary operators (mutation, recombination, selection),
//! the simulation engine with multi-stage demographic scenarios, and
//! SQLite storage of recorded statistics.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod genome;
pub mod prelude;
pub mod simulation;
pub mod storage;

pub use base::{FitnessValue, Mutation, MutationKey};
