//! # Analysis Crate
//!
//! Summary statistics of `clonal-sim` populations and the recorder that
//! collects them during a simulation.

pub mod analysis;

pub use analysis::{RecordStats, SampleMatrix};
