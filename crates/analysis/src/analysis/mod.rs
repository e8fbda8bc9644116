//! Population genetics analysis tools for clonal-sim
//!
//! This module provides:
//! - Samples of chromosomes split into neutral and selected sites
//! - Polymorphism summaries (segregating sites, site frequency spectrum)
//! - θ estimators and neutrality tests (π, θ_W, θ_H, θ_L, Tajima's D, H, H')
//! - Genetic load
//! - The `RecordStats` temporal recorder and replicate summaries

pub mod diversity;
pub mod load;
pub mod polymorphism;
pub mod recorder;
pub mod sample;
pub mod temporal;
pub mod utils;

// Re-export commonly used functions
pub use diversity::{
    fay_wu_h, normalized_fay_wu_h, tajimas_d, theta_h, theta_l, theta_pi, theta_w,
};
pub use load::{genetic_load, GeneticLoad};
pub use polymorphism::{segregating_sites, site_frequency_spectrum};
pub use recorder::RecordStats;
pub use sample::{sample_separate, SampleMatrix};
pub use temporal::{fitness_dynamics, replicate_means, MeanRow};
