//! Shared default values for scenario configuration.
//! These values are used by the `init` command (via clap) and its tests.

pub const SCENARIO_NAME: &str = "domestication";
pub const CONFIG_FILE: &str = "scenario.json";
pub const OUTPUT_DB: &str = "simulation.db";
pub const TEMPLATE: &str = "bottleneck";

pub const REPLICATES: usize = 500;
pub const SEED: u64 = 0;

// Population-scaled rates for the whole locus: θ = 4 per kb, ρ = 0.8 per kb over 1 Mb
pub const THETA: f64 = 4000.0;
pub const RHO: f64 = 800.0;

// Demography
pub const ANCESTRAL_SIZE: u32 = 4000;
pub const PRESENT_SIZE: u32 = 200;
pub const BURNIN_FACTOR: usize = 8;
pub const DECLINE_GENERATIONS: usize = 73;
pub const DOMESTICATION_GENERATIONS: usize = 27;

// Recording
pub const SAMPLE_SIZE: usize = 100;
pub const BURNIN_RECORD_EVERY: usize = 100;
pub const RECORD_EVERY: usize = 1;

/// `name=h` pairs.
pub const DOMINANCE_MODELS: [&str; 2] = ["additive=1", "recessive=0"];

/// Records buffered between the simulation and the database writer.
pub const RECORDER_CAPACITY: usize = 64;
