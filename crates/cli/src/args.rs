use clap::Args;
use std::path::PathBuf;

use crate::defaults;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Scenario name
    #[arg(short = 'N', long, default_value = defaults::SCENARIO_NAME)]
    pub name: String,

    /// Output scenario file
    #[arg(short, long, default_value = defaults::CONFIG_FILE)]
    pub output: PathBuf,

    /// Scenario template (bottleneck, domestication)
    ///
    /// `bottleneck` branches the burn-in into a constant and a discretely
    /// reduced population; `domestication` adds linear and exponential
    /// declines. Every branch ends in an outcrossing and a clonal stage.
    #[arg(long, default_value = defaults::TEMPLATE)]
    pub template: String,

    /// Number of replicates
    #[arg(short = 'r', long, default_value_t = defaults::REPLICATES)]
    pub replicates: usize,

    /// Base random seed
    #[arg(long, default_value_t = defaults::SEED)]
    pub seed: u64,

    /// Population-scaled mutation rate 4Nμ for the locus
    #[arg(long, default_value_t = defaults::THETA)]
    pub theta: f64,

    /// Population-scaled recombination rate 4Nr for the locus
    #[arg(long, default_value_t = defaults::RHO)]
    pub rho: f64,

    /// Ancestral (burn-in) population size
    #[arg(long, default_value_t = defaults::ANCESTRAL_SIZE)]
    pub ancestral_size: u32,

    /// Present population size at the end of the decline
    #[arg(long, default_value_t = defaults::PRESENT_SIZE)]
    pub present_size: u32,

    /// Burn-in length in multiples of the ancestral size
    #[arg(long, default_value_t = defaults::BURNIN_FACTOR)]
    pub burnin_factor: usize,

    /// Generations of decline before domestication
    #[arg(long, default_value_t = defaults::DECLINE_GENERATIONS)]
    pub decline_generations: usize,

    /// Generations of domestication
    #[arg(long, default_value_t = defaults::DOMESTICATION_GENERATIONS)]
    pub domestication_generations: usize,

    /// Diploids sampled for Tajima's D, π and H'
    #[arg(long, default_value_t = defaults::SAMPLE_SIZE)]
    pub sample_size: usize,

    /// Recording interval during the burn-in
    #[arg(long, default_value_t = defaults::BURNIN_RECORD_EVERY)]
    pub burnin_record_every: usize,

    /// Recording interval after the burn-in
    #[arg(long, default_value_t = defaults::RECORD_EVERY)]
    pub record_every: usize,

    /// Dominance model as name=h (repeatable)
    #[arg(long = "dominance", value_name = "NAME=H", default_values_t = defaults::DOMINANCE_MODELS.map(String::from))]
    pub dominance: Vec<String>,

    /// Remove fixed selected mutations from gametes
    #[arg(long)]
    pub prune_selected: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Database path
    #[arg(short, long, default_value = defaults::OUTPUT_DB)]
    pub database: PathBuf,

    /// Output format (csv, json)
    #[arg(short, long, default_value = "csv")]
    pub format: String,

    /// Only this stage
    #[arg(long)]
    pub stage: Option<String>,

    /// Only this dominance model
    #[arg(long)]
    pub model: Option<String>,

    /// Only this replicate
    #[arg(long)]
    pub replicate: Option<usize>,

    /// Export means over replicates instead of individual series
    #[arg(long)]
    pub summary: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
