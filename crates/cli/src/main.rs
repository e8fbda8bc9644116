mod args;
mod commands;
pub mod defaults;
mod printing;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use args::{ExportArgs, InitArgs};
use commands::{export, init, list, run, validate};

/// Clonal: forward-time simulation of clonal propagation
///
/// Simulates a diploid population with neutral and deleterious mutations
/// through a burn-in and a tree of demographic stages, where each stage
/// reproduces either by outcrossing or clonally, and records Tajima's D,
/// π, H' and the genetic load over time.
#[derive(Parser, Debug)]
#[command(name = "clonal")]
#[command(author, version, about = "Simulates clonal propagation after domestication", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    ///
    /// RUST_LOG takes precedence when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a new scenario file.
    ///
    /// The scenario holds the burn-in, the demographic stages branching
    /// from it and the dominance models, but nothing is simulated yet.
    Init(Box<InitArgs>),

    /// Run every replicate of a scenario and record its statistics.
    Run {
        /// Scenario file
        #[arg(short, long, default_value = defaults::CONFIG_FILE)]
        config: PathBuf,

        /// Database path (where to save data)
        #[arg(short, long, default_value = defaults::OUTPUT_DB)]
        database: PathBuf,

        /// Override number of replicates
        #[arg(short = 'r', long)]
        replicates: Option<usize>,

        /// Override base random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Show progress bar
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        progress: bool,
    },

    /// List the recorded series in a database.
    List {
        /// Database path
        #[arg(short, long, default_value = defaults::OUTPUT_DB)]
        database: PathBuf,
    },

    /// Export recorded statistics to CSV or JSON.
    Export(Box<ExportArgs>),

    /// Check a scenario file without running it.
    Validate {
        /// Scenario file
        #[arg(short, long, default_value = defaults::CONFIG_FILE)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build global thread pool")?;
    }

    match cli.command {
        Commands::Init(args) => init::init_scenario(&args),
        Commands::Run {
            config,
            database,
            replicates,
            seed,
            progress,
        } => run::run_scenario(&config, &database, replicates, seed, progress),
        Commands::List { database } => list::list_series(&database),
        Commands::Export(args) => export::export_data(&args),
        Commands::Validate { config } => validate::validate_scenario(&config),
    }
}

/// Logs go to stderr so exports written to stdout stay clean.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::default().add_directive(level.into()));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
