use anyhow::{bail, Context, Result};
use clonal_sim::simulation::ScenarioConfig;
use std::path::Path;

use crate::printing::print_scenario;

pub fn validate_scenario(path: &Path) -> Result<()> {
    println!("🔍 Validating scenario: {}", path.display());

    if !path.exists() {
        bail!("Scenario file does not exist");
    }

    let config = ScenarioConfig::from_file(path).context("Failed to parse scenario")?;
    println!("✓ Parsed: OK");

    if let Err(e) = config.validate() {
        println!("✗ Validation: FAILED - {e}");
        bail!("Scenario '{}' is invalid", config.name);
    }
    println!("✓ Validation: OK");

    print_scenario(&config);

    let jobs = config.replicates * config.dominance_models.len();
    println!(
        "\n✓ Scenario is valid: {jobs} jobs, {} simulated generations in total",
        jobs * config.total_generations()
    );

    Ok(())
}
