use clonal_sim::evolution::GeneticValue;
use clonal_sim::simulation::{ScenarioConfig, StageConfig, Trajectory};

pub fn print_scenario(config: &ScenarioConfig) {
    println!("\n📋 Scenario Configuration");
    println!("  • Name: {}", config.name);
    println!("  • Replicates: {} [-r, --replicates]", config.replicates);
    println!("  • Base Seed: {} [--seed]", config.seed);
    println!("  • Sample Size: {} diploids", config.sample_size);

    println!("\n⚡ Mutation and Recombination");
    println!(
        "  • θ = 4Nμ: {} (N = {})",
        config.theta, config.reference_size
    );
    println!("  • ρ = 4Nr: {}", config.rho);
    match config.genetic_value {
        GeneticValue::Multiplicative { scaling } => {
            println!("  • Fitness: multiplicative (homozygote scaling {scaling})")
        }
        GeneticValue::Additive { scaling } => {
            println!("  • Fitness: additive (homozygote scaling {scaling})")
        }
    }
    if config.prune_selected {
        println!("  • Fixed selected mutations are pruned");
    }

    println!("\n🧪 Dominance Models");
    for model in &config.dominance_models {
        println!("  • {}: h = {}", model.name, model.h);
    }

    println!("\n🌳 Stages");
    print_stage(&config.burnin, 1);
    println!(
        "\n  {} stages, {} generations per replicate and model",
        config.stages().len(),
        config.total_generations()
    );
}

fn print_stage(stage: &StageConfig, depth: usize) {
    let window = match stage.window {
        Some([start, end]) => format!(" [{start}..{end})"),
        None => String::new(),
    };
    println!(
        "{}• {}: {}{}, {} gens, {}, every {}",
        "  ".repeat(depth),
        stage.name,
        describe(&stage.trajectory),
        window,
        stage.generations(),
        stage.mode,
        stage.record_every
    );
    for child in &stage.children {
        print_stage(child, depth + 1);
    }
}

fn describe(trajectory: &Trajectory) -> String {
    match *trajectory {
        Trajectory::Constant { size, .. } => format!("N = {size}"),
        Trajectory::Linear { from, to, .. } => format!("N {from} → {to} (linear)"),
        Trajectory::Exponential { from, to, .. } => format!("N {from} → {to} (exponential)"),
    }
}
