use anyhow::{bail, Context, Result};
use clonal_sim::simulation::{
    DominanceModel, ReproductionMode, ScenarioConfig, StageConfig, Trajectory,
};

use crate::args::InitArgs;
use crate::printing::print_scenario;

pub fn init_scenario(args: &InitArgs) -> Result<()> {
    println!("🧬 Clonal - Clonal Propagation Simulator");
    println!("=========================================\n");
    println!("Initializing scenario: {}", args.name);
    println!("Template: {}", args.template);

    let config = build_scenario(args)?;
    config
        .validate()
        .context("Generated scenario is invalid")?;

    print_scenario(&config);

    config
        .to_file(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("\n✓ Scenario written: {}", args.output.display());
    println!("\nScenario initialized successfully!");
    println!("  Stages: {}", config.stages().len());
    println!("  Replicates: {}", config.replicates);
    println!(
        "\n💡 Use 'clonal run --config {}' to start the simulation",
        args.output.display()
    );

    Ok(())
}

/// Build the scenario described by `args`.
///
/// The burn-in runs `burnin_factor × ancestral_size` generations at the
/// ancestral size. Each branch then covers a decline phase followed by a
/// domestication phase over one trajectory, and the domestication phase is
/// run twice from the end of the decline: once outcrossing and once clonal.
pub fn build_scenario(args: &InitArgs) -> Result<ScenarioConfig> {
    let branches: &[&str] = match args.template.as_str() {
        "bottleneck" => &["const", "disc"],
        "domestication" => &["const", "lin", "exp", "disc"],
        other => bail!("Unknown template: {other}. Use 'bottleneck' or 'domestication'"),
    };

    let burnin = StageConfig::new(
        "ancestral",
        Trajectory::Constant {
            size: args.ancestral_size,
            span: args.burnin_factor * args.ancestral_size as usize,
        },
        ReproductionMode::Outcrossing,
        args.burnin_record_every,
    );
    let burnin = branches
        .iter()
        .try_fold(burnin, |stage, &branch| -> Result<StageConfig> {
            Ok(stage.with_child(build_branch(args, branch)?))
        })?;

    Ok(ScenarioConfig {
        name: args.name.clone(),
        replicates: args.replicates,
        seed: args.seed,
        theta: args.theta,
        rho: args.rho,
        reference_size: args.ancestral_size,
        sample_size: args.sample_size,
        dominance_models: parse_dominance(&args.dominance)?,
        genetic_value: Default::default(),
        prune_selected: args.prune_selected,
        burnin,
    })
}

fn build_branch(args: &InitArgs, branch: &str) -> Result<StageConfig> {
    let decline = args.decline_generations;
    let span = decline + args.domestication_generations;
    let (ancestral, present) = (args.ancestral_size, args.present_size);
    let trajectory = match branch {
        "const" => Trajectory::Constant {
            size: ancestral,
            span,
        },
        "lin" => Trajectory::Linear {
            from: ancestral,
            to: present,
            span,
        },
        "exp" => Trajectory::Exponential {
            from: ancestral,
            to: present,
            span,
        },
        "disc" => Trajectory::Constant {
            size: present,
            span,
        },
        other => bail!("Unknown trajectory: {other}"),
    };

    let domestication = |suffix: &str, mode| {
        StageConfig::new(
            format!("{branch}_domest_{suffix}"),
            trajectory,
            mode,
            args.record_every,
        )
        .with_window(decline, span)
    };

    Ok(
        StageConfig::new(
            format!("{branch}_decl"),
            trajectory,
            ReproductionMode::Outcrossing,
            args.record_every,
        )
        .with_window(0, decline)
        .with_child(domestication("out", ReproductionMode::Outcrossing))
        .with_child(domestication("clonal", ReproductionMode::Clonal)),
    )
}

/// Parse `name=h` pairs.
pub fn parse_dominance(entries: &[String]) -> Result<Vec<DominanceModel>> {
    entries
        .iter()
        .map(|entry| {
            let (name, h) = entry
                .split_once('=')
                .with_context(|| format!("Invalid dominance model '{entry}', expected NAME=H"))?;
            let h: f64 = h
                .trim()
                .parse()
                .with_context(|| format!("Invalid dominance coefficient in '{entry}'"))?;
            Ok(DominanceModel::new(name.trim(), h))
        })
        .collect()
}
