//! Running a scenario with the statistics recorder.

use clonal_analysis::analysis::replicate_means;
use clonal_analysis::RecordStats;
use clonal_sim::simulation::{
    DominanceModel, ReproductionMode, Scenario, ScenarioConfig, StageConfig, Trajectory,
};
use clonal_sim::storage::GenerationStats;

fn config() -> ScenarioConfig {
    let bottleneck = Trajectory::Linear {
        from: 80,
        to: 20,
        span: 20,
    };
    ScenarioConfig {
        name: "stats".into(),
        replicates: 3,
        seed: 17,
        theta: 40.0,
        rho: 40.0,
        reference_size: 80,
        sample_size: 10,
        dominance_models: vec![DominanceModel::new("additive", 1.0)],
        genetic_value: Default::default(),
        prune_selected: false,
        burnin: StageConfig::new(
            "burnin",
            Trajectory::Constant { size: 80, span: 160 },
            ReproductionMode::Outcrossing,
            40,
        )
        .with_child(StageConfig::new("outcross", bottleneck, ReproductionMode::Outcrossing, 5))
        .with_child(StageConfig::new("clonal", bottleneck, ReproductionMode::Clonal, 5)),
    }
}

#[test]
fn test_scenario_statistics() {
    let config = config();
    let sample_size = config.sample_size;
    let scenario = Scenario::new(config, RecordStats::factory(sample_size)).unwrap();
    let records = scenario.collect_all().unwrap();
    assert_eq!(records.len(), 9);

    let burnin: Vec<_> = records.iter().filter(|r| r.stage == "burnin").collect();
    for record in &burnin {
        let gens: Vec<usize> = record.rows.iter().map(|r| r.generation).collect();
        assert_eq!(gens, [40, 80, 120, 160]);
        let last = record.rows.last().unwrap();
        assert!(last.total_pi > 0.0);
        assert!(last.total_pi >= last.neutral_pi);
        assert!(last.mean_fitness > 0.0 && last.mean_fitness <= 1.0);
    }

    for stage in ["outcross", "clonal"] {
        let series: Vec<_> = records.iter().filter(|r| r.stage == stage).collect();
        assert_eq!(series.len(), 3);
        let means = replicate_means(series.iter().copied());
        assert_eq!(
            means.iter().map(|m| m.generation).collect::<Vec<_>>(),
            [165, 170, 175, 180]
        );
        assert!(means.iter().all(|m| m.replicates == 3));
        let size = GenerationStats::COLUMNS.iter().position(|c| *c == "size").unwrap();
        assert_eq!(means.last().unwrap().values[size], 20.0);
    }
}

#[test]
fn test_clonal_stage_keeps_history() {
    let config = config();
    let scenario = Scenario::new(config, RecordStats::factory(10)).unwrap();
    let records = scenario
        .run_replicate(0, &DominanceModel::new("additive", 1.0))
        .unwrap();
    let clonal = records.iter().find(|r| r.stage == "clonal").unwrap();
    // Derived variation from the burn-in survives the first clonal generations.
    assert!(clonal.rows[0].total_pi > 0.0);
    assert_eq!(clonal.rows.len(), 4);
    assert!(clonal.rows.iter().all(|r| r.generation > 160));
}
