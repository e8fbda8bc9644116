use anyhow::{anyhow, Context, Result};
use clonal_analysis::RecordStats;
use clonal_sim::errors::ScenarioError;
use clonal_sim::simulation::{Scenario, ScenarioConfig};
use clonal_sim::storage::{AsyncRecorder, StageRecord};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::defaults;
use crate::printing::print_scenario;

pub fn run_scenario(
    config_path: &Path,
    database: &Path,
    replicates_override: Option<usize>,
    seed_override: Option<u64>,
    show_progress: bool,
) -> Result<()> {
    println!("🧬 Clonal - Running Scenario");
    println!("============================================\n");

    let mut config = ScenarioConfig::from_file(config_path)
        .with_context(|| format!("Failed to load scenario {}", config_path.display()))?;
    if let Some(replicates) = replicates_override {
        config.replicates = replicates;
    }
    if let Some(seed) = seed_override {
        config.seed = seed;
    }
    config.validate().context("Invalid scenario")?;

    print_scenario(&config);

    let jobs = config.replicates * config.dominance_models.len();
    println!("\n🚀 Running {jobs} jobs (replicates × dominance models)...\n");

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let start = Instant::now();

    let (records, stats) = rt.block_on(async {
        let recorder = Arc::new(
            AsyncRecorder::new(database, &config, defaults::RECORDER_CAPACITY)
                .context("Failed to create recorder")?,
        );

        let pb = if show_progress {
            let pb = ProgressBar::new(jobs as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {per_sec}",
                    )
                    .context("Invalid progress template")?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let worker_recorder = recorder.clone();
        let worker_pb = pb.clone();
        let sample_size = config.sample_size;
        let scenario_config = config.clone();
        let records = tokio::task::spawn_blocking(move || -> Result<usize> {
            let scenario = Scenario::new(scenario_config, RecordStats::factory(sample_size))?;
            let records = scenario.run_all(|replicate, model, records| {
                queue_records(&worker_recorder, replicate, model, records)?;
                if let Some(pb) = &worker_pb {
                    pb.inc(1);
                }
                Ok(())
            })?;
            Ok(records)
        })
        .await
        .context("Simulation task panicked")??;

        if let Some(pb) = pb {
            pb.finish_with_message("Done");
        }

        let recorder = Arc::try_unwrap(recorder)
            .map_err(|_| anyhow!("Recorder is still shared after the simulation finished"))?;
        let stats = recorder.close().await.context("Failed to close recorder")?;
        Ok::<_, anyhow::Error>((records, stats))
    })?;

    let elapsed = start.elapsed();
    tracing::info!(records, elapsed_ms = elapsed.as_millis() as u64, "scenario finished");

    println!("\n✓ Scenario complete!");
    println!("  Stage records: {records}");
    println!("  Rows written: {}", stats.rows_written);
    println!("  Avg write time: {:.2} ms/record", stats.avg_write_ms);
    println!("  Elapsed: {:.1} s", elapsed.as_secs_f64());
    println!("  Database: {}", database.display());
    println!(
        "\n💡 Use 'clonal list --database {}' to see the recorded series",
        database.display()
    );

    Ok(())
}

/// Hand one job's records to the database writer.
fn queue_records(
    recorder: &AsyncRecorder,
    replicate: usize,
    model: &str,
    records: Vec<StageRecord>,
) -> Result<(), ScenarioError> {
    for record in records {
        let stage = record.stage.clone();
        recorder.record_blocking(record).map_err(|e| {
            tracing::error!(replicate, model, %stage, "failed to queue record: {e}");
            ScenarioError::from(e)
        })?;
    }
    Ok(())
}
