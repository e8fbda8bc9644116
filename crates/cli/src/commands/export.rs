use anyhow::{bail, Context, Result};
use clonal_analysis::analysis::replicate_means;
use clonal_sim::storage::{GenerationStats, QueryBuilder, StageRecord};
use serde_json::json;
use std::collections::BTreeMap;

use crate::args::ExportArgs;

pub fn export_data(args: &ExportArgs) -> Result<()> {
    // Status goes to stderr so stdout carries only the exported data.
    eprintln!("📤 Exporting statistics from {}", args.database.display());

    let query = QueryBuilder::new(&args.database).context("Failed to open database")?;
    let records = load_records(&query, args)?;
    if records.is_empty() {
        bail!("No recorded series match the given filters");
    }

    let content = if args.summary {
        export_summary(&records, &args.format)?
    } else {
        export_series(&records, &args.format)?
    };

    if let Some(path) = &args.output {
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("✓ Data exported to: {}", path.display());
    } else {
        print!("{content}");
        eprintln!("\n✓ Export complete");
    }

    Ok(())
}

fn load_records(query: &QueryBuilder, args: &ExportArgs) -> Result<Vec<StageRecord>> {
    let series = query.list_series().context("Failed to list series")?;
    let mut records = Vec::new();
    for info in series {
        if args.stage.as_ref().is_some_and(|s| *s != info.stage)
            || args.model.as_ref().is_some_and(|m| *m != info.model)
            || args.replicate.is_some_and(|r| r != info.replicate)
        {
            continue;
        }
        let rows = query
            .get_series(&info.stage, &info.model, info.replicate)
            .with_context(|| format!("Failed to load series {}/{}", info.stage, info.model))?;
        records.push(StageRecord {
            stage: info.stage,
            model: info.model,
            replicate: info.replicate,
            rows,
        });
    }
    Ok(records)
}

fn export_series(records: &[StageRecord], format: &str) -> Result<String> {
    match format {
        "csv" => {
            let mut content = format!(
                "stage,model,replicate,{}\n",
                GenerationStats::COLUMNS.join(",")
            );
            for record in records {
                for row in &record.rows {
                    content.push_str(&format!(
                        "{},{},{},{}\n",
                        record.stage,
                        record.model,
                        record.replicate,
                        join_values(&row.values())
                    ));
                }
            }
            Ok(content)
        }
        "json" => Ok(serde_json::to_string_pretty(records)?),
        _ => bail!("Unknown format '{format}'. Use: csv or json"),
    }
}

fn export_summary(records: &[StageRecord], format: &str) -> Result<String> {
    let mut groups: BTreeMap<(&str, &str), Vec<&StageRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((&record.stage, &record.model))
            .or_default()
            .push(record);
    }

    match format {
        "csv" => {
            let mut content = format!(
                "stage,model,replicates,{}\n",
                GenerationStats::COLUMNS.join(",")
            );
            for ((stage, model), group) in groups {
                for row in replicate_means(group) {
                    content.push_str(&format!(
                        "{stage},{model},{},{}\n",
                        row.replicates,
                        join_values(&row.values)
                    ));
                }
            }
            Ok(content)
        }
        "json" => {
            let data: Vec<_> = groups
                .into_iter()
                .map(|((stage, model), group)| {
                    json!({
                        "stage": stage,
                        "model": model,
                        "means": replicate_means(group),
                    })
                })
                .collect();
            Ok(serde_json::to_string_pretty(&data)?)
        }
        _ => bail!("Unknown format '{format}'. Use: csv or json"),
    }
}

fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
