use anyhow::{Context, Result};
use clonal_sim::storage::QueryBuilder;
use std::collections::BTreeMap;
use std::path::Path;

pub fn list_series(database: &Path) -> Result<()> {
    let query = QueryBuilder::new(database).context("Failed to open database")?;
    let series = query.list_series().context("Failed to list series")?;
    let meta = query.get_metadata().context("Failed to read metadata")?;

    if series.is_empty() {
        println!("No series found in database.");
        return Ok(());
    }

    let scenario = meta.get("scenario").map(String::as_str).unwrap_or("unknown");
    println!("\n📊 Series of '{scenario}' in {}:", database.display());
    println!("{}", "=".repeat(50));

    // (stage, model) -> (replicates, rows)
    let mut groups: BTreeMap<(&str, &str), (usize, usize)> = BTreeMap::new();
    for s in &series {
        let entry = groups.entry((&s.stage, &s.model)).or_default();
        entry.0 += 1;
        entry.1 += s.rows;
    }

    for ((stage, model), (replicates, rows)) in &groups {
        println!("  • {stage} [{model}]: {replicates} replicates, {rows} rows");
    }
    println!(
        "\nTotal: {} series, {} rows",
        series.len(),
        series.iter().map(|s| s.rows).sum::<usize>()
    );

    println!("\n💡 Use 'clonal export --stage <stage> --model <model>' to export a series");

    Ok(())
}
