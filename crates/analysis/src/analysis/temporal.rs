//! Temporal analysis
//!
//! Summaries of recorded series over replicates.

use crate::analysis::utils::finite_mean;
use clonal_sim::storage::{GenerationStats, StageRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Column means of one generation over replicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanRow {
    pub generation: usize,
    /// Number of replicates with a row at this generation.
    pub replicates: usize,
    /// Means in [`GenerationStats::COLUMNS`] order; undefined values are
    /// skipped, and a column with none defined is `NaN`.
    pub values: [f64; 18],
}

/// Average the rows of `records` generation by generation.
///
/// Records are expected to share a stage and model; rows are grouped by
/// generation only.
pub fn replicate_means<'a>(records: impl IntoIterator<Item = &'a StageRecord>) -> Vec<MeanRow> {
    let mut by_generation: BTreeMap<usize, Vec<&GenerationStats>> = BTreeMap::new();
    for record in records {
        for row in &record.rows {
            by_generation.entry(row.generation).or_default().push(row);
        }
    }

    by_generation
        .into_iter()
        .map(|(generation, rows)| {
            let all: Vec<[f64; 18]> = rows.iter().map(|r| r.values()).collect();
            let values = std::array::from_fn(|col| finite_mean(all.iter().map(|v| v[col])));
            MeanRow {
                generation,
                replicates: rows.len(),
                values,
            }
        })
        .collect()
}

/// Mean fitness trajectory of one record.
pub fn fitness_dynamics(record: &StageRecord) -> Vec<(usize, f64)> {
    record
        .rows
        .iter()
        .map(|r| (r.generation, r.mean_fitness))
        .collect()
}
