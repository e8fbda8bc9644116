//! Query interface for analyzing recorded simulation data.

use crate::errors::DatabaseError;
use crate::simulation::ScenarioConfig;
use crate::storage::{Database, FitnessStats, GenerationStats};
use rusqlite::{params, OptionalExtension, Row};
use std::collections::HashMap;

/// One recorded series: a stage of one replicate under one dominance model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesInfo {
    pub stage: String,
    pub model: String,
    pub replicate: usize,
    pub rows: usize,
}

/// Query builder for analyzing simulation data.
pub struct QueryBuilder {
    db: Database,
}

impl QueryBuilder {
    /// Open a database for querying.
    pub fn new(db_path: impl AsRef<std::path::Path>) -> Result<Self, DatabaseError> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    /// Get raw metadata value by key.
    pub fn get_metadata_value(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT value FROM metadata WHERE key = ?1")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        stmt.query_row(params![key], |row| row.get(0))
            .optional()
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    /// Get all metadata as a map.
    pub fn get_metadata(&self) -> Result<HashMap<String, String>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT key, value FROM metadata")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut meta = HashMap::new();
        for row in rows {
            let (k, v): (String, String) = row.map_err(|e| DatabaseError::Query(e.to_string()))?;
            meta.insert(k, v);
        }
        Ok(meta)
    }

    /// Every recorded series, ordered by stage, model and replicate.
    pub fn list_series(&self) -> Result<Vec<SeriesInfo>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT stage, model, replicate, COUNT(*)
                 FROM stats
                 GROUP BY stage, model, replicate
                 ORDER BY stage, model, replicate",
            )
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SeriesInfo {
                    stage: row.get(0)?,
                    model: row.get(1)?,
                    replicate: row.get::<_, i64>(2)? as usize,
                    rows: row.get::<_, i64>(3)? as usize,
                })
            })
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut series = Vec::new();
        for row in rows {
            series.push(row.map_err(|e| DatabaseError::Query(e.to_string()))?);
        }
        Ok(series)
    }

    /// Rows of one series in generation order. Empty if the series is absent.
    pub fn get_series(
        &self,
        stage: &str,
        model: &str,
        replicate: usize,
    ) -> Result<Vec<GenerationStats>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT generation, size, mean_fitness, relative_load, segregating_load,
                        fixed_load, fixed_deleterious, fixed_neutral,
                        mean_deleterious_per_diploid, mean_neutral_per_diploid,
                        cumulative_deleterious_frequency, cumulative_neutral_frequency,
                        neutral_tajimas_d, total_tajimas_d, neutral_pi, total_pi,
                        neutral_hprime, total_hprime
                 FROM stats
                 WHERE stage = ?1 AND model = ?2 AND replicate = ?3
                 ORDER BY generation",
            )
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![stage, model, replicate as i64], stats_from_row)
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| DatabaseError::Query(e.to_string()))?);
        }
        Ok(out)
    }

    /// Mean fitness across replicates of one stage and model, per generation.
    pub fn get_fitness_history(
        &self,
        stage: &str,
        model: &str,
    ) -> Result<Vec<(usize, FitnessStats)>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT generation,
                        AVG(mean_fitness) as mean,
                        MIN(mean_fitness) as min,
                        MAX(mean_fitness) as max,
                        AVG(mean_fitness*mean_fitness) - AVG(mean_fitness)*AVG(mean_fitness) as var
                 FROM stats
                 WHERE stage = ?1 AND model = ?2
                 GROUP BY generation
                 ORDER BY generation",
            )
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![stage, model], |row| {
                let var: f64 = row.get::<_, Option<f64>>(4)?.unwrap_or(0.0);
                Ok((
                    row.get::<_, i64>(0)? as usize,
                    FitnessStats {
                        mean: nullable(row, 1)?,
                        min: nullable(row, 2)?,
                        max: nullable(row, 3)?,
                        std: var.max(0.0).sqrt(),
                    },
                ))
            })
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut history = Vec::new();
        for row in rows {
            history.push(row.map_err(|e| DatabaseError::Query(e.to_string()))?);
        }
        Ok(history)
    }

    /// The scenario the database was recorded from, if stored.
    pub fn get_config(&self) -> Result<Option<ScenarioConfig>, DatabaseError> {
        let Some(json) = self.get_metadata_value("full_config_json")? else {
            return Ok(None);
        };
        let config = serde_json::from_str(&json)
            .map_err(|e| DatabaseError::Query(format!("Failed to parse config: {e}")))?;
        Ok(Some(config))
    }

    /// Close the query builder.
    pub fn close(self) -> Result<(), DatabaseError> {
        self.db.close()
    }
}

/// NULL columns read back as NaN.
fn nullable(row: &Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(idx)?.unwrap_or(f64::NAN))
}

fn stats_from_row(row: &Row<'_>) -> rusqlite::Result<GenerationStats> {
    Ok(GenerationStats {
        generation: row.get::<_, i64>(0)? as usize,
        size: row.get::<_, i64>(1)? as usize,
        mean_fitness: nullable(row, 2)?,
        relative_load: nullable(row, 3)?,
        segregating_load: nullable(row, 4)?,
        fixed_load: nullable(row, 5)?,
        fixed_deleterious: row.get::<_, i64>(6)? as usize,
        fixed_neutral: row.get::<_, i64>(7)? as usize,
        mean_deleterious_per_diploid: nullable(row, 8)?,
        mean_neutral_per_diploid: nullable(row, 9)?,
        cumulative_deleterious_frequency: nullable(row, 10)?,
        cumulative_neutral_frequency: nullable(row, 11)?,
        neutral_tajimas_d: nullable(row, 12)?,
        total_tajimas_d: nullable(row, 13)?,
        neutral_pi: nullable(row, 14)?,
        total_pi: nullable(row, 15)?,
        neutral_hprime: nullable(row, 16)?,
        total_hprime: nullable(row, 17)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{DominanceModel, ReproductionMode, StageConfig, Trajectory};
    use crate::storage::{AsyncRecorder, StageRecord};
    use tempfile::TempDir;

    fn scenario() -> ScenarioConfig {
        ScenarioConfig {
            name: "query-test".into(),
            replicates: 2,
            seed: 11,
            theta: 10.0,
            rho: 10.0,
            reference_size: 20,
            sample_size: 5,
            dominance_models: vec![DominanceModel::new("additive", 1.0)],
            genetic_value: Default::default(),
            prune_selected: true,
            burnin: StageConfig::new(
                "burnin",
                Trajectory::Constant { size: 20, span: 4 },
                ReproductionMode::Clonal,
                1,
            ),
        }
    }

    fn record(replicate: usize, fitness: f64) -> StageRecord {
        StageRecord {
            stage: "burnin".into(),
            model: "additive".into(),
            replicate,
            rows: (1..=4)
                .map(|g| GenerationStats {
                    generation: g,
                    size: 20,
                    mean_fitness: fitness,
                    fixed_deleterious: g,
                    total_pi: if g == 1 { f64::NAN } else { 0.5 },
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_query_flow() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("query.sqlite");
        let config = scenario();

        let recorder = AsyncRecorder::new(&path, &config, 8).expect("Rec created");
        recorder.record(record(0, 0.8)).await.unwrap();
        recorder.record(record(1, 0.6)).await.unwrap();
        recorder.close().await.expect("Close");

        let q = QueryBuilder::new(&path).expect("Query created");

        let meta = q.get_metadata().expect("Meta");
        assert_eq!(meta.get("scenario").map(|s| s.as_str()), Some("query-test"));
        assert_eq!(q.get_metadata_value("seed").unwrap().as_deref(), Some("11"));
        assert_eq!(q.get_metadata_value("missing").unwrap(), None);

        let series = q.list_series().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].replicate, 1);
        assert_eq!(series[1].rows, 4);

        let rows = q.get_series("burnin", "additive", 1).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].generation, 4);
        assert_eq!(rows[3].fixed_deleterious, 4);
        assert!(rows[0].total_pi.is_nan());
        assert_eq!(rows[1].total_pi, 0.5);
        assert!(q.get_series("burnin", "recessive", 0).unwrap().is_empty());

        let history = q.get_fitness_history("burnin", "additive").unwrap();
        assert_eq!(history.len(), 4);
        assert!((history[0].1.mean - 0.7).abs() < 1e-12);
        assert_eq!(history[0].1.min, 0.6);
        assert!((history[0].1.std - 0.1).abs() < 1e-9);

        assert_eq!(q.get_config().unwrap(), Some(config));
        q.close().unwrap();
    }

    #[test]
    fn test_missing_config() {
        let dir = TempDir::new().unwrap();
        let q = QueryBuilder::new(dir.path().join("empty.sqlite")).unwrap();
        assert_eq!(q.get_config().unwrap(), None);
        assert!(q.list_series().unwrap().is_empty());
    }
}
