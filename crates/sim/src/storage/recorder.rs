//! Asynchronous recorder that writes stage records in the background.

use crate::errors::DatabaseError;
use crate::simulation::ScenarioConfig;
use crate::storage::database::Database;
use crate::storage::types::StageRecord;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Message sent from the simulation to the background writer.
#[derive(Debug)]
enum RecorderMessage {
    /// Write every row of one stage.
    Record(StageRecord),
    /// Flush and shutdown the recorder.
    Shutdown,
}

/// Statistics about the async recorder's performance.
#[derive(Debug, Clone, Default)]
pub struct RecorderStats {
    /// Stage records written.
    pub records_written: usize,
    /// Rows written to the stats table.
    pub rows_written: usize,
    /// Average write time per record in milliseconds.
    pub avg_write_ms: f64,
}

/// Asynchronous recorder writing [`StageRecord`]s to a SQLite database.
pub struct AsyncRecorder {
    tx: mpsc::Sender<RecorderMessage>,
    handle: Option<JoinHandle<Result<RecorderStats, DatabaseError>>>,
    capacity: usize,
    pending: Arc<AtomicUsize>,
}

impl AsyncRecorder {
    /// Default number of records buffered before senders wait.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create the database, write the scenario metadata and start the
    /// background writer. Must be called within a tokio runtime.
    pub fn new(
        db_path: impl AsRef<Path>,
        scenario: &ScenarioConfig,
        capacity: usize,
    ) -> Result<Self, DatabaseError> {
        let db_path = db_path.as_ref().to_path_buf();
        let capacity = capacity.max(1);

        {
            let mut db = Database::open(&db_path)?;
            let scenario_json = serde_json::to_string(scenario)
                .map_err(|e| DatabaseError::Initialization(e.to_string()))?;
            let meta_pairs = [
                ("scenario", scenario.name.clone()),
                ("replicates", scenario.replicates.to_string()),
                ("seed", scenario.seed.to_string()),
                ("full_config_json", scenario_json),
                ("created_at", unix_seconds().to_string()),
                ("version", env!("CARGO_PKG_VERSION").to_string()),
            ];

            let tx = db.transaction()?;
            {
                let mut stmt = tx
                    .prepare("INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)")
                    .map_err(|e| DatabaseError::Insert(e.to_string()))?;
                for (k, v) in meta_pairs {
                    stmt.execute(params![k, v])
                        .map_err(|e| DatabaseError::Insert(e.to_string()))?;
                }
            }
            tx.commit()
                .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
            db.close()?;
        }

        let (tx, rx) = mpsc::channel(capacity);
        let pending = Arc::new(AtomicUsize::new(0));
        let pending_task = pending.clone();
        let handle =
            tokio::spawn(async move { background_recorder_task(db_path, rx, pending_task).await });

        Ok(Self {
            tx,
            handle: Some(handle),
            capacity,
            pending,
        })
    }

    /// Records queued but not yet written.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue a record for writing.
    pub async fn record(&self, record: StageRecord) -> Result<(), DatabaseError> {
        self.pending.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(RecorderMessage::Record(record)).await.is_err() {
            self.pending.fetch_sub(1, Ordering::Relaxed);
            return Err(DatabaseError::Insert("Recorder task died".to_string()));
        }
        Ok(())
    }

    /// Queue a record from a thread outside the async runtime, such as a
    /// rayon worker. Blocks while the buffer is full.
    pub fn record_blocking(&self, record: StageRecord) -> Result<(), DatabaseError> {
        self.pending.fetch_add(1, Ordering::Relaxed);
        if self
            .tx
            .blocking_send(RecorderMessage::Record(record))
            .is_err()
        {
            self.pending.fetch_sub(1, Ordering::Relaxed);
            return Err(DatabaseError::Insert("Recorder task died".to_string()));
        }
        Ok(())
    }

    /// Flush outstanding records and close the database.
    pub async fn close(mut self) -> Result<RecorderStats, DatabaseError> {
        if let Err(e) = self.tx.send(RecorderMessage::Shutdown).await {
            tracing::warn!("failed to send shutdown message: {e}");
        }
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .map_err(|e| DatabaseError::Close(format!("Background task panicked: {e}")))?
        } else {
            Ok(RecorderStats::default())
        }
    }
}

async fn background_recorder_task(
    db_path: PathBuf,
    mut rx: mpsc::Receiver<RecorderMessage>,
    pending: Arc<AtomicUsize>,
) -> Result<RecorderStats, DatabaseError> {
    let mut db = Database::open(&db_path)?;
    let mut stats = RecorderStats::default();
    let mut total_write_time = Duration::ZERO;

    while let Some(msg) = rx.recv().await {
        match msg {
            RecorderMessage::Record(record) => {
                pending.fetch_sub(1, Ordering::Relaxed);
                let write_start = Instant::now();
                write_stage_record(db.connection_mut(), &record)?;
                total_write_time += write_start.elapsed();

                stats.records_written += 1;
                stats.rows_written += record.rows.len();
                tracing::trace!(
                    stage = %record.stage,
                    model = %record.model,
                    replicate = record.replicate,
                    rows = record.rows.len(),
                    "stage record written"
                );
            }
            RecorderMessage::Shutdown => break,
        }
    }

    if stats.records_written > 0 {
        stats.avg_write_ms =
            total_write_time.as_secs_f64() * 1000.0 / stats.records_written as f64;
    }

    db.close()?;
    Ok(stats)
}

/// Write every row of `record` in one transaction, replacing earlier rows
/// of the same series and generation.
pub fn write_stage_record(conn: &mut Connection, record: &StageRecord) -> Result<(), DatabaseError> {
    let tx = conn
        .transaction()
        .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
    {
        let mut stmt = tx
            .prepare_cached(
                "INSERT OR REPLACE INTO stats (
                    replicate, model, stage, generation, size,
                    mean_fitness, relative_load, segregating_load, fixed_load,
                    fixed_deleterious, fixed_neutral,
                    mean_deleterious_per_diploid, mean_neutral_per_diploid,
                    cumulative_deleterious_frequency, cumulative_neutral_frequency,
                    neutral_tajimas_d, total_tajimas_d, neutral_pi, total_pi,
                    neutral_hprime, total_hprime)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                        ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
            )
            .map_err(|e| DatabaseError::Insert(e.to_string()))?;

        for row in &record.rows {
            stmt.execute(params![
                record.replicate as i64,
                record.model,
                record.stage,
                row.generation as i64,
                row.size as i64,
                finite(row.mean_fitness),
                finite(row.relative_load),
                finite(row.segregating_load),
                finite(row.fixed_load),
                row.fixed_deleterious as i64,
                row.fixed_neutral as i64,
                finite(row.mean_deleterious_per_diploid),
                finite(row.mean_neutral_per_diploid),
                finite(row.cumulative_deleterious_frequency),
                finite(row.cumulative_neutral_frequency),
                finite(row.neutral_tajimas_d),
                finite(row.total_tajimas_d),
                finite(row.neutral_pi),
                finite(row.total_pi),
                finite(row.neutral_hprime),
                finite(row.total_hprime),
            ])
            .map_err(|e| DatabaseError::Insert(e.to_string()))?;
        }
    }
    tx.commit()
        .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
    Ok(())
}

/// NaN and infinities are stored as NULL.
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{DominanceModel, ReproductionMode, StageConfig, Trajectory};
    use crate::storage::GenerationStats;
    use tempfile::TempDir;

    fn scenario() -> ScenarioConfig {
        ScenarioConfig {
            name: "recorder-test".into(),
            replicates: 1,
            seed: 3,
            theta: 10.0,
            rho: 10.0,
            reference_size: 20,
            sample_size: 5,
            dominance_models: vec![DominanceModel::new("additive", 1.0)],
            genetic_value: Default::default(),
            prune_selected: false,
            burnin: StageConfig::new(
                "burnin",
                Trajectory::Constant { size: 20, span: 10 },
                ReproductionMode::Outcrossing,
                5,
            ),
        }
    }

    fn record(stage: &str, rows: usize) -> StageRecord {
        StageRecord {
            stage: stage.into(),
            model: "additive".into(),
            replicate: 0,
            rows: (0..rows)
                .map(|g| GenerationStats {
                    generation: g + 1,
                    size: 20,
                    mean_fitness: 0.9,
                    neutral_tajimas_d: f64::NAN,
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_recorder_flow() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recorder.sqlite");

        let recorder = AsyncRecorder::new(&path, &scenario(), 4).expect("Failed to create recorder");
        recorder.record(record("burnin", 3)).await.unwrap();
        recorder.record(record("decline", 2)).await.unwrap();

        let stats = recorder.close().await.expect("Failed to close");
        assert_eq!(stats.records_written, 2);
        assert_eq!(stats.rows_written, 5);

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM stats", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 5);

        let null_d: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM stats WHERE neutral_tajimas_d IS NULL",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(null_d, 5);

        let name: String = conn
            .query_row("SELECT value FROM metadata WHERE key = 'scenario'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(name, "recorder-test");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_record_blocking_from_worker_thread() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blocking.sqlite");
        let recorder = Arc::new(AsyncRecorder::new(&path, &scenario(), 1).unwrap());

        let worker = {
            let recorder = recorder.clone();
            std::thread::spawn(move || {
                for stage in ["a", "b", "c"] {
                    recorder.record_blocking(record(stage, 1)).unwrap();
                }
            })
        };
        tokio::task::spawn_blocking(move || worker.join().unwrap())
            .await
            .unwrap();

        let recorder = Arc::try_unwrap(recorder).ok().unwrap();
        let stats = recorder.close().await.unwrap();
        assert_eq!(stats.records_written, 3);
    }
}
