//! Low-level database operations and schema management.

pub use crate::errors::DatabaseError;
use rusqlite::{Connection, Transaction};
use std::path::Path;

/// Database connection wrapper with schema management.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    db_path: String,
}

impl Database {
    /// Open (or create) a database at the specified path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let conn =
            Connection::open(&path_str).map_err(|e| DatabaseError::Connection(e.to_string()))?;

        // Performance pragmas for faster bulk inserts
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA journal_mode = WAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA cache_size = -64000;",
        )
        .map_err(|e| DatabaseError::Initialization(e.to_string()))?;

        let mut db = Self {
            conn,
            db_path: path_str,
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize database schema.
    fn initialize_schema(&mut self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "-- Metadata table (scenario, creation time)
                CREATE TABLE IF NOT EXISTS metadata (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                -- One row per recorded generation of a stage.
                -- Undefined statistics are stored as NULL.
                CREATE TABLE IF NOT EXISTS stats (
                    replicate INTEGER NOT NULL,
                    model TEXT NOT NULL,
                    stage TEXT NOT NULL,
                    generation INTEGER NOT NULL,
                    size INTEGER NOT NULL,
                    mean_fitness REAL,
                    relative_load REAL,
                    segregating_load REAL,
                    fixed_load REAL,
                    fixed_deleterious INTEGER NOT NULL,
                    fixed_neutral INTEGER NOT NULL,
                    mean_deleterious_per_diploid REAL,
                    mean_neutral_per_diploid REAL,
                    cumulative_deleterious_frequency REAL,
                    cumulative_neutral_frequency REAL,
                    neutral_tajimas_d REAL,
                    total_tajimas_d REAL,
                    neutral_pi REAL,
                    total_pi REAL,
                    neutral_hprime REAL,
                    total_hprime REAL,
                    PRIMARY KEY (replicate, model, stage, generation)
                );

                CREATE INDEX IF NOT EXISTS idx_stats_series ON stats(stage, model);",
            )
            .map_err(|e| DatabaseError::Initialization(e.to_string()))?;

        Ok(())
    }

    /// Begin a transaction for batched operations.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, DatabaseError> {
        self.conn
            .transaction()
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }

    /// Get reference to underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Get mutable reference to underlying connection.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Get database path.
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Close the database and clean up WAL files.
    pub fn close(self) -> Result<(), DatabaseError> {
        // Checkpoint and truncate WAL
        if let Err(e) = self.conn.execute_batch(
            "PRAGMA wal_checkpoint(TRUNCATE);
             PRAGMA journal_mode = DELETE;",
        ) {
            tracing::warn!("failed to checkpoint/truncate WAL: {e}");
        }

        self.conn
            .close()
            .map_err(|(_conn, e)| DatabaseError::Close(e.to_string()))?;

        // Remove WAL/SHM files
        for suffix in &["-wal", "-shm"] {
            let fname = format!("{}{}", self.db_path, suffix);
            if let Err(e) = std::fs::remove_file(&fname) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("failed to remove {fname}: {e}");
                }
            }
        }

        Ok(())
    }

    /// Vacuum the database to reclaim space.
    pub fn vacuum(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch("VACUUM;")
            .map_err(|e| DatabaseError::Vacuum(e.to_string()))
    }

    /// Get database statistics.
    pub fn stats(&self) -> Result<DatabaseStats, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut tables = Vec::new();
        for row in rows {
            tables.push(row.map_err(|e| DatabaseError::Query(e.to_string()))?);
        }

        let (rows, series): (i64, i64) = self
            .conn
            .query_row(
                "SELECT COUNT(*),
                        (SELECT COUNT(*) FROM (SELECT DISTINCT replicate, model, stage FROM stats))
                 FROM stats",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(DatabaseStats {
            stat_rows: rows as usize,
            series: series as usize,
            tables,
        })
    }
}

/// Database statistics.
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub stat_rows: usize,
    pub series: usize,
    pub tables: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_database_creation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("create.sqlite");

        let db = Database::open(&path).expect("Failed to create database");
        assert_eq!(db.path(), path.to_string_lossy());

        db.close().expect("Failed to close database");
        assert!(path.exists());
        assert!(!dir.path().join("create.sqlite-wal").exists());
    }

    #[test]
    fn test_schema_initialization() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("schema.sqlite")).unwrap();
        let stats = db.stats().expect("Failed to get stats");

        assert!(stats.tables.contains(&"metadata".to_string()));
        assert!(stats.tables.contains(&"stats".to_string()));
        assert_eq!(stats.stat_rows, 0);
        assert_eq!(stats.series, 0);

        db.close().unwrap();
    }

    #[test]
    fn test_reopen_keeps_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reopen.sqlite");
        Database::open(&path).unwrap().close().unwrap();
        let db = Database::open(&path).unwrap();
        assert!(db.stats().unwrap().tables.contains(&"stats".to_string()));
        db.close().unwrap();
    }

    #[test]
    fn test_transaction() {
        let dir = TempDir::new().unwrap();
        let mut db = Database::open(dir.path().join("tx.sqlite")).unwrap();
        let tx = db.transaction().expect("Failed to begin transaction");
        tx.execute(
            "INSERT INTO metadata (key, value) VALUES ('k', 'v')",
            [],
        )
        .unwrap();
        tx.commit().expect("Failed to commit transaction");
        let value: String = db
            .connection()
            .query_row("SELECT value FROM metadata WHERE key = 'k'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(value, "v");
        db.vacuum().unwrap();
        db.close().unwrap();
    }
}
