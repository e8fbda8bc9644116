//! Storage module for persisting simulation data.
//!
//! Summary statistics of every stage are written to SQLite together with
//! the scenario that produced them, so runs can be listed, exported and
//! re-run later.

mod database;
mod query;
mod recorder;
pub mod types;

pub use database::{Database, DatabaseStats};
pub use query::{QueryBuilder, SeriesInfo};
pub use recorder::{write_stage_record, AsyncRecorder, RecorderStats};
pub use types::{FitnessStats, GenerationStats, RecordingStrategy, StageRecord};
