//! Score Store
//!
//! Process-wide owner of the best-time table and its backing file.
//!
//! Every submission runs check, mutate and persist under one write lock,
//! so two concurrent submissions for the same player can never both act
//! on a stale stored time.

pub mod file;
pub mod record;
pub mod table;

pub use file::ScoreFile;
pub use record::{Level, ScoreRecord};
pub use table::{ScoreTable, SubmitError, SubmitOutcome};

use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Score store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Submission rejected by the best-time rule.
    #[error(transparent)]
    Rejected(#[from] SubmitError),

    /// Score file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Score file is not a valid record array.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Table could not be serialized.
    #[error("failed to encode score table: {0}")]
    Encode(serde_json::Error),

    /// Table could not be written. The in-memory change is kept.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl StoreError {
    /// True if the in-memory table was updated but not saved.
    pub fn is_persistence(&self) -> bool {
        matches!(self, StoreError::Encode(_) | StoreError::Write { .. })
    }
}

/// Shared leaderboard state, constructed once at startup.
#[derive(Debug)]
pub struct ScoreStore {
    table: RwLock<ScoreTable>,
    file: ScoreFile,
}

impl ScoreStore {
    /// Load the table from `path`. A missing file starts an empty table.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let file = ScoreFile::new(path);
        let table = match file.load().await? {
            Some(records) => ScoreTable::from_records(records),
            None => {
                warn!("Score file {} not found, starting empty", file.path().display());
                ScoreTable::new()
            }
        };

        info!("Score store opened: {} records from {}", table.len(), file.path().display());

        Ok(Self {
            table: RwLock::new(table),
            file,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Records for `level`, fastest first.
    pub async fn list_by_level(&self, level: Level) -> Vec<ScoreRecord> {
        self.table.read().await.list_by_level(level)
    }

    /// Record a time if it is the player's first or strictly best on the level.
    ///
    /// On success the whole table is written to disk before returning. If
    /// that write fails the new time stays in memory and a persistence
    /// error is returned.
    pub async fn submit(&self, record: ScoreRecord) -> Result<SubmitOutcome, StoreError> {
        let mut table = self.table.write().await;
        let outcome = table.submit(record)?;

        if let Err(e) = self.file.save(table.records()).await {
            error!("Score table changed but not saved: {}", e);
            return Err(e);
        }

        Ok(outcome)
    }

    /// Stored best time for a player on a level.
    pub async fn best_time(&self, level: Level, player_name: &str) -> Option<f64> {
        self.table.read().await.best_time(level, player_name)
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.table.read().await.len()
    }

    /// True if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.is_empty()
    }
}
