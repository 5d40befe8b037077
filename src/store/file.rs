//! Score File
//!
//! Whole-table JSON persistence. The file holds a single array of
//! `{"level", "playerName", "time"}` objects, read once at startup and
//! rewritten in full after every accepted submission.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::store::record::ScoreRecord;
use crate::store::StoreError;

/// Handle to the persisted score table.
#[derive(Debug, Clone)]
pub struct ScoreFile {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl ScoreFile {
    /// Create a handle for `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut tmp_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("scoreboard.json"));
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);
        Self { path, tmp_path }
    }

    /// Path of the persisted table.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record. `Ok(None)` if the file does not exist yet.
    pub async fn load(&self) -> Result<Option<Vec<ScoreRecord>>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read { path: self.path.clone(), source });
            }
        };

        let records: Vec<ScoreRecord> = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Parse { path: self.path.clone(), source })?;

        debug!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(Some(records))
    }

    /// Overwrite the file with `records`.
    ///
    /// Writes a sibling temp file, syncs it, then renames it over the target.
    pub async fn save(&self, records: &[ScoreRecord]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(records).map_err(StoreError::Encode)?;

        if let Err(source) = self.replace_with(&bytes).await {
            let _ = fs::remove_file(&self.tmp_path).await;
            return Err(StoreError::Write { path: self.path.clone(), source });
        }

        debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    async fn replace_with(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(&self.tmp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&self.tmp_path, &self.path).await
    }
}
