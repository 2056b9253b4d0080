use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::MomentographError;
use crate::media::MediaStore;
use crate::records::CaptureRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("record store (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no record found for filename {0}")]
    NotFound(String),
}

/// Durable local table of capture records: one JSON array in a single file.
///
/// Every mutation is read-modify-write on the full list. The store assumes a
/// single writer per process; the internal mutex serializes concurrent
/// `append`/`delete` calls so their load/save halves never interleave.
pub struct RecordStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Appends a record, preserving all existing records.
    pub async fn append(&self, record: CaptureRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        records.push(record);
        self.save(&records).await?;
        debug!(total = records.len(), "record appended");
        Ok(())
    }

    /// All records, in insertion order.
    pub async fn list_all(&self) -> Result<Vec<CaptureRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// The first record whose metadata filename matches `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no record matches.
    pub async fn find_by_filename(&self, name: &str) -> Result<CaptureRecord, StoreError> {
        let _guard = self.lock.lock().await;
        let records = self.load().await?;
        records
            .into_iter()
            .find(|record| record.metadata.filename == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// Removes the first record matching `name` and requests deletion of its
    /// underlying asset from the media library.
    ///
    /// The asset is deleted before the list is rewritten, so a failed
    /// deletion leaves the store unchanged.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no record matches; the media library's
    /// error when the asset cannot be deleted.
    pub async fn delete(
        &self,
        name: &str,
        media: &dyn MediaStore,
    ) -> Result<CaptureRecord, MomentographError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let index = records
            .iter()
            .position(|record| record.metadata.filename == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        media.delete_asset(&records[index].asset).await?;

        let removed = records.remove(index);
        self.save(&records).await?;
        info!(filename = name, remaining = records.len(), "record deleted");
        Ok(removed)
    }

    async fn load(&self) -> Result<Vec<CaptureRecord>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            // A store that was never written to reads as the empty list.
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, records: &[CaptureRecord]) -> Result<(), StoreError> {
        let serialized = serde_json::to_vec(records)?;
        tokio::fs::write(&self.path, serialized).await?;
        Ok(())
    }
}
