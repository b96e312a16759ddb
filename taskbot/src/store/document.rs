// File: taskbot/src/store/document.rs
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::StoreError;

/// A JSON array of records backed by a single file.
///
/// Every access takes the document lock, so concurrent read-modify-write
/// cycles within the process never interleave. Writes go to a temp file and
/// are renamed into place.
pub struct JsonDocument<R> {
    path: PathBuf,
    lock: Mutex<()>,
    _records: PhantomData<fn() -> R>,
}

impl<R> JsonDocument<R>
where
    R: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<Vec<R>, StoreError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Loads the records, applies `change`, and writes the result back
    pub async fn modify<T>(&self, change: impl FnOnce(&mut Vec<R>) -> T) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let outcome = change(&mut records);
        self.save(&records).await?;
        Ok(outcome)
    }

    async fn load(&self) -> Result<Vec<R>, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    async fn save(&self, records: &[R]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(records).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await.map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        Ok(())
    }

    fn io_error(&self, e: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}
