//! JSON file persistence.
//!
//! Each entity lives in its own document under the data directory:
//! - `reminders.json` - weekly reminders
//! - `schedules.json` - class schedules
//! - `classroom_sync.json` - coursework to task links
//!
//! The module is organized like this:
//! - `document` - generic locked JSON array document
//! - `records` - all persisted record types
//! - `reminders`, `schedules`, `coursework` - per-entity operations on [`Store`]

mod coursework;
mod document;
mod records;
mod reminders;
mod schedules;

pub use document::JsonDocument;
pub use records::*;
pub use reminders::NewReminder;
pub use schedules::NewClassSchedule;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

pub struct Store {
    data_dir: PathBuf,
    reminders: JsonDocument<Reminder>,
    schedules: JsonDocument<ClassSchedule>,
    coursework: JsonDocument<SyncedCourseworkRecord>,
}

impl Store {
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        info!("Using data directory {}", data_dir.display());

        Ok(Self {
            reminders: JsonDocument::new(data_dir.join("reminders.json")),
            schedules: JsonDocument::new(data_dir.join("schedules.json")),
            coursework: JsonDocument::new(data_dir.join("classroom_sync.json")),
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Next id for a document: one past the largest id present
fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().map_or(1, |max| max + 1)
}
