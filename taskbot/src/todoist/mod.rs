//! Task tracker capability
//!
//! Everything that writes tasks goes through [`TaskTracker`], so services can
//! be exercised against an in-memory tracker in tests. [`TodoistClient`] is the
//! production implementation.

pub mod client;

pub use client::TodoistClient;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due: Option<TaskDue>,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default, alias = "checked")]
    pub is_completed: bool,
}

fn default_priority() -> u8 {
    1
}

/// Due information as returned by the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDue {
    pub date: String,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub string: Option<String>,
}

impl TaskDue {
    /// Calendar date of the due in `tz`.
    ///
    /// Accepts plain dates, floating datetimes and RFC 3339 instants. The
    /// latter are converted into `tz` before taking the date.
    pub fn local_date(&self, tz: Tz) -> Option<NaiveDate> {
        let raw = self.datetime.as_deref().unwrap_or(&self.date);

        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Some(instant.with_timezone(&tz).date_naive());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|dt| dt.date())
            .ok()
    }
}

/// Due value sent when creating or updating a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DuePayload {
    Date {
        due_date: String,
    },
    DateTime {
        due_datetime: String,
        due_timezone: String,
    },
}

impl DuePayload {
    pub fn date(date: NaiveDate) -> Self {
        DuePayload::Date {
            due_date: date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub due: Option<DuePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub due: Option<DuePayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// One page of open tasks plus the cursor for the next one
#[derive(Debug, Clone, Default)]
pub struct TaskPage {
    pub items: Vec<Task>,
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait TaskTracker: Send + Sync {
    async fn list_tasks(&self, limit: u32, cursor: Option<&str>) -> Result<TaskPage>;

    async fn create_task(&self, task: &NewTask) -> Result<Task>;

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<()>;

    async fn close_task(&self, task_id: &str) -> Result<()>;

    async fn list_projects(&self) -> Result<Vec<Project>>;

    async fn create_project(&self, name: &str) -> Result<Project>;
}
