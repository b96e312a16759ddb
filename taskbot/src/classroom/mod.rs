//! Coursework provider capability
//!
//! The sync engine only needs three read operations, captured by
//! [`CourseworkProvider`]. [`GoogleClassroomClient`] implements them against
//! the Classroom REST API.

pub mod auth;
pub mod client;

pub use auth::{ClassroomCredentials, ServiceAccountKey, TokenSource};
pub use client::GoogleClassroomClient;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "state")]
    pub course_state: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Google omits zero-valued fields, so every component defaults to 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueTime {
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWork {
    pub id: String,
    #[serde(default)]
    pub course_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub due_date: Option<DueDate>,
    #[serde(default)]
    pub due_time: Option<DueTime>,
    #[serde(default)]
    pub alternate_link: Option<String>,
}

/// The caller's own submission for a coursework item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Submission states that count as done
const COMPLETED_STATES: [&str; 2] = ["TURNED_IN", "RETURNED"];

pub fn is_completed_state(state: Option<&str>) -> bool {
    state.is_some_and(|s| COMPLETED_STATES.contains(&s))
}

#[async_trait]
pub trait CourseworkProvider: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>>;

    async fn list_course_work(&self, course_id: &str) -> Result<Vec<CourseWork>>;

    /// `None` when the caller has no submission for the item
    async fn get_my_submission(
        &self,
        course_id: &str,
        course_work_id: &str,
    ) -> Result<Option<Submission>>;
}
