// File: taskbot/src/review/series.rs
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::intervals::{compute_due_date, resolve_intervals, ReviewMode, ReviewPriority};
use crate::services::task_service::TaskService;

/// One review task that was created successfully
#[derive(Debug, Clone, Serialize)]
pub struct CreatedReview {
    pub occurrence: usize,
    pub day_offset: u32,
    pub due_date: NaiveDate,
    pub priority: ReviewPriority,
    pub task_id: String,
    pub content: String,
}

/// Turns one subject into a spaced-repetition series of tracker tasks
pub struct ReviewSeriesBuilder {
    tasks: Arc<TaskService>,
    project: String,
}

impl ReviewSeriesBuilder {
    pub fn new(tasks: Arc<TaskService>, project: impl Into<String>) -> Self {
        Self {
            tasks,
            project: project.into(),
        }
    }

    /// Creates every occurrence for `mode`, starting from `today`.
    ///
    /// A failed occurrence is logged and skipped; the rest are still created.
    /// The result holds only the occurrences that made it to the tracker.
    pub async fn build_series(
        &self,
        base_content: &str,
        mode: ReviewMode,
        today: NaiveDate,
    ) -> Vec<CreatedReview> {
        let steps = resolve_intervals(mode);
        let mut created = Vec::with_capacity(steps.len());

        for step in steps {
            let due_date = compute_due_date(today, step.day_offset);
            let content = review_content(base_content, step.occurrence);

            match self
                .tasks
                .create_review_task(&content, due_date, step.priority, &self.project)
                .await
            {
                Ok(task) => created.push(CreatedReview {
                    occurrence: step.occurrence,
                    day_offset: step.day_offset,
                    due_date,
                    priority: step.priority,
                    task_id: task.id,
                    content,
                }),
                Err(e) => warn!(
                    "Failed to create review {} of '{}' due {}: {:#}",
                    step.occurrence, base_content, due_date, e
                ),
            }
        }

        info!(
            "Created {}/{} {} reviews for '{}'",
            created.len(),
            mode.occurrences(),
            mode,
            base_content
        );
        created
    }
}

pub fn review_content(base: &str, occurrence: usize) -> String {
    format!("{} ({}回目の復習)", base, occurrence)
}
