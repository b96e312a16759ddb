// File: taskbot/src/services/task_service.rs
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use futures::stream::{self, Stream, TryStreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::constants::{labels, todoist};
use crate::review::ReviewPriority;
use crate::todoist::{DuePayload, NewTask, Task, TaskTracker, TaskUpdate};

/// Where a generated task should land
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDestination {
    /// The tracker's default project
    Inbox,
    /// A named project, created on first use
    Project(String),
}

/// Open tasks due today and overdue ones, highest priority first
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskDigest {
    pub today: Vec<Task>,
    pub overdue: Vec<Task>,
}

impl TaskDigest {
    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.overdue.is_empty()
    }
}

enum PageCursor {
    Start,
    Next(String),
    Done,
}

/// Higher-level task operations on top of a [`TaskTracker`]
pub struct TaskService {
    tracker: Arc<dyn TaskTracker>,
    timezone: Tz,
    project_cache: Mutex<HashMap<String, String>>,
}

impl TaskService {
    pub fn new(tracker: Arc<dyn TaskTracker>, timezone: Tz) -> Self {
        Self {
            tracker,
            timezone,
            project_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Resolves a project name to its id, creating the project if needed.
    /// Lookups are cached for the life of the process.
    pub async fn project_id(&self, name: &str) -> Result<String> {
        let mut cache = self.project_cache.lock().await;
        if let Some(id) = cache.get(name) {
            return Ok(id.clone());
        }

        let projects = self
            .tracker
            .list_projects()
            .await
            .context("Failed to list projects")?;

        let id = match projects.into_iter().find(|p| p.name == name) {
            Some(project) => project.id,
            None => {
                let project = self
                    .tracker
                    .create_project(name)
                    .await
                    .with_context(|| format!("Failed to create project '{}'", name))?;
                info!("Created project '{}' ({})", name, project.id);
                project.id
            }
        };

        cache.insert(name.to_string(), id.clone());
        Ok(id)
    }

    async fn resolve(&self, destination: &TaskDestination) -> Result<Option<String>> {
        match destination {
            TaskDestination::Inbox => Ok(None),
            TaskDestination::Project(name) => self.project_id(name).await.map(Some),
        }
    }

    pub async fn create_review_task(
        &self,
        content: &str,
        due: NaiveDate,
        priority: ReviewPriority,
        project: &str,
    ) -> Result<Task> {
        let project_id = self.project_id(project).await?;
        let task = NewTask {
            content: content.to_string(),
            description: None,
            project_id: Some(project_id),
            due: Some(DuePayload::date(due)),
            priority: Some(priority.todoist_value()),
            labels: vec![labels::REVIEW.to_string()],
        };

        self.tracker.create_task(&task).await
    }

    pub async fn create_classroom_task(
        &self,
        content: &str,
        description: &str,
        due: DuePayload,
        project: &str,
    ) -> Result<Task> {
        let project_id = self.project_id(project).await?;
        let task = NewTask {
            content: content.to_string(),
            description: Some(description.to_string()),
            project_id: Some(project_id),
            due: Some(due),
            priority: None,
            labels: vec![labels::CLASSROOM.to_string()],
        };

        self.tracker.create_task(&task).await
    }

    pub async fn create_reminder_task(
        &self,
        content: &str,
        due: NaiveDate,
        destination: &TaskDestination,
    ) -> Result<Task> {
        let task = NewTask {
            content: content.to_string(),
            description: None,
            project_id: self.resolve(destination).await?,
            due: Some(DuePayload::date(due)),
            priority: None,
            labels: vec![labels::REMINDER.to_string()],
        };

        self.tracker.create_task(&task).await
    }

    pub async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<()> {
        self.tracker.update_task(task_id, update).await
    }

    pub async fn complete_task(&self, task_id: &str) -> Result<()> {
        self.tracker
            .close_task(task_id)
            .await
            .with_context(|| format!("Failed to close task {}", task_id))
    }

    /// Lazily pages through every open task, pausing between requests
    pub fn task_pages(&self) -> impl Stream<Item = Result<Vec<Task>>> + '_ {
        stream::try_unfold(PageCursor::Start, move |state| async move {
            let cursor = match state {
                PageCursor::Done => return Ok::<_, anyhow::Error>(None),
                PageCursor::Start => None,
                PageCursor::Next(cursor) => {
                    sleep(todoist::PAGE_DELAY).await;
                    Some(cursor)
                }
            };

            let page = self
                .tracker
                .list_tasks(todoist::PAGE_LIMIT, cursor.as_deref())
                .await?;
            let next = match page.next_cursor {
                Some(cursor) if !cursor.is_empty() => PageCursor::Next(cursor),
                _ => PageCursor::Done,
            };

            Ok::<_, anyhow::Error>(Some((page.items, next)))
        })
    }

    pub async fn all_tasks(&self) -> Result<Vec<Task>> {
        let pages = self.task_pages();
        futures::pin_mut!(pages);

        let mut tasks = Vec::new();
        while let Some(page) = pages.try_next().await? {
            tasks.extend(page);
        }
        debug!("Fetched {} open tasks", tasks.len());
        Ok(tasks)
    }

    /// Splits open tasks into due-today and overdue, ignoring anything due
    /// more than the lookback window ago
    pub async fn digest(&self, today: NaiveDate) -> Result<TaskDigest> {
        let tasks = self.all_tasks().await?;
        Ok(build_digest(tasks, today, self.timezone))
    }
}

pub fn build_digest(tasks: Vec<Task>, today: NaiveDate, tz: Tz) -> TaskDigest {
    let cutoff = today - Duration::days(todoist::DIGEST_LOOKBACK_DAYS);
    let mut digest = TaskDigest::default();

    for task in tasks.into_iter().filter(|t| !t.is_completed) {
        let Some(due) = task.due.as_ref().and_then(|d| d.local_date(tz)) else {
            continue;
        };
        if due == today {
            digest.today.push(task);
        } else if due < today && due >= cutoff {
            digest.overdue.push(task);
        }
    }

    digest.today.sort_by(|a, b| b.priority.cmp(&a.priority));
    digest.overdue.sort_by(|a, b| b.priority.cmp(&a.priority));
    digest
}
