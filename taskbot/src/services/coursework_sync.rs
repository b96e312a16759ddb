// File: taskbot/src/services/coursework_sync.rs
//! Coursework reconciliation.
//!
//! Mirrors pending coursework from the provider into the task tracker and
//! keeps a local `courseId:courseWorkId -> task` link per item:
//!
//! | submission | local link | action                                  |
//! |------------|------------|-----------------------------------------|
//! | completed  | present    | close task, drop link (if auto-close)   |
//! | completed  | absent     | nothing                                 |
//! | pending    | absent     | create task, store link                 |
//! | pending    | present    | update task if due/content moved, else skip |
//!
//! Items that are unpublished, undated or due beyond the window are ignored.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::classroom::{is_completed_state, Course, CourseWork, CourseworkProvider};
use crate::config::ClassroomConfig;
use crate::constants::classroom::{DEFAULT_DUE_HOUR, DEFAULT_DUE_MINUTE};
use crate::services::task_service::TaskService;
use crate::store::{coursework_key, Store, SyncedCourseworkRecord};
use crate::todoist::{DuePayload, TaskUpdate};

const PUBLISHED: &str = "PUBLISHED";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub closed: usize,
    pub skipped: usize,
}

/// Normalized due information for one coursework item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueInfo {
    pub instant: DateTime<Tz>,
    pub has_time: bool,
}

impl DueInfo {
    /// `None` when the item has no due date or the date does not exist
    pub fn from_course_work(work: &CourseWork, tz: Tz) -> Option<Self> {
        let date = work.due_date?;
        let (hours, minutes) = match work.due_time {
            Some(time) => (time.hours, time.minutes),
            None => (DEFAULT_DUE_HOUR, DEFAULT_DUE_MINUTE),
        };

        let naive = NaiveDate::from_ymd_opt(date.year, date.month, date.day)?
            .and_hms_opt(hours, minutes, 0)?;
        let instant = local_instant(naive, tz)?;

        Some(Self {
            instant,
            has_time: work.due_time.is_some(),
        })
    }

    pub fn date_string(&self) -> String {
        self.instant.format("%Y-%m-%d").to_string()
    }

    pub fn datetime_string(&self) -> String {
        self.instant.format("%Y-%m-%dT%H:%M:00").to_string()
    }

    /// Canonical string compared between syncs to detect a moved due date
    pub fn due_key(&self) -> String {
        if self.has_time {
            self.datetime_string()
        } else {
            self.date_string()
        }
    }

    pub fn display(&self) -> String {
        self.instant.format("%Y-%m-%d %H:%M").to_string()
    }

    pub fn payload(&self, timezone: Tz) -> DuePayload {
        if self.has_time {
            DuePayload::DateTime {
                due_datetime: self.datetime_string(),
                due_timezone: timezone.name().to_string(),
            }
        } else {
            DuePayload::Date {
                due_date: self.date_string(),
            }
        }
    }
}

fn local_instant(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    let local = tz.from_local_datetime(&naive);
    local.earliest().or_else(|| local.latest())
}

/// Parses a stored due key back into an instant, treating date-only keys as
/// due at the default time
pub fn parse_due_key(due_key: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let naive = NaiveDateTime::parse_from_str(due_key, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(due_key, "%Y-%m-%d")
                .ok()?
                .and_hms_opt(DEFAULT_DUE_HOUR, DEFAULT_DUE_MINUTE, 0)
        })?;
    local_instant(naive, tz)
}

pub fn task_content(work: &CourseWork, course: &Course) -> String {
    format!("{} ({})", work.title, course.name)
}

pub fn task_description(work: &CourseWork, course: &Course, due: &DueInfo) -> String {
    [
        format!("クラス: {}", course.name),
        format!("期限: {}", due.display()),
        format!("URL: {}", work.alternate_link.as_deref().unwrap_or("なし")),
    ]
    .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemOutcome {
    Created,
    Updated,
    Closed,
    Skipped,
    Ignored,
}

/// Stored links grouped for display
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackedCoursework {
    pub overdue: Vec<SyncedCourseworkRecord>,
    pub upcoming: Vec<SyncedCourseworkRecord>,
    pub later: Vec<SyncedCourseworkRecord>,
}

pub struct CourseworkSync {
    provider: Arc<dyn CourseworkProvider>,
    tasks: Arc<TaskService>,
    store: Arc<Store>,
    settings: ClassroomConfig,
    timezone: Tz,
}

impl CourseworkSync {
    pub fn new(
        provider: Arc<dyn CourseworkProvider>,
        tasks: Arc<TaskService>,
        store: Arc<Store>,
        settings: ClassroomConfig,
        timezone: Tz,
    ) -> Self {
        Self {
            provider,
            tasks,
            store,
            settings,
            timezone,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Reconciles every in-window coursework item.
    ///
    /// Listing courses failing (including missing credentials) fails the
    /// whole sync. Anything after that is isolated to the course or item it
    /// concerns and only logged.
    #[instrument(skip(self))]
    pub async fn sync(&self, now: DateTime<Tz>) -> Result<SyncSummary> {
        let mut summary = SyncSummary::default();
        if !self.settings.enabled {
            debug!("Classroom sync disabled");
            return Ok(summary);
        }

        let limit = self.window_end(now)?;
        let courses = self.provider.list_courses().await?;
        let courses: Vec<Course> = if self.settings.course_ids.is_empty() {
            courses
        } else {
            courses
                .into_iter()
                .filter(|c| self.settings.course_ids.contains(&c.id))
                .collect()
        };

        for course in &courses {
            let work_items = match self.provider.list_course_work(&course.id).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("Failed to list coursework for '{}': {:#}", course.name, e);
                    continue;
                }
            };

            for work in &work_items {
                match self.reconcile(course, work, limit).await {
                    Ok(ItemOutcome::Created) => summary.created += 1,
                    Ok(ItemOutcome::Updated) => summary.updated += 1,
                    Ok(ItemOutcome::Closed) => summary.closed += 1,
                    Ok(ItemOutcome::Skipped) => summary.skipped += 1,
                    Ok(ItemOutcome::Ignored) => {}
                    Err(e) => warn!(
                        "Failed to sync coursework '{}' in '{}': {:#}",
                        work.title, course.name, e
                    ),
                }
            }
        }

        info!(
            "Classroom sync: {} created, {} updated, {} closed, {} skipped",
            summary.created, summary.updated, summary.closed, summary.skipped
        );
        Ok(summary)
    }

    async fn reconcile(
        &self,
        course: &Course,
        work: &CourseWork,
        limit: DateTime<Tz>,
    ) -> Result<ItemOutcome> {
        if work.state.as_deref() != Some(PUBLISHED) {
            return Ok(ItemOutcome::Ignored);
        }
        let Some(due) = DueInfo::from_course_work(work, self.timezone) else {
            return Ok(ItemOutcome::Ignored);
        };
        if due.instant > limit {
            return Ok(ItemOutcome::Ignored);
        }

        let submission = self.provider.get_my_submission(&course.id, &work.id).await?;
        let completed = is_completed_state(submission.as_ref().and_then(|s| s.state.as_deref()));

        let key = coursework_key(&course.id, &work.id);
        let existing = self.store.get_synced_coursework(&key).await?;

        if completed {
            return match existing {
                Some(record) if self.settings.auto_close_completed && !record.task_id.is_empty() => {
                    self.tasks.complete_task(&record.task_id).await?;
                    self.store.remove_synced_coursework(&key).await?;
                    info!("Closed task {} for submitted '{}'", record.task_id, work.title);
                    Ok(ItemOutcome::Closed)
                }
                _ => Ok(ItemOutcome::Ignored),
            };
        }

        let content = task_content(work, course);
        let description = task_description(work, course, &due);
        let payload = due.payload(self.timezone);
        let due_key = due.due_key();

        match existing {
            None => {
                let task = self
                    .tasks
                    .create_classroom_task(&content, &description, payload, &self.settings.project_name)
                    .await?;
                info!("Created task {} for '{}'", task.id, content);

                self.store
                    .upsert_synced_coursework(SyncedCourseworkRecord {
                        key,
                        task_id: task.id,
                        due_key,
                        content,
                        updated_at: Utc::now(),
                    })
                    .await?;
                Ok(ItemOutcome::Created)
            }
            Some(record) if record.due_key != due_key || record.content != content => {
                let update = TaskUpdate {
                    content: Some(content.clone()),
                    description: Some(description),
                    due: Some(payload),
                };
                self.tasks.update_task(&record.task_id, &update).await?;
                info!(
                    "Updated task {} for '{}' (due {} -> {})",
                    record.task_id, content, record.due_key, due_key
                );

                self.store
                    .upsert_synced_coursework(SyncedCourseworkRecord {
                        key,
                        task_id: record.task_id,
                        due_key,
                        content,
                        updated_at: Utc::now(),
                    })
                    .await?;
                Ok(ItemOutcome::Updated)
            }
            Some(_) => Ok(ItemOutcome::Skipped),
        }
    }

    fn window_end(&self, now: DateTime<Tz>) -> Result<DateTime<Tz>> {
        let days = self.settings.due_within_days;
        Duration::try_days(days)
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| anyhow!("due window of {} days is out of range", days))
    }

    /// Stored links sorted by due date and split around `now` and the window
    pub async fn tracked(&self, now: DateTime<Tz>) -> Result<TrackedCoursework> {
        let limit = self.window_end(now)?;
        let mut records: Vec<(Option<DateTime<Tz>>, SyncedCourseworkRecord)> = self
            .store
            .list_synced_coursework()
            .await?
            .into_iter()
            .map(|r| (parse_due_key(&r.due_key, self.timezone), r))
            .collect();
        records.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.key.cmp(&b.1.key)));

        let mut tracked = TrackedCoursework::default();
        for (due, record) in records {
            match due {
                Some(due) if due <= now => tracked.overdue.push(record),
                Some(due) if due <= limit => tracked.upcoming.push(record),
                _ => tracked.later.push(record),
            }
        }
        Ok(tracked)
    }
}
