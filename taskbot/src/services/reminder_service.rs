// File: taskbot/src/services/reminder_service.rs
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::constants::reminders::BOUNDED_LIFETIME_DAYS;
use crate::errors::ValidationError;
use crate::services::notifier::{Notification, NotificationSink};
use crate::services::task_service::{TaskDestination, TaskService};
use crate::services::validation::require_text;
use crate::store::{NewReminder, Reminder, ReminderMode, Store};
use crate::trigger::{parse_weekday, same_minute, truncate_to_minute, TimeOfDay};

const MAX_CONTENT_CHARS: usize = 200;

/// What a tick does with one reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderAction {
    Idle,
    /// Bounded lifetime is over; delete without firing
    Expire,
    Fire(AfterFire),
}

/// State change applied once a fire has created its task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterFire {
    Record,
    Arm,
    Delete,
}

/// Decides the transition for `reminder` at `now`. Pure.
pub fn plan_reminder(reminder: &Reminder, now: &DateTime<Tz>) -> ReminderAction {
    let now_utc = now.with_timezone(&Utc);

    if let ReminderMode::Bounded {
        armed_at: Some(armed_at),
    } = reminder.mode
    {
        let lifetime = truncate_to_minute(now_utc) - truncate_to_minute(armed_at);
        if lifetime >= Duration::days(BOUNDED_LIFETIME_DAYS) {
            return ReminderAction::Expire;
        }
    }

    if !reminder.trigger().matches(now) || same_minute(reminder.last_fired_at, now_utc) {
        return ReminderAction::Idle;
    }

    ReminderAction::Fire(match reminder.mode {
        ReminderMode::Recurring => AfterFire::Record,
        ReminderMode::Once => AfterFire::Delete,
        ReminderMode::Bounded { armed_at: None } => AfterFire::Arm,
        ReminderMode::Bounded { armed_at: Some(_) } => AfterFire::Record,
    })
}



/// Operator input for a new reminder
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderRequest {
    pub weekday: String,
    pub time: String,
    pub content: String,
    #[serde(default)]
    pub mode: Option<String>,
}

impl ReminderRequest {
    pub fn validate(&self) -> Result<NewReminder, ValidationError> {
        let mode = match self.mode.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            None => ReminderMode::Recurring,
            Some(name) => ReminderMode::from_name(name).ok_or_else(|| ValidationError::InvalidSchedule {
                value: name.to_string(),
                reason: "mode must be one of recurring, once, bounded".to_string(),
            })?,
        };

        Ok(NewReminder {
            weekday: parse_weekday(&self.weekday)?,
            time: TimeOfDay::parse(self.time.trim())?,
            content: require_text("content", &self.content, MAX_CONTENT_CHARS)?,
            mode,
        })
    }
}

/// Outcome of one tick, by reminder id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderTickReport {
    pub fired: Vec<u64>,
    pub expired: Vec<u64>,
    pub failed: Vec<u64>,
}

pub struct ReminderService {
    store: Arc<Store>,
    tasks: Arc<TaskService>,
    notifier: Arc<dyn NotificationSink>,
    destination: TaskDestination,
}

impl ReminderService {
    pub fn new(
        store: Arc<Store>,
        tasks: Arc<TaskService>,
        notifier: Arc<dyn NotificationSink>,
        project_name: Option<String>,
    ) -> Self {
        Self {
            store,
            tasks,
            notifier,
            destination: project_name.map_or(TaskDestination::Inbox, TaskDestination::Project),
        }
    }

    pub async fn add(&self, request: &ReminderRequest) -> Result<Reminder> {
        let new = request.validate()?;
        let reminder = self.store.add_reminder(new).await?;
        info!(
            "Added {} reminder {} for {} {}",
            reminder.mode, reminder.id, reminder.weekday, reminder.time
        );
        Ok(reminder)
    }

    pub async fn list(&self) -> Result<Vec<Reminder>> {
        let mut reminders = self.store.list_reminders().await?;
        reminders.sort_by_key(|r| (r.weekday.num_days_from_monday(), r.time, r.id));
        Ok(reminders)
    }

    pub async fn remove(&self, id: u64) -> Result<bool> {
        Ok(self.store.remove_reminder(id).await?)
    }

    /// Evaluates every stored reminder at `now`.
    ///
    /// One reminder failing never stops the others. Only a store read
    /// failure fails the tick as a whole.
    #[instrument(skip(self))]
    pub async fn run_tick(&self, now: DateTime<Tz>) -> Result<ReminderTickReport> {
        let reminders = self.store.list_reminders().await?;
        let mut report = ReminderTickReport::default();

        for reminder in reminders {
            match plan_reminder(&reminder, &now) {
                ReminderAction::Idle => {}
                ReminderAction::Expire => match self.store.remove_reminder(reminder.id).await {
                    Ok(_) => {
                        info!("Bounded reminder {} expired and was removed", reminder.id);
                        report.expired.push(reminder.id);
                    }
                    Err(e) => {
                        error!("Failed to remove expired reminder {}: {}", reminder.id, e);
                        report.failed.push(reminder.id);
                    }
                },
                ReminderAction::Fire(after) => match self.fire(&reminder, after, &now).await {
                    Ok(()) => report.fired.push(reminder.id),
                    Err(e) => {
                        warn!("Reminder {} failed to fire: {:#}", reminder.id, e);
                        report.failed.push(reminder.id);
                    }
                },
            }
        }

        if report != ReminderTickReport::default() {
            debug!(
                "Reminder tick: {} fired, {} expired, {} failed",
                report.fired.len(),
                report.expired.len(),
                report.failed.len()
            );
        }
        Ok(report)
    }

    async fn fire(&self, reminder: &Reminder, after: AfterFire, now: &DateTime<Tz>) -> Result<()> {
        let task = self
            .tasks
            .create_reminder_task(&reminder.content, now.date_naive(), &self.destination)
            .await?;
        info!(
            "Reminder {} fired ({}), created task {}",
            reminder.id, reminder.mode, task.id
        );

        let fired_at = truncate_to_minute(now.with_timezone(&Utc));
        match after {
            AfterFire::Delete => {
                self.store.remove_reminder(reminder.id).await?;
            }
            AfterFire::Arm => {
                self.store
                    .update_reminder(reminder.id, |r| {
                        r.mode = ReminderMode::Bounded {
                            armed_at: Some(fired_at),
                        };
                        r.last_fired_at = Some(fired_at);
                    })
                    .await?;
            }
            AfterFire::Record => {
                self.store
                    .update_reminder(reminder.id, |r| r.last_fired_at = Some(fired_at))
                    .await?;
            }
        }

        let notification = Notification::ReminderFired {
            reminder_id: reminder.id,
            weekday: reminder.weekday.to_string(),
            time: reminder.time.to_string(),
            content: reminder.content.clone(),
            mode: reminder.mode.label().to_string(),
            task_id: task.id,
        };
        if let Err(e) = self.notifier.notify(notification).await {
            warn!("Failed to deliver reminder notification: {:#}", e);
        }

        Ok(())
    }
}
