//! Cron-driven job scheduling
//!
//! One per-minute job evaluates weekday triggers (reminders and class
//! schedules). Fixed-time jobs send the todo digests, the weekly report and
//! run the coursework sync. All jobs run in the configured timezone.
//!
//! # Configuration
//!
//! Fixed-time schedules come from `config/main.toml` as 5-field cron
//! expressions and are widened to the 6-field form the job runner expects:
//!
//! ```toml
//! [[notifications.schedules]]
//! time = "20 8 * * *"
//! label = "朝"
//!
//! [classroom]
//! enabled = true
//! sync_schedule = "0 7 * * *"
//! ```

pub mod jobs;
pub use jobs::{run_classroom_sync, TaskScheduler};

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::services::{ClassScheduleService, ReminderService, ReminderTickReport};

/// What one per-minute tick did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickOutcome {
    pub reminders: Option<ReminderTickReport>,
    /// Ids of class schedules that produced a review series
    pub class_series: Vec<u64>,
}

/// The per-minute unit of work, kept apart from the cron job so it can be
/// driven directly with a chosen `now`
pub struct MinuteTick {
    reminders: Option<Arc<ReminderService>>,
    classes: Option<Arc<ClassScheduleService>>,
    running: Mutex<()>,
}

impl MinuteTick {
    pub fn new(
        reminders: Option<Arc<ReminderService>>,
        classes: Option<Arc<ClassScheduleService>>,
    ) -> Self {
        Self {
            reminders,
            classes,
            running: Mutex::new(()),
        }
    }

    /// Runs reminders and class schedules side by side. Ticks are serialized:
    /// a minute that arrives while the previous one is running waits for it.
    pub async fn run(&self, now: DateTime<Tz>) -> TickOutcome {
        let _guard = match self.running.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("Previous minute tick still running, queueing {}", now);
                self.running.lock().await
            }
        };

        let reminders = async {
            let service = self.reminders.as_ref()?;
            match service.run_tick(now).await {
                Ok(report) => Some(report),
                Err(e) => {
                    error!("✗ Reminder tick failed: {:#}", e);
                    None
                }
            }
        };
        let classes = async {
            let Some(service) = self.classes.as_ref() else {
                return Vec::new();
            };
            match service.run_tick(now).await {
                Ok(generated) => generated.into_iter().map(|g| g.schedule_id).collect(),
                Err(e) => {
                    error!("✗ Class schedule tick failed: {:#}", e);
                    Vec::new()
                }
            }
        };

        let (reminders, class_series) = tokio::join!(reminders, classes);
        TickOutcome {
            reminders,
            class_series,
        }
    }
}
