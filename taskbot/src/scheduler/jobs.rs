// File: taskbot/src/scheduler/jobs.rs
use anyhow::{anyhow, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, instrument, warn};

use super::MinuteTick;
use crate::config::Config;
use crate::constants::defaults::MINUTE_TICK_SCHEDULE;
use crate::services::{CourseworkSync, DigestService, Notification, NotificationSink, SyncSummary};
use crate::trigger::{now_in, CronExpr, Trigger};

pub struct TaskScheduler {
    config: Arc<Config>,
    minute_tick: Arc<MinuteTick>,
    digests: Arc<DigestService>,
    coursework: Arc<CourseworkSync>,
    notifier: Arc<dyn NotificationSink>,
    scheduler: JobScheduler,
}

impl TaskScheduler {
    pub async fn new(
        config: Arc<Config>,
        minute_tick: Arc<MinuteTick>,
        digests: Arc<DigestService>,
        coursework: Arc<CourseworkSync>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create JobScheduler: {}", e))?;

        Ok(Self {
            config,
            minute_tick,
            digests,
            coursework,
            notifier,
            scheduler,
        })
    }

    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        info!("Starting task scheduler in {}", self.config.timezone);
        let mut scheduled_count = 0;

        if self.config.reminders.enabled || self.config.class_schedules.enabled {
            match self.schedule_minute_tick().await {
                Ok(_) => {
                    scheduled_count += 1;
                    info!("✓ Scheduled per-minute tick");
                }
                Err(e) => error!("✗ Failed to schedule per-minute tick: {}", e),
            }
        } else {
            info!("Reminders and class schedules disabled, no per-minute tick");
        }

        if self.config.notifications.enabled {
            for schedule in &self.config.notifications.schedules {
                match self
                    .schedule_digest_job(schedule.label.clone(), &schedule.time)
                    .await
                {
                    Ok(_) => {
                        scheduled_count += 1;
                        info!("✓ Scheduled {} digest: {}", schedule.label, schedule.time);
                    }
                    Err(e) => error!(
                        "✗ Failed to schedule {} digest: {} (schedule: {})",
                        schedule.label, e, schedule.time
                    ),
                }
            }
        } else {
            info!("Todo digests disabled, skipping schedules");
        }

        if self.config.weekly_report.enabled {
            let schedule = &self.config.weekly_report.schedule;
            match self.schedule_weekly_report_job(schedule).await {
                Ok(_) => {
                    scheduled_count += 1;
                    info!("✓ Scheduled weekly report: {}", schedule);
                }
                Err(e) => error!("✗ Failed to schedule weekly report: {} (schedule: {})", e, schedule),
            }
        } else {
            info!("Weekly report disabled, skipping schedule");
        }

        if self.config.classroom.enabled {
            let schedule = &self.config.classroom.sync_schedule;
            match self.schedule_classroom_sync_job(schedule).await {
                Ok(_) => {
                    scheduled_count += 1;
                    info!("✓ Scheduled classroom sync: {}", schedule);
                }
                Err(e) => error!("✗ Failed to schedule classroom sync: {} (schedule: {})", e, schedule),
            }
        } else {
            info!("Classroom sync disabled, skipping schedule");
        }

        if scheduled_count > 0 {
            self.scheduler
                .start()
                .await
                .map_err(|e| anyhow!("Failed to start scheduler: {}", e))?;
            info!("✓ Task scheduler started successfully with {} jobs", scheduled_count);
        } else {
            warn!("No scheduled jobs configured - scheduler not started");
        }

        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| anyhow!("Failed to shut down scheduler: {}", e))
    }

    fn timezone(&self) -> Tz {
        self.config.timezone
    }

    async fn add_job(&self, job: Job, what: &str) -> Result<()> {
        self.scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("Failed to add {} job to scheduler: {}", what, e))?;
        Ok(())
    }

    async fn schedule_minute_tick(&self) -> Result<()> {
        let tz = self.timezone();
        let minute_tick = self.minute_tick.clone();

        let job = Job::new_async_tz(MINUTE_TICK_SCHEDULE, tz, move |_uuid, _scheduler| {
            let minute_tick = minute_tick.clone();

            Box::pin(async move {
                minute_tick.run(now_in(tz)).await;
            })
        })
        .map_err(|e| anyhow!("Failed to create per-minute job: {}", e))?;

        self.add_job(job, "per-minute").await
    }

    async fn schedule_digest_job(&self, label: String, schedule: &CronExpr) -> Result<()> {
        let tz = self.timezone();
        let digests = self.digests.clone();
        let cron = schedule.job_schedule();
        let trigger = Trigger::Fixed(schedule.clone());

        let job = Job::new_async_tz(cron.as_str(), tz, move |_uuid, _scheduler| {
            let digests = digests.clone();
            let label = label.clone();
            let trigger = trigger.clone();

            Box::pin(async move {
                let now = now_in(tz);
                if !fires_now(&trigger, &now, "digest") {
                    return;
                }
                info!("📢 Sending {} todo digest", label);
                match digests.send_todo_digest(&label, now).await {
                    Ok(_) => info!("✓ {} digest sent", label),
                    Err(e) => error!("✗ {} digest failed: {:#}", label, e),
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create digest job for '{}': {}", cron, e))?;

        self.add_job(job, "digest").await
    }

    async fn schedule_weekly_report_job(&self, schedule: &CronExpr) -> Result<()> {
        let tz = self.timezone();
        let digests = self.digests.clone();
        let cron = schedule.job_schedule();
        let trigger = Trigger::Fixed(schedule.clone());

        let job = Job::new_async_tz(cron.as_str(), tz, move |_uuid, _scheduler| {
            let digests = digests.clone();
            let trigger = trigger.clone();

            Box::pin(async move {
                let now = now_in(tz);
                if !fires_now(&trigger, &now, "weekly report") {
                    return;
                }
                match digests.send_weekly_report(now).await {
                    Ok(report) => info!("✓ Weekly report sent ({} overdue)", report.overdue),
                    Err(e) => error!("✗ Weekly report failed: {:#}", e),
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create weekly report job for '{}': {}", cron, e))?;

        self.add_job(job, "weekly report").await
    }

    async fn schedule_classroom_sync_job(&self, schedule: &CronExpr) -> Result<()> {
        let tz = self.timezone();
        let coursework = self.coursework.clone();
        let notifier = self.notifier.clone();
        let cron = schedule.job_schedule();
        let trigger = Trigger::Fixed(schedule.clone());

        let job = Job::new_async_tz(cron.as_str(), tz, move |_uuid, _scheduler| {
            let coursework = coursework.clone();
            let notifier = notifier.clone();
            let trigger = trigger.clone();

            Box::pin(async move {
                if !fires_now(&trigger, &now_in(tz), "classroom sync") {
                    return;
                }
                run_classroom_sync(&coursework, notifier.as_ref(), tz).await;
            })
        })
        .map_err(|e| anyhow!("Failed to create classroom sync job for '{}': {}", cron, e))?;

        self.add_job(job, "classroom sync").await
    }
}

/// Fixed-time job bodies run only when their own expression matches the
/// minute the runner woke them in
fn fires_now(trigger: &Trigger, now: &DateTime<Tz>, job: &str) -> bool {
    let due = trigger.matches(now);
    if !due {
        warn!("⚠ {} job woke at {} outside its schedule, skipping", job, now);
    }
    due
}

/// Runs one sync and reports the result. A failed sync produces a
/// `sync-failed` notification instead of a summary.
pub async fn run_classroom_sync(
    coursework: &CourseworkSync,
    notifier: &dyn NotificationSink,
    tz: Tz,
) -> Option<SyncSummary> {
    info!("🔄 Executing scheduled classroom sync");
    let notification = match coursework.sync(now_in(tz)).await {
        Ok(summary) => {
            info!("✓ Classroom sync completed");
            Notification::SyncSummary(summary)
        }
        Err(e) => {
            error!("✗ Classroom sync failed: {:#}", e);
            Notification::SyncFailed {
                error: e.to_string(),
            }
        }
    };

    let summary = match &notification {
        Notification::SyncSummary(summary) => Some(*summary),
        _ => None,
    };
    if let Err(e) = notifier.notify(notification).await {
        warn!("Failed to deliver classroom sync notification: {:#}", e);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Tokyo;

    #[test]
    fn test_fixed_jobs_only_run_on_their_own_minute() {
        let weekday_mornings = Trigger::Fixed(CronExpr::parse("30 7 * * 1-5").unwrap());

        // 2024-01-05 is a Friday, 2024-01-06 a Saturday
        let friday = Tokyo.with_ymd_and_hms(2024, 1, 5, 7, 30, 0).unwrap();
        let saturday = Tokyo.with_ymd_and_hms(2024, 1, 6, 7, 30, 0).unwrap();
        assert!(fires_now(&weekday_mornings, &friday, "digest"));
        assert!(!fires_now(&weekday_mornings, &saturday, "digest"));
    }
}
