// File: taskbot/src/services/digest_service.rs
use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::services::notifier::{DigestEntry, Notification, NotificationSink};
use crate::services::task_service::{build_digest, TaskService};
use crate::store::Store;
use crate::todoist::Task;

/// Days covered by the weekly report, today included
const REPORT_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayLoad {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyReport {
    pub week_start: NaiveDate,
    pub overdue: usize,
    pub upcoming: Vec<DayLoad>,
    pub reminders: usize,
    pub schedules: usize,
    pub tracked_coursework: usize,
}

pub struct DigestService {
    tasks: Arc<TaskService>,
    store: Arc<Store>,
    notifier: Arc<dyn NotificationSink>,
}

impl DigestService {
    pub fn new(
        tasks: Arc<TaskService>,
        store: Arc<Store>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            tasks,
            store,
            notifier,
        }
    }

    /// Sends today's and overdue tasks under `label`. An empty digest is
    /// still sent so the operator sees that nothing is pending.
    #[instrument(skip(self))]
    pub async fn send_todo_digest(&self, label: &str, now: DateTime<Tz>) -> Result<Notification> {
        let digest = self.tasks.digest(now.date_naive()).await?;
        info!(
            "{} digest: {} due today, {} overdue",
            label,
            digest.today.len(),
            digest.overdue.len()
        );

        let notification = Notification::TodoDigest {
            label: label.to_string(),
            today: digest.today.iter().map(DigestEntry::from).collect(),
            overdue: digest.overdue.iter().map(DigestEntry::from).collect(),
        };
        self.notifier.notify(notification.clone()).await?;
        Ok(notification)
    }

    pub async fn build_weekly_report(&self, now: DateTime<Tz>) -> Result<WeeklyReport> {
        let today = now.date_naive();
        let tasks = self.tasks.all_tasks().await?;
        let overdue = build_digest(tasks.clone(), today, self.tasks.timezone()).overdue.len();

        Ok(WeeklyReport {
            week_start: today,
            overdue,
            upcoming: day_loads(&tasks, today, self.tasks.timezone()),
            reminders: self.store.list_reminders().await?.len(),
            schedules: self.store.list_schedules().await?.len(),
            tracked_coursework: self.store.list_synced_coursework().await?.len(),
        })
    }

    #[instrument(skip(self))]
    pub async fn send_weekly_report(&self, now: DateTime<Tz>) -> Result<WeeklyReport> {
        let report = self.build_weekly_report(now).await?;
        info!(
            "Weekly report: {} overdue, {} due this week",
            report.overdue,
            report.upcoming.iter().map(|d| d.count).sum::<usize>()
        );
        self.notifier
            .notify(Notification::WeeklyReport(report.clone()))
            .await?;
        Ok(report)
    }
}

/// Open tasks due on each of the next [`REPORT_DAYS`] days
fn day_loads(tasks: &[Task], today: NaiveDate, tz: Tz) -> Vec<DayLoad> {
    (0..REPORT_DAYS)
        .map(|offset| {
            let date = today + Duration::days(offset);
            let count = tasks
                .iter()
                .filter(|t| !t.is_completed)
                .filter(|t| t.due.as_ref().and_then(|d| d.local_date(tz)) == Some(date))
                .count();
            DayLoad { date, count }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todoist::TaskDue;
    use chrono_tz::Asia::Tokyo;

    fn task(due: &str, completed: bool) -> Task {
        Task {
            id: due.to_string(),
            content: "t".to_string(),
            description: String::new(),
            due: Some(TaskDue {
                date: due.to_string(),
                datetime: None,
                timezone: None,
                string: None,
            }),
            priority: 1,
            labels: Vec::new(),
            project_id: None,
            is_completed: completed,
        }
    }

    #[test]
    fn test_day_loads_cover_a_week() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let tasks = vec![
            task("2024-05-10", false),
            task("2024-05-10", true),
            task("2024-05-12", false),
            task("2024-05-17", false),
            task("2024-05-09", false),
        ];

        let loads = day_loads(&tasks, today, Tokyo);
        assert_eq!(loads.len(), 7);
        assert_eq!(loads[0], DayLoad { date: today, count: 1 });
        assert_eq!(loads[2].count, 1);
        assert_eq!(loads[6].date, NaiveDate::from_ymd_opt(2024, 5, 16).unwrap());
        assert_eq!(loads.iter().map(|d| d.count).sum::<usize>(), 2);
    }
}
