// File: taskbot/src/services/notifier.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constants::http::WEBHOOK_TIMEOUT;
use crate::review::ReviewMode;
use crate::services::coursework_sync::SyncSummary;
use crate::services::digest_service::WeeklyReport;
use crate::todoist::Task;

/// A task as shown in a digest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestEntry {
    pub task_id: String,
    pub content: String,
    pub priority: u8,
    pub due: Option<String>,
}

impl From<&Task> for DigestEntry {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            content: task.content.clone(),
            priority: task.priority,
            due: task.due.as_ref().map(|d| d.date.clone()),
        }
    }
}

/// Everything the bot reports to the outside world
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Notification {
    ReminderFired {
        reminder_id: u64,
        weekday: String,
        time: String,
        content: String,
        mode: String,
        task_id: String,
    },
    ClassTaskCreated {
        schedule_id: u64,
        subject: String,
        mode: ReviewMode,
        occurrences: usize,
        span: String,
        created: usize,
        executed_at: String,
    },
    SyncSummary(SyncSummary),
    SyncFailed {
        error: String,
    },
    TodoDigest {
        label: String,
        today: Vec<DigestEntry>,
        overdue: Vec<DigestEntry>,
    },
    WeeklyReport(WeeklyReport),
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::ReminderFired { .. } => "reminder-fired",
            Notification::ClassTaskCreated { .. } => "class-task-created",
            Notification::SyncSummary(_) => "sync-summary",
            Notification::SyncFailed { .. } => "sync-failed",
            Notification::TodoDigest { .. } => "todo-digest",
            Notification::WeeklyReport(_) => "weekly-report",
        }
    }
}

/// Wire format of a delivered notification
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEnvelope {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub notification: Notification,
}

impl NotificationEnvelope {
    pub fn new(notification: Notification) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            notification,
        }
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<()>;
}

/// Posts notifications as JSON to a webhook. Delivery is best effort.
pub struct WebhookNotifier {
    webhook_url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(webhook_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client for notifications: {}", e))?;

        Ok(Self {
            webhook_url,
            client,
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        if self.webhook_url.is_empty() {
            debug!("No webhook URL configured, skipping {} notification", notification.kind());
            return Ok(());
        }

        let kind = notification.kind();
        let envelope = NotificationEnvelope::new(notification);

        match timeout(
            WEBHOOK_TIMEOUT,
            self.client.post(&self.webhook_url).json(&envelope).send(),
        )
        .await
        {
            Ok(Ok(response)) => {
                if response.status().is_success() {
                    info!("Notification sent: {} ({})", kind, envelope.event_id);
                } else {
                    warn!("Notification webhook returned status {} for {}", response.status(), kind);
                }
            }
            Ok(Err(e)) => {
                warn!("Failed to send {} notification: {}", kind, e);
            }
            Err(_) => {
                warn!("Notification webhook timeout for {}", kind);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_flattens_tagged_notification() {
        let envelope = NotificationEnvelope::new(Notification::SyncFailed {
            error: "boom".to_string(),
        });
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["kind"], "sync-failed");
        assert_eq!(value["error"], "boom");
        assert!(value["event_id"].is_string());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_sync_summary_payload_is_inlined() {
        let notification = Notification::SyncSummary(SyncSummary {
            created: 1,
            updated: 2,
            closed: 3,
            skipped: 4,
        });
        assert_eq!(
            serde_json::to_value(&notification).unwrap(),
            json!({"kind": "sync-summary", "created": 1, "updated": 2, "closed": 3, "skipped": 4})
        );
        assert_eq!(notification.kind(), "sync-summary");
    }

    #[tokio::test]
    async fn test_empty_url_is_a_no_op() {
        let notifier = WebhookNotifier::new(String::new()).unwrap();
        notifier
            .notify(Notification::SyncFailed {
                error: "x".to_string(),
            })
            .await
            .unwrap();
    }
}
