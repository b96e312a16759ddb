// File: taskbot/src/services/mod.rs

pub mod class_schedule_service;
pub mod coursework_sync;
pub mod digest_service;
pub mod notifier;
pub mod reminder_service;
pub mod task_service;
pub mod validation;

pub use class_schedule_service::{ClassScheduleRequest, ClassScheduleService, GeneratedSeries};
pub use coursework_sync::{CourseworkSync, SyncSummary, TrackedCoursework};
pub use digest_service::{DigestService, WeeklyReport};
pub use notifier::{Notification, NotificationSink, WebhookNotifier};
pub use reminder_service::{ReminderRequest, ReminderService, ReminderTickReport};
pub use task_service::{TaskDestination, TaskDigest, TaskService};
