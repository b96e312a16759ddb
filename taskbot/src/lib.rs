pub mod classroom;
pub mod config;
pub mod constants;
pub mod errors;
pub mod review;
pub mod scheduler;
pub mod services;
pub mod store;
pub mod todoist;
pub mod trigger;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigManager};
pub use review::{ReviewMode, ReviewSeriesBuilder};
pub use scheduler::{MinuteTick, TaskScheduler};
pub use services::{
    ClassScheduleService, CourseworkSync, DigestService, ReminderService, TaskService,
    WebhookNotifier,
};
pub use store::Store;
