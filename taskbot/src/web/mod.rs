// File: taskbot/src/web/mod.rs
pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::config::Config;
use crate::review::ReviewSeriesBuilder;
use crate::services::{ClassScheduleService, CourseworkSync, ReminderService, TaskService};

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub reminder_service: Arc<ReminderService>,
    pub class_schedule_service: Arc<ClassScheduleService>,
    pub coursework_sync: Arc<CourseworkSync>,
    pub task_service: Arc<TaskService>,
    pub review_series: Arc<ReviewSeriesBuilder>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        reminder_service: Arc<ReminderService>,
        class_schedule_service: Arc<ClassScheduleService>,
        coursework_sync: Arc<CourseworkSync>,
        task_service: Arc<TaskService>,
        review_series: Arc<ReviewSeriesBuilder>,
    ) -> Self {
        Self {
            config,
            reminder_service,
            class_schedule_service,
            coursework_sync,
            task_service,
            review_series,
        }
    }
}
