// File: taskbot/src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use taskbot::classroom::{ClassroomCredentials, CourseworkProvider, GoogleClassroomClient};
use taskbot::config::ConfigManager;
use taskbot::review::ReviewSeriesBuilder;
use taskbot::scheduler::{MinuteTick, TaskScheduler};
use taskbot::services::{
    ClassScheduleService, CourseworkSync, DigestService, NotificationSink, ReminderService,
    TaskService, WebhookNotifier,
};
use taskbot::store::Store;
use taskbot::todoist::{TaskTracker, TodoistClient};
use taskbot::web::{start_web_server, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with reduced verbosity
    let env_filter = EnvFilter::from_default_env()
        .add_directive("taskbot=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("tokio_cron_scheduler=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting study task scheduler");

    // Load configuration
    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let config_manager = ConfigManager::new(config_dir).await?;
    let config = config_manager.get_current_config();

    let store = Arc::new(Store::new(&config.data_dir).await?);

    let notifier: Arc<dyn NotificationSink> =
        Arc::new(WebhookNotifier::new(config.notification_webhook_url.clone())?);
    if config.notification_webhook_url.is_empty() {
        warn!("No notification_webhook_url configured in config/main.toml, notifications are disabled");
    }

    // Long-lived remote clients
    let tracker: Arc<dyn TaskTracker> = Arc::new(TodoistClient::new(
        &config.todoist.api_base_url,
        config.todoist_token()?,
    )?);
    let task_service = Arc::new(TaskService::new(tracker, config.timezone));
    info!("Todoist client initialized ({})", config.todoist.api_base_url);

    // Missing Classroom credentials only surface when a sync runs
    let credentials = ClassroomCredentials::from_secrets(&config.secrets.classroom);
    if config.classroom.enabled {
        if let Err(e) = &credentials {
            warn!("Classroom sync is enabled but credentials are unusable: {}", e);
        }
    }
    let provider: Arc<dyn CourseworkProvider> = Arc::new(GoogleClassroomClient::new(
        &config.classroom.api_base_url,
        &config.classroom.token_url,
        credentials,
    )?);

    // Services
    let review_series = Arc::new(ReviewSeriesBuilder::new(
        task_service.clone(),
        config.review.project_name.clone(),
    ));
    let reminder_service = Arc::new(ReminderService::new(
        store.clone(),
        task_service.clone(),
        notifier.clone(),
        config.reminders.project_name.clone(),
    ));
    let class_schedule_service = Arc::new(ClassScheduleService::new(
        store.clone(),
        review_series.clone(),
        notifier.clone(),
    ));
    let coursework_sync = Arc::new(CourseworkSync::new(
        provider,
        task_service.clone(),
        store.clone(),
        config.classroom.clone(),
        config.classroom_timezone(),
    ));
    let digest_service = Arc::new(DigestService::new(
        task_service.clone(),
        store.clone(),
        notifier.clone(),
    ));

    let minute_tick = Arc::new(MinuteTick::new(
        config.reminders.enabled.then(|| reminder_service.clone()),
        config
            .class_schedules
            .enabled
            .then(|| class_schedule_service.clone()),
    ));

    // Initialize and start scheduler
    let scheduler = TaskScheduler::new(
        config.clone(),
        minute_tick,
        digest_service,
        coursework_sync.clone(),
        notifier,
    )
    .await?;
    scheduler.start().await?;

    // Start web server
    let state = AppState::new(
        config,
        reminder_service,
        class_schedule_service,
        coursework_sync,
        task_service,
        review_series,
    );
    start_web_server(state).await?;

    Ok(())
}
