// File: taskbot/src/config/mod.rs
pub mod manager;
pub mod secrets;

pub use manager::ConfigManager;
pub use secrets::{ClassroomSecrets, SecretsFile, SecretsLoader, TodoistSecrets};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{classroom, defaults, todoist};
use crate::errors::ConfigError;
use crate::trigger::CronExpr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Where notifications are POSTed; empty disables delivery
    #[serde(default)]
    pub notification_webhook_url: String,
    #[serde(default)]
    pub todoist: TodoistConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub weekly_report: WeeklyReportConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub class_schedules: ClassScheduleConfig,
    #[serde(default)]
    pub classroom: ClassroomConfig,
    // Populated from secrets.toml and the environment
    #[serde(skip)]
    pub secrets: SecretsFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoistConfig {
    #[serde(default = "default_todoist_url")]
    pub api_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_review_project")]
    pub project_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSchedule {
    pub time: CronExpr,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_notification_schedules")]
    pub schedules: Vec<NotificationSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReportConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_weekly_report_schedule")]
    pub schedule: CronExpr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Project for reminder tasks; the inbox when unset
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassScheduleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassroomConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_sync_schedule")]
    pub sync_schedule: CronExpr,
    #[serde(default = "default_due_within_days")]
    pub due_within_days: i64,
    #[serde(default = "default_true")]
    pub auto_close_completed: bool,
    /// Only these courses are synced when non-empty
    #[serde(default)]
    pub course_ids: Vec<String>,
    #[serde(default = "default_classroom_project")]
    pub project_name: String,
    /// Timezone sent with timed dues; the main timezone when unset
    pub timezone: Option<Tz>,
    #[serde(default = "default_classroom_url")]
    pub api_base_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

fn default_host() -> String {
    defaults::HOST.to_string()
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_timezone() -> Tz {
    chrono_tz::Asia::Tokyo
}

fn default_data_dir() -> String {
    defaults::DATA_DIR.to_string()
}

fn default_true() -> bool {
    true
}

fn default_todoist_url() -> String {
    todoist::DEFAULT_API_BASE_URL.to_string()
}

fn default_review_project() -> String {
    defaults::REVIEW_PROJECT.to_string()
}

fn default_classroom_project() -> String {
    defaults::CLASSROOM_PROJECT.to_string()
}

fn default_classroom_url() -> String {
    classroom::DEFAULT_API_BASE_URL.to_string()
}

fn default_token_url() -> String {
    classroom::DEFAULT_TOKEN_URL.to_string()
}

fn default_due_within_days() -> i64 {
    defaults::DUE_WITHIN_DAYS
}

fn builtin_cron(expression: &str) -> CronExpr {
    CronExpr::parse(expression).unwrap_or_else(|e| panic!("built-in schedule is invalid: {}", e))
}

fn default_sync_schedule() -> CronExpr {
    builtin_cron(defaults::CLASSROOM_SYNC_SCHEDULE)
}

fn default_weekly_report_schedule() -> CronExpr {
    builtin_cron(defaults::WEEKLY_REPORT_SCHEDULE)
}

fn default_notification_schedules() -> Vec<NotificationSchedule> {
    [("20 8 * * *", "朝"), ("0 12 * * *", "昼"), ("20 19 * * *", "夜")]
        .into_iter()
        .map(|(time, label)| NotificationSchedule {
            time: builtin_cron(time),
            label: label.to_string(),
        })
        .collect()
}

impl Default for TodoistConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_todoist_url(),
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            project_name: default_review_project(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedules: default_notification_schedules(),
        }
    }
}

impl Default for WeeklyReportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            schedule: default_weekly_report_schedule(),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            project_name: None,
        }
    }
}

impl Default for ClassScheduleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sync_schedule: default_sync_schedule(),
            due_within_days: default_due_within_days(),
            auto_close_completed: true,
            course_ids: Vec::new(),
            project_name: default_classroom_project(),
            timezone: None,
            api_base_url: default_classroom_url(),
            token_url: default_token_url(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::LoadFailed {
            path: "main.toml".to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=classroom::MAX_DUE_WITHIN_DAYS).contains(&self.classroom.due_within_days) {
            return Err(ConfigError::InvalidValue {
                field: "classroom.due_within_days".to_string(),
                reason: format!("must be between 0 and {}", classroom::MAX_DUE_WITHIN_DAYS),
            });
        }
        if self.review.project_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "review.project_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(schedule) = self
            .notifications
            .schedules
            .iter()
            .find(|s| s.label.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "notifications.schedules".to_string(),
                reason: format!("schedule '{}' has an empty label", schedule.time),
            });
        }
        Ok(())
    }

    pub fn classroom_timezone(&self) -> Tz {
        self.classroom.timezone.unwrap_or(self.timezone)
    }

    /// Todoist token, required for anything that creates tasks
    pub fn todoist_token(&self) -> Result<&str, ConfigError> {
        self.secrets
            .todoist
            .api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                field: "todoist.api_token".to_string(),
            })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timezone: default_timezone(),
            data_dir: default_data_dir(),
            notification_webhook_url: String::new(),
            todoist: TodoistConfig::default(),
            review: ReviewConfig::default(),
            notifications: NotificationConfig::default(),
            weekly_report: WeeklyReportConfig::default(),
            reminders: ReminderConfig::default(),
            class_schedules: ClassScheduleConfig::default(),
            classroom: ClassroomConfig::default(),
            secrets: SecretsFile::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.port, defaults::PORT);
        assert_eq!(config.timezone, chrono_tz::Asia::Tokyo);
        assert_eq!(config.notifications.schedules.len(), 3);
        assert_eq!(config.notifications.schedules[0].label, "朝");
        assert!(!config.classroom.enabled);
        assert!(config.reminders.project_name.is_none());
    }

    #[test]
    fn test_invalid_cron_rejected_at_load() {
        let err = Config::from_toml_str(
            r#"
[classroom]
enabled = true
sync_schedule = "not a cron"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        assert!(Config::from_toml_str("timezone = \"Mars/Olympus\"").is_err());
    }

    #[test]
    fn test_classroom_timezone_falls_back() {
        let config = Config::from_toml_str(
            r#"
timezone = "Europe/Berlin"
[classroom]
enabled = true
"#,
        )
        .unwrap();
        assert_eq!(config.classroom_timezone(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_negative_window_rejected() {
        let err = Config::from_toml_str("[classroom]\ndue_within_days = -1").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_oversized_window_rejected() {
        let err = Config::from_toml_str("[classroom]\ndue_within_days = 9000000000000000")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "classroom.due_within_days"));

        let at_cap = format!("[classroom]\ndue_within_days = {}", classroom::MAX_DUE_WITHIN_DAYS);
        assert!(Config::from_toml_str(&at_cap).is_ok());
    }

    #[test]
    fn test_missing_todoist_token() {
        let config = Config::default();
        assert!(matches!(
            config.todoist_token(),
            Err(ConfigError::MissingRequired { .. })
        ));
    }
}
