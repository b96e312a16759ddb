//! Persisted record types.
//!
//! Field aliases keep documents written by earlier versions readable
//! (`day`, `once`, `lastExecuted`, camelCase keys).

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::constants::review::DEFAULT_OFFSET_MINUTES;
use crate::review::ReviewMode;
use crate::trigger::{OffsetSlot, TimeOfDay, Trigger, WeeklySlot};

/// Weekdays are written as `Mon`..`Sun` and read back in any form
/// [`crate::trigger::parse_weekday`] understands.
pub mod weekday_format {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::trigger::parse_weekday;

    pub fn serialize<S: Serializer>(weekday: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(weekday)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_weekday(&raw).map_err(serde::de::Error::custom)
    }
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

// ============================================================================
// Reminders
// ============================================================================

/// Reminder lifecycle. Persisted inline with the reminder as `mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReminderMode {
    /// Fires every week, forever
    Recurring,
    /// Fires once, then is deleted
    Once,
    /// Fires weekly until its lifetime after the first fire has elapsed
    Bounded { armed_at: Option<DateTime<Utc>> },
}

impl ReminderMode {
    pub fn label(&self) -> &'static str {
        match self {
            ReminderMode::Recurring => "recurring",
            ReminderMode::Once => "once",
            ReminderMode::Bounded { .. } => "bounded",
        }
    }

    /// Parses a mode name as accepted from operators
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "recurring" | "weekly" => Some(ReminderMode::Recurring),
            "once" => Some(ReminderMode::Once),
            "bounded" => Some(ReminderMode::Bounded { armed_at: None }),
            _ => None,
        }
    }
}

impl fmt::Display for ReminderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredReminder")]
pub struct Reminder {
    pub id: u64,
    #[serde(with = "weekday_format")]
    pub weekday: Weekday,
    pub time: TimeOfDay,
    pub content: String,
    #[serde(flatten)]
    pub mode: ReminderMode,
    pub last_fired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    pub fn trigger(&self) -> Trigger {
        Trigger::Weekly(WeeklySlot::new(self.weekday, self.time))
    }
}

/// On-disk shape accepted for reminders, including the legacy `once` flag
#[derive(Deserialize)]
struct StoredReminder {
    id: u64,
    #[serde(alias = "day", with = "weekday_format")]
    weekday: Weekday,
    time: TimeOfDay,
    content: String,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default, alias = "armedAt")]
    armed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    once: Option<bool>,
    #[serde(default, alias = "lastExecuted", alias = "lastFiredAt")]
    last_fired_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now", alias = "createdAt")]
    created_at: DateTime<Utc>,
}

impl TryFrom<StoredReminder> for Reminder {
    type Error = String;

    fn try_from(stored: StoredReminder) -> Result<Self, Self::Error> {
        let mode = match stored.mode.as_deref() {
            Some("bounded") => ReminderMode::Bounded {
                armed_at: stored.armed_at,
            },
            Some(name) => ReminderMode::from_name(name)
                .ok_or_else(|| format!("unknown reminder mode '{}'", name))?,
            None if stored.once == Some(true) => ReminderMode::Once,
            None => ReminderMode::Recurring,
        };

        Ok(Reminder {
            id: stored.id,
            weekday: stored.weekday,
            time: stored.time,
            content: stored.content,
            mode,
            last_fired_at: stored.last_fired_at,
            created_at: stored.created_at,
        })
    }
}

// ============================================================================
// Class schedules
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSchedule {
    pub id: u64,
    #[serde(alias = "day", with = "weekday_format")]
    pub weekday: Weekday,
    pub time: TimeOfDay,
    pub subject: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub instructor: Option<String>,
    #[serde(default = "default_offset", alias = "reviewOffsetMinutes")]
    pub review_offset_minutes: i32,
    #[serde(default, alias = "reviewMode")]
    pub review_mode: ReviewMode,
    #[serde(default = "Utc::now", alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Minute of the last generated review series
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_generated_at: Option<DateTime<Utc>>,
}

fn default_offset() -> i32 {
    DEFAULT_OFFSET_MINUTES
}

impl ClassSchedule {
    pub fn trigger(&self) -> Trigger {
        Trigger::Offset(OffsetSlot::new(
            self.weekday,
            self.time,
            self.review_offset_minutes,
        ))
    }

    /// Base content for the generated review tasks
    pub fn review_title(&self) -> String {
        let mut title = self.subject.clone();
        if let Some(instructor) = &self.instructor {
            title.push_str(&format!(" ({})", instructor));
        }
        if let Some(content) = &self.content {
            title.push_str(&format!(" - {}", content));
        }
        title
    }
}

// ============================================================================
// Coursework sync
// ============================================================================

/// Link between one coursework item and the tracker task mirroring it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncedCourseworkRecord {
    /// `courseId:courseWorkId`
    pub key: String,
    #[serde(alias = "taskId")]
    pub task_id: String,
    #[serde(alias = "dueKey")]
    pub due_key: String,
    pub content: String,
    #[serde(default = "Utc::now", alias = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

pub fn coursework_key(course_id: &str, course_work_id: &str) -> String {
    format!("{}:{}", course_id, course_work_id)
}
