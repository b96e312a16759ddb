// File: taskbot/src/services/class_schedule_service.rs
use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::constants::review::DEFAULT_OFFSET_MINUTES;
use crate::errors::ValidationError;
use crate::review::{CreatedReview, ReviewMode, ReviewSeriesBuilder};
use crate::services::notifier::{Notification, NotificationSink};
use crate::services::validation::{optional_text, require_text};
use crate::store::{ClassSchedule, NewClassSchedule, Store};
use crate::trigger::{parse_weekday, same_minute, truncate_to_minute, TimeOfDay};

const MAX_SUBJECT_CHARS: usize = 100;
const MAX_CONTENT_CHARS: usize = 200;
const MAX_INSTRUCTOR_CHARS: usize = 50;

/// Offsets beyond a week would never line up with the weekly slot
const MAX_OFFSET_MINUTES: i32 = 7 * 24 * 60;

/// Operator input for a new class schedule
#[derive(Debug, Clone, Deserialize)]
pub struct ClassScheduleRequest {
    pub weekday: String,
    pub time: String,
    pub subject: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub review_offset_minutes: Option<i32>,
    #[serde(default)]
    pub review_mode: Option<ReviewMode>,
}

impl ClassScheduleRequest {
    pub fn validate(&self) -> Result<NewClassSchedule, ValidationError> {
        let review_offset_minutes = self.review_offset_minutes.unwrap_or(DEFAULT_OFFSET_MINUTES);
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&review_offset_minutes) {
            return Err(ValidationError::InvalidSchedule {
                value: review_offset_minutes.to_string(),
                reason: format!("offset must be within ±{} minutes", MAX_OFFSET_MINUTES),
            });
        }

        Ok(NewClassSchedule {
            weekday: parse_weekday(&self.weekday)?,
            time: TimeOfDay::parse(self.time.trim())?,
            subject: require_text("subject", &self.subject, MAX_SUBJECT_CHARS)?,
            content: optional_text("content", self.content.as_deref(), MAX_CONTENT_CHARS)?,
            instructor: optional_text(
                "instructor",
                self.instructor.as_deref(),
                MAX_INSTRUCTOR_CHARS,
            )?,
            review_offset_minutes,
            review_mode: self.review_mode.unwrap_or_default(),
        })
    }
}

/// Series generated for one schedule during a tick
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedSeries {
    pub schedule_id: u64,
    pub reviews: Vec<CreatedReview>,
}

pub struct ClassScheduleService {
    store: Arc<Store>,
    series: Arc<ReviewSeriesBuilder>,
    notifier: Arc<dyn NotificationSink>,
}

impl ClassScheduleService {
    pub fn new(
        store: Arc<Store>,
        series: Arc<ReviewSeriesBuilder>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            series,
            notifier,
        }
    }

    pub async fn add(&self, request: &ClassScheduleRequest) -> Result<ClassSchedule> {
        let new = request.validate()?;
        let schedule = self.store.add_schedule(new).await?;
        info!(
            "Added class schedule {} '{}' on {} {} (+{}m, {})",
            schedule.id,
            schedule.subject,
            schedule.weekday,
            schedule.time,
            schedule.review_offset_minutes,
            schedule.review_mode
        );
        Ok(schedule)
    }

    pub async fn list(&self) -> Result<Vec<ClassSchedule>> {
        let mut schedules = self.store.list_schedules().await?;
        schedules.sort_by_key(|s| (s.weekday.num_days_from_monday(), s.time, s.id));
        Ok(schedules)
    }

    pub async fn remove(&self, id: u64) -> Result<bool> {
        Ok(self.store.remove_schedule(id).await?)
    }

    /// Generates a review series for every schedule whose offset slot
    /// matches `now`. A failing schedule does not affect the others.
    #[instrument(skip(self))]
    pub async fn run_tick(&self, now: DateTime<Tz>) -> Result<Vec<GeneratedSeries>> {
        // Offsets never advance the weekday, so today's schedules are the only candidates
        let schedules = self.store.schedules_for_day(now.weekday()).await?;
        let mut generated = Vec::new();

        let now_utc = now.with_timezone(&Utc);
        let due = schedules.iter().filter(|s| {
            s.trigger().matches(&now) && !same_minute(s.last_generated_at, now_utc)
        });

        for schedule in due {
            match self.generate(schedule, &now).await {
                Ok(reviews) => {
                    let stamp = truncate_to_minute(now_utc);
                    if let Err(e) = self
                        .store
                        .update_schedule(schedule.id, |s| s.last_generated_at = Some(stamp))
                        .await
                    {
                        warn!("Failed to record generation for schedule {}: {}", schedule.id, e);
                    }
                    generated.push(GeneratedSeries {
                        schedule_id: schedule.id,
                        reviews,
                    })
                }
                Err(e) => error!(
                    "Failed to generate reviews for schedule {} '{}': {:#}",
                    schedule.id, schedule.subject, e
                ),
            }
        }

        Ok(generated)
    }

    async fn generate(&self, schedule: &ClassSchedule, now: &DateTime<Tz>) -> Result<Vec<CreatedReview>> {
        let mode = schedule.review_mode;
        let reviews = self
            .series
            .build_series(&schedule.review_title(), mode, now.date_naive())
            .await;

        if reviews.is_empty() {
            return Err(anyhow!("no review task could be created"));
        }

        info!(
            "Schedule {} '{}': created {}/{} review tasks",
            schedule.id,
            schedule.subject,
            reviews.len(),
            mode.occurrences()
        );

        let notification = Notification::ClassTaskCreated {
            schedule_id: schedule.id,
            subject: schedule.subject.clone(),
            mode,
            occurrences: mode.occurrences(),
            span: mode.span_label().to_string(),
            created: reviews.len(),
            executed_at: now.to_rfc3339(),
        };
        if let Err(e) = self.notifier.notify(notification).await {
            warn!("Failed to deliver class task notification: {:#}", e);
        }

        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn request() -> ClassScheduleRequest {
        ClassScheduleRequest {
            weekday: "月曜日".to_string(),
            time: "09:00".to_string(),
            subject: "Linear Algebra".to_string(),
            content: Some("".to_string()),
            instructor: None,
            review_offset_minutes: None,
            review_mode: None,
        }
    }

    #[test]
    fn test_defaults_applied() {
        let new = request().validate().unwrap();
        assert_eq!(new.weekday, Weekday::Mon);
        assert_eq!(new.review_offset_minutes, DEFAULT_OFFSET_MINUTES);
        assert_eq!(new.review_mode, ReviewMode::Normal);
        assert_eq!(new.content, None);
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut bad = request();
        bad.time = "9時".to_string();
        assert!(matches!(
            bad.validate(),
            Err(ValidationError::InvalidTimeFormat { .. })
        ));

        let mut long = request();
        long.subject = "x".repeat(MAX_SUBJECT_CHARS + 1);
        assert!(matches!(long.validate(), Err(ValidationError::TooLong { .. })));

        let mut offset = request();
        offset.review_offset_minutes = Some(MAX_OFFSET_MINUTES + 1);
        assert!(offset.validate().is_err());
    }

    #[test]
    fn test_offset_bounds() {
        for minutes in [i32::MIN, i32::MAX, -MAX_OFFSET_MINUTES - 1] {
            let mut offset = request();
            offset.review_offset_minutes = Some(minutes);
            assert!(
                matches!(offset.validate(), Err(ValidationError::InvalidSchedule { .. })),
                "accepted offset {}",
                minutes
            );
        }

        for minutes in [-MAX_OFFSET_MINUTES, 0, MAX_OFFSET_MINUTES] {
            let mut offset = request();
            offset.review_offset_minutes = Some(minutes);
            assert_eq!(offset.validate().unwrap().review_offset_minutes, minutes);
        }
    }

    #[test]
    fn test_extreme_offset_from_json_is_rejected() {
        let parsed: ClassScheduleRequest = serde_json::from_str(
            r#"{"weekday":"mon","time":"09:00","subject":"Art","review_offset_minutes":-2147483648}"#,
        )
        .unwrap();
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn test_mode_from_json_falls_back() {
        let parsed: ClassScheduleRequest = serde_json::from_str(
            r#"{"weekday":"tue","time":"10:00","subject":"Art","review_mode":"intense"}"#,
        )
        .unwrap();
        assert_eq!(parsed.validate().unwrap().review_mode, ReviewMode::Normal);
    }
}
