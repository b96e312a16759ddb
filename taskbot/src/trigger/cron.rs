// File: taskbot/src/trigger/cron.rs
use ::cron::Schedule;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::truncate_to_minute;
use crate::errors::ValidationError;

const WEEKDAY_NAMES: [&str; 8] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Widens a 5-field expression to the 6-field form with a leading seconds
/// field and spells numeric weekdays as names.
///
/// Classic cron counts weekdays from 0 (Sunday, also 7). Names read the same
/// in every parser, so the job runner and [`CronExpr::matches`] agree.
pub(crate) fn normalize_cron(expression: &str) -> Result<String, String> {
    let mut fields: Vec<String> = expression.split_whitespace().map(str::to_string).collect();
    match fields.len() {
        5 => fields.insert(0, "0".to_string()),
        6 => {}
        n => {
            return Err(format!(
                "expected 5 fields (minute hour day month dayofweek) or 6 with seconds, got {}",
                n
            ))
        }
    }

    fields[5] = name_weekdays(&fields[5])?;
    Ok(fields.join(" "))
}

fn name_weekdays(field: &str) -> Result<String, String> {
    let name = |token: &str| -> Result<String, String> {
        match token.parse::<usize>() {
            Ok(day) => WEEKDAY_NAMES
                .get(day)
                .map(|n| n.to_string())
                .ok_or_else(|| format!("dayofweek value {} is outside valid range 0-7", day)),
            Err(_) => Ok(token.to_string()),
        }
    };

    field
        .split(',')
        .map(|part| {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => (range, Some(step)),
                None => (part, None),
            };
            let range = match range.split_once('-') {
                Some((start, end)) => format!("{}-{}", name(start)?, name(end)?),
                None => name(range)?,
            };
            Ok(match step {
                Some(step) => format!("{}/{}", range, step),
                None => range,
            })
        })
        .collect::<Result<Vec<_>, String>>()
        .map(|parts| parts.join(","))
}

/// A cron expression evaluated at minute granularity.
///
/// Accepts the classic 5-field form (`min hour dom month dow`) and the
/// 6-field form with a leading seconds field used by the job runner.
/// Day-of-week accepts 0-7 where both 0 and 7 are Sunday, or names.
#[derive(Debug, Clone)]
pub struct CronExpr {
    source: String,
    normalized: String,
    schedule: Schedule,
}

impl CronExpr {
    pub fn parse(expression: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidSchedule {
            value: expression.to_string(),
            reason,
        };

        let normalized = normalize_cron(expression).map_err(invalid)?;
        let schedule = Schedule::from_str(&normalized).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            source: expression.trim().to_string(),
            normalized,
            schedule,
        })
    }

    /// True when the schedule has a fire time inside `now`'s minute
    pub fn matches(&self, now: &DateTime<Tz>) -> bool {
        let minute = truncate_to_minute(*now);
        self.schedule
            .after(&(minute - Duration::seconds(1)))
            .next()
            .is_some_and(|next| next < minute + Duration::minutes(1))
    }

    /// 6-field rendering for the job runner
    pub fn job_schedule(&self) -> String {
        self.normalized.clone()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for CronExpr {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for CronExpr {}

impl FromStr for CronExpr {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for CronExpr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for CronExpr {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CronExpr::parse(&raw).map_err(serde::de::Error::custom)
    }
}
