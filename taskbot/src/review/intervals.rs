// File: taskbot/src/review/intervals.rs
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::review::{MASTERY_INTERVALS, NORMAL_INTERVALS};

/// Spaced-repetition mode. Unknown names fall back to `Normal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ReviewMode {
    #[default]
    Normal,
    Mastery,
}

impl ReviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewMode::Normal => "normal",
            ReviewMode::Mastery => "mastery",
        }
    }

    pub fn day_offsets(&self) -> &'static [u32] {
        match self {
            ReviewMode::Normal => &NORMAL_INTERVALS,
            ReviewMode::Mastery => &MASTERY_INTERVALS,
        }
    }

    pub fn occurrences(&self) -> usize {
        self.day_offsets().len()
    }

    /// Human-readable span covered by the series
    pub fn span_label(&self) -> &'static str {
        match self {
            ReviewMode::Normal => "1 month",
            ReviewMode::Mastery => "6 months",
        }
    }
}

impl From<&str> for ReviewMode {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "mastery" => ReviewMode::Mastery,
            _ => ReviewMode::Normal,
        }
    }
}

impl From<String> for ReviewMode {
    fn from(value: String) -> Self {
        ReviewMode::from(value.as_str())
    }
}

impl FromStr for ReviewMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ReviewMode::from(s))
    }
}

impl fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of one occurrence in a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewPriority {
    Normal,
    Medium,
    High,
}

impl ReviewPriority {
    /// 1st occurrence is high, 2nd medium, the rest normal
    pub fn for_position(index: usize) -> Self {
        match index {
            0 => ReviewPriority::High,
            1 => ReviewPriority::Medium,
            _ => ReviewPriority::Normal,
        }
    }

    /// Todoist priority, where 4 is the most urgent
    pub fn todoist_value(&self) -> u8 {
        match self {
            ReviewPriority::High => 4,
            ReviewPriority::Medium => 3,
            ReviewPriority::Normal => 2,
        }
    }
}

/// One planned occurrence of a review series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewStep {
    /// 1-based occurrence number
    pub occurrence: usize,
    pub day_offset: u32,
    pub priority: ReviewPriority,
}

pub fn resolve_intervals(mode: ReviewMode) -> Vec<ReviewStep> {
    mode.day_offsets()
        .iter()
        .enumerate()
        .map(|(index, &day_offset)| ReviewStep {
            occurrence: index + 1,
            day_offset,
            priority: ReviewPriority::for_position(index),
        })
        .collect()
}

/// Adds whole calendar days to a local date. Time of day is never carried.
pub fn compute_due_date(base: NaiveDate, day_offset: u32) -> NaiveDate {
    base.checked_add_days(Days::new(u64::from(day_offset)))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ReviewMode::Normal, 5, 30)]
    #[case(ReviewMode::Mastery, 8, 180)]
    fn test_intervals_strictly_increasing(
        #[case] mode: ReviewMode,
        #[case] count: usize,
        #[case] last: u32,
    ) {
        let steps = resolve_intervals(mode);
        assert_eq!(steps.len(), count);
        assert_eq!(steps.last().unwrap().day_offset, last);
        assert!(steps.windows(2).all(|w| w[0].day_offset < w[1].day_offset));
        assert!(steps.iter().all(|s| s.day_offset > 0));
    }

    #[rstest]
    #[case(ReviewMode::Normal)]
    #[case(ReviewMode::Mastery)]
    fn test_priorities_decay_by_position(#[case] mode: ReviewMode) {
        let steps = resolve_intervals(mode);
        assert_eq!(steps[0].priority, ReviewPriority::High);
        assert_eq!(steps[1].priority, ReviewPriority::Medium);
        assert!(steps[2..]
            .iter()
            .all(|s| s.priority == ReviewPriority::Normal));
        assert!(steps.windows(2).all(|w| w[0].priority >= w[1].priority));
    }

    #[test]
    fn test_occurrences_are_one_based() {
        let steps = resolve_intervals(ReviewMode::Normal);
        let numbers: Vec<_> = steps.iter().map(|s| s.occurrence).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unknown_mode_falls_back_to_normal() {
        assert_eq!(ReviewMode::from("weekly"), ReviewMode::Normal);
        assert_eq!(ReviewMode::from(" Mastery "), ReviewMode::Mastery);
        let parsed: ReviewMode = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(parsed, ReviewMode::Normal);
        assert_eq!(
            serde_json::to_string(&ReviewMode::Mastery).unwrap(),
            "\"mastery\""
        );
    }

    #[test]
    fn test_compute_due_date() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            compute_due_date(base, 7),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
        );
        // Same inputs, same answer regardless of call order
        assert_eq!(compute_due_date(base, 30), compute_due_date(base, 30));
        assert_eq!(
            compute_due_date(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(), 1),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_todoist_priority_values() {
        assert_eq!(ReviewPriority::High.todoist_value(), 4);
        assert_eq!(ReviewPriority::Medium.todoist_value(), 3);
        assert_eq!(ReviewPriority::Normal.todoist_value(), 2);
    }
}
