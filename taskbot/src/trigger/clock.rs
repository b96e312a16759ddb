// File: taskbot/src/trigger/clock.rs
use chrono::{DateTime, Datelike, Timelike, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::cron::CronExpr;
use crate::errors::ValidationError;

const MINUTES_PER_DAY: i32 = 24 * 60;

/// Wall-clock time of day at minute precision, serialized as `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::TimeOutOfRange {
                value: format!("{}:{:02}", hour, minute),
            });
        }
        Ok(Self { hour, minute })
    }

    /// Parses `H:MM` or `HH:MM`
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let format_error = || ValidationError::InvalidTimeFormat {
            value: value.to_string(),
        };

        let (hours, minutes) = value.split_once(':').ok_or_else(format_error)?;
        let well_formed = (1..=2).contains(&hours.len())
            && minutes.len() == 2
            && hours.chars().all(|c| c.is_ascii_digit())
            && minutes.chars().all(|c| c.is_ascii_digit());
        if !well_formed {
            return Err(format_error());
        }

        let hour: u8 = hours.parse().map_err(|_| format_error())?;
        let minute: u8 = minutes.parse().map_err(|_| format_error())?;
        if hour > 23 || minute > 59 {
            return Err(ValidationError::TimeOutOfRange {
                value: value.to_string(),
            });
        }

        Ok(Self { hour, minute })
    }

    pub fn of<T: Timelike>(instant: &T) -> Self {
        Self {
            hour: instant.hour() as u8,
            minute: instant.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn minutes_since_midnight(&self) -> i32 {
        i32::from(self.hour) * 60 + i32::from(self.minute)
    }

    /// Adds minutes modulo 24h; the day component is discarded
    pub fn wrapping_add_minutes(&self, minutes: i32) -> Self {
        let total = (self.minutes_since_midnight() + minutes).rem_euclid(MINUTES_PER_DAY);
        Self {
            hour: (total / 60) as u8,
            minute: (total % 60) as u8,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Parses English and Japanese weekday names (`mon`, `Monday`, `月`, `月曜日`)
pub fn parse_weekday(value: &str) -> Result<Weekday, ValidationError> {
    let trimmed = value.trim();
    let japanese = match trimmed.trim_end_matches("曜日").trim_end_matches('曜') {
        "月" => Some(Weekday::Mon),
        "火" => Some(Weekday::Tue),
        "水" => Some(Weekday::Wed),
        "木" => Some(Weekday::Thu),
        "金" => Some(Weekday::Fri),
        "土" => Some(Weekday::Sat),
        "日" => Some(Weekday::Sun),
        _ => None,
    };

    japanese
        .or_else(|| trimmed.parse::<Weekday>().ok())
        .ok_or_else(|| ValidationError::InvalidWeekday {
            value: value.to_string(),
        })
}

/// Fires once a week at a weekday and minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySlot {
    pub weekday: Weekday,
    pub time: TimeOfDay,
}

impl WeeklySlot {
    pub fn new(weekday: Weekday, time: TimeOfDay) -> Self {
        Self { weekday, time }
    }

    pub fn matches(&self, now: &DateTime<Tz>) -> bool {
        now.weekday() == self.weekday && TimeOfDay::of(now) == self.time
    }
}

/// A weekly slot shifted by a number of minutes.
///
/// The shifted time wraps at midnight but keeps the slot's weekday, so a
/// 23:00 slot with a 120 minute offset matches 01:00 on the *same* weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetSlot {
    pub weekday: Weekday,
    pub base_time: TimeOfDay,
    pub offset_minutes: i32,
}

impl OffsetSlot {
    pub fn new(weekday: Weekday, base_time: TimeOfDay, offset_minutes: i32) -> Self {
        Self {
            weekday,
            base_time,
            offset_minutes,
        }
    }

    pub fn effective_time(&self) -> TimeOfDay {
        self.base_time.wrapping_add_minutes(self.offset_minutes)
    }

    pub fn matches(&self, now: &DateTime<Tz>) -> bool {
        WeeklySlot::new(self.weekday, self.effective_time()).matches(now)
    }
}

/// Every kind of time-based trigger the scheduler evaluates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Fixed(CronExpr),
    Weekly(WeeklySlot),
    Offset(OffsetSlot),
}

impl Trigger {
    pub fn matches(&self, now: &DateTime<Tz>) -> bool {
        match self {
            Trigger::Fixed(expr) => expr.matches(now),
            Trigger::Weekly(slot) => slot.matches(now),
            Trigger::Offset(slot) => slot.matches(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::Asia::Tokyo;
    use test_case::test_case;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Tokyo.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test_case("9:05", 9, 5)]
    #[test_case("09:05", 9, 5)]
    #[test_case("23:59", 23, 59)]
    #[test_case("00:00", 0, 0)]
    fn test_parse_valid_times(input: &str, hour: u8, minute: u8) {
        let time = TimeOfDay::parse(input).unwrap();
        assert_eq!((time.hour(), time.minute()), (hour, minute));
    }

    #[test_case("24:00" ; "hour too large")]
    #[test_case("12:60" ; "minute too large")]
    fn test_parse_out_of_range(input: &str) {
        assert!(matches!(
            TimeOfDay::parse(input),
            Err(ValidationError::TimeOutOfRange { .. })
        ));
    }

    #[test_case("1200")]
    #[test_case("12:5")]
    #[test_case("123:00")]
    #[test_case("ab:cd")]
    #[test_case("")]
    fn test_parse_malformed(input: &str) {
        assert!(matches!(
            TimeOfDay::parse(input),
            Err(ValidationError::InvalidTimeFormat { .. })
        ));
    }

    #[test]
    fn test_time_serializes_as_string() {
        let time = TimeOfDay::parse("7:30").unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"07:30\"");
        let back: TimeOfDay = serde_json::from_str("\"07:30\"").unwrap();
        assert_eq!(back, time);
        assert!(serde_json::from_str::<TimeOfDay>("\"7:3\"").is_err());
    }

    #[test_case("月", Weekday::Mon)]
    #[test_case("水曜日", Weekday::Wed)]
    #[test_case("sun", Weekday::Sun)]
    #[test_case("Friday", Weekday::Fri)]
    fn test_parse_weekday(input: &str, expected: Weekday) {
        assert_eq!(parse_weekday(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_weekday_rejects_unknown() {
        assert!(parse_weekday("someday").is_err());
    }

    #[test]
    fn test_weekly_slot_matches_exactly_one_minute_per_week() {
        // 2024-01-03 is a Wednesday
        let slot = WeeklySlot::new(Weekday::Wed, TimeOfDay::parse("20:00").unwrap());
        let start = at(2024, 1, 1, 0, 0);

        let matching: Vec<_> = (0..7 * 24 * 60)
            .map(|m| start + Duration::minutes(m))
            .filter(|now| slot.matches(now))
            .collect();

        assert_eq!(matching, vec![at(2024, 1, 3, 20, 0)]);
    }

    #[test]
    fn test_weekly_slot_ignores_seconds() {
        let slot = WeeklySlot::new(Weekday::Wed, TimeOfDay::parse("20:00").unwrap());
        let now = Tokyo.with_ymd_and_hms(2024, 1, 3, 20, 0, 42).unwrap();
        assert!(slot.matches(&now));
    }

    #[test]
    fn test_offset_slot_shifts_time() {
        let slot = OffsetSlot::new(Weekday::Mon, TimeOfDay::parse("18:00").unwrap(), 180);
        assert_eq!(slot.effective_time().to_string(), "21:00");
        assert!(slot.matches(&at(2024, 1, 1, 21, 0)));
        assert!(!slot.matches(&at(2024, 1, 1, 18, 0)));
    }

    #[test]
    fn test_offset_slot_wraps_past_midnight_without_advancing_weekday() {
        // Monday 23:00 + 2h lands on 01:00 but stays on Monday; the real
        // instant (Tuesday 01:00) does not match.
        let slot = OffsetSlot::new(Weekday::Mon, TimeOfDay::parse("23:00").unwrap(), 120);
        assert_eq!(slot.effective_time().to_string(), "01:00");
        assert!(slot.matches(&at(2024, 1, 1, 1, 0)));
        assert!(!slot.matches(&at(2024, 1, 2, 1, 0)));
    }

    #[test]
    fn test_trigger_dispatches_each_kind() {
        let now = at(2024, 1, 1, 8, 20);
        let fixed = Trigger::Fixed(CronExpr::parse("20 8 * * *").unwrap());
        let weekly = Trigger::Weekly(WeeklySlot::new(
            Weekday::Mon,
            TimeOfDay::parse("08:20").unwrap(),
        ));
        let offset = Trigger::Offset(OffsetSlot::new(
            Weekday::Mon,
            TimeOfDay::parse("08:00").unwrap(),
            20,
        ));

        assert!(fixed.matches(&now));
        assert!(weekly.matches(&now));
        assert!(offset.matches(&now));
        assert!(!weekly.matches(&(now + Duration::minutes(1))));
    }
}
