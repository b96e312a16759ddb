//! Time-match logic shared by every recurring job
//!
//! This module answers a single question, "does trigger T fire at instant
//! now?", for the three trigger kinds the scheduler knows about:
//!
//! - **Fixed**: cron expression (`20 8 * * *`), used for digests, the weekly
//!   report and coursework sync
//! - **Weekly**: weekday + `HH:MM`, used by reminders
//! - **Offset**: weekday + `HH:MM` + minutes, used by class schedules
//!
//! All evaluation happens at minute granularity in the configured timezone.
//! The predicates are pure; callers own the clock.

pub mod clock;
pub mod cron;

pub use clock::{parse_weekday, OffsetSlot, TimeOfDay, Trigger, WeeklySlot};
pub use cron::CronExpr;

use chrono::{DateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Current instant in `tz`, truncated to the minute
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    truncate_to_minute(Utc::now().with_timezone(&tz))
}

pub fn truncate_to_minute<Z: TimeZone>(instant: DateTime<Z>) -> DateTime<Z> {
    instant
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(instant)
}

/// True when `earlier` falls in the same wall-clock minute as `now`
pub fn same_minute(earlier: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    earlier.is_some_and(|t| truncate_to_minute(t) == truncate_to_minute(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_same_minute_ignores_seconds() {
        let minute = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let late = minute + Duration::milliseconds(59_999);

        assert_eq!(truncate_to_minute(late), minute);
        assert!(same_minute(Some(minute), late));
        assert!(!same_minute(Some(minute), minute + Duration::minutes(1)));
        assert!(!same_minute(None, minute));
    }
}
