//! Common test data and constants

use chrono::{DateTime, TimeZone};
use chrono_tz::Asia::Tokyo;
use chrono_tz::Tz;

use taskbot::classroom::{CourseWork, DueDate, DueTime};

/// Instant in Asia/Tokyo
pub fn tokyo(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Tz> {
    Tokyo
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid Tokyo time")
}

/// Published coursework item with an optional due time
pub fn course_work(id: &str, title: &str, due: (i32, u32, u32), time: Option<(u32, u32)>) -> CourseWork {
    CourseWork {
        id: id.to_string(),
        course_id: None,
        title: title.to_string(),
        state: Some("PUBLISHED".to_string()),
        due_date: Some(DueDate {
            year: due.0,
            month: due.1,
            day: due.2,
        }),
        due_time: time.map(|(hours, minutes)| DueTime {
            hours,
            minutes,
            seconds: 0,
        }),
        alternate_link: Some(format!("https://classroom.example.com/{}", id)),
    }
}

/// Project names used by the services under test
pub mod projects {
    pub const REVIEW: &str = "復習タスク";
    pub const CLASSROOM: &str = "Classroom";
}

/// Common course fixtures
pub mod courses {
    pub const MATH_ID: &str = "course-math";
    pub const MATH_NAME: &str = "Mathematics";
    pub const BIO_ID: &str = "course-bio";
    pub const BIO_NAME: &str = "Biology";
}
