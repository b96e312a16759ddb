//! Central repository for timeouts, intervals, labels and defaults
//!
//! Constants are grouped by the component that consumes them so the
//! remote-call tuning, the review policy and the configuration defaults
//! each have a single source of truth.

use std::time::Duration;

/// HTTP client timeout constants
pub mod http {
    use super::Duration;

    /// Default timeout for requests against the task tracker and coursework provider
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Webhook request timeout for notifications
    pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Spaced-repetition policy
pub mod review {
    /// Day offsets for the normal mode (five reviews over one month)
    pub const NORMAL_INTERVALS: [u32; 5] = [1, 3, 7, 14, 30];

    /// Day offsets for the mastery mode (eight reviews over six months)
    pub const MASTERY_INTERVALS: [u32; 8] = [1, 3, 7, 14, 30, 60, 90, 180];

    /// Minutes after class start when the review series is generated
    pub const DEFAULT_OFFSET_MINUTES: i32 = 180;
}

/// Todoist API constants
pub mod todoist {
    use super::Duration;

    pub const DEFAULT_API_BASE_URL: &str = "https://api.todoist.com/api/v1";

    /// Page size used when draining the task list
    pub const PAGE_LIMIT: u32 = 50;

    /// Delay inserted between page requests
    pub const PAGE_DELAY: Duration = Duration::from_millis(200);

    /// Tasks older than this are left out of digests
    pub const DIGEST_LOOKBACK_DAYS: i64 = 30;
}

/// Google Classroom constants
pub mod classroom {
    pub const DEFAULT_API_BASE_URL: &str = "https://classroom.googleapis.com/v1";
    pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

    pub const PAGE_SIZE: u32 = 100;

    /// Due time assumed when coursework only carries a date
    pub const DEFAULT_DUE_HOUR: u32 = 23;
    pub const DEFAULT_DUE_MINUTE: u32 = 59;

    /// Upper bound for the coursework due-date window
    pub const MAX_DUE_WITHIN_DAYS: i64 = 3650;

    /// Seconds shaved off an access token's lifetime before it is refreshed
    pub const TOKEN_EXPIRY_MARGIN_SECONDS: i64 = 60;

    /// Read-only scopes requested for service-account tokens
    pub const SCOPES: [&str; 2] = [
        "https://www.googleapis.com/auth/classroom.courses.readonly",
        "https://www.googleapis.com/auth/classroom.coursework.me.readonly",
    ];

    pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

    /// Lifetime of a signed service-account assertion
    pub const ASSERTION_LIFETIME_SECONDS: i64 = 3600;
}

/// Reminder lifecycle constants
pub mod reminders {
    /// Days a bounded reminder stays alive after its first fire
    pub const BOUNDED_LIFETIME_DAYS: i64 = 7;
}

/// Task labels applied to generated tasks
pub mod labels {
    pub const REVIEW: &str = "復習";
    pub const CLASSROOM: &str = "Classroom";
    pub const REMINDER: &str = "リマインダー";
}

/// Default configuration values
pub mod defaults {
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 8095;
    pub const DATA_DIR: &str = "data";
    pub const REVIEW_PROJECT: &str = "復習タスク";
    pub const CLASSROOM_PROJECT: &str = "Classroom";
    pub const DUE_WITHIN_DAYS: i64 = 7;
    pub const CLASSROOM_SYNC_SCHEDULE: &str = "0 7 * * *";
    pub const WEEKLY_REPORT_SCHEDULE: &str = "0 20 * * 0";

    /// Per-minute tick that drives reminders and class schedules
    pub const MINUTE_TICK_SCHEDULE: &str = "0 * * * * *";
}
