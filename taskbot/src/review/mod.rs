//! Spaced-repetition policy and series creation

pub mod intervals;
pub mod series;

pub use intervals::{compute_due_date, resolve_intervals, ReviewMode, ReviewPriority, ReviewStep};
pub use series::{CreatedReview, ReviewSeriesBuilder};
