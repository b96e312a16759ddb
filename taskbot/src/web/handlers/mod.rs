//! HTTP request handlers for the operator API.
//!
//! This module is organized by domain:
//! - `common` - Shared response types and error mapping
//! - `classroom` - Coursework sync and tracked coursework
//! - `health` - Liveness endpoint
//! - `reminders` - Weekly reminder CRUD
//! - `schedules` - Class schedule CRUD
//! - `tasks` - Today's tasks, closing tasks and manual review series

pub mod classroom;
pub mod common;
pub mod health;
pub mod reminders;
pub mod schedules;
pub mod tasks;

pub use classroom::*;
pub use health::*;
pub use reminders::*;
pub use schedules::*;
pub use tasks::*;
