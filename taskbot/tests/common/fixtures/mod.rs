//! This module provides reusable test utilities:
//! - In-memory task tracker with failure injection
//! - Fake coursework provider
//! - Collecting notification sink
//! - Mock webhook server
//! - Temporary stores and common test data

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod collecting_notifier;
pub mod fake_classroom;
pub mod fake_tracker;
pub mod mock_webhook;
pub mod test_data;
pub mod test_store;

// Re-export commonly used items
pub use collecting_notifier::CollectingNotifier;
pub use fake_classroom::FakeClassroom;
pub use fake_tracker::FakeTracker;
pub use mock_webhook::MockWebhookServer;
pub use test_data::*;
pub use test_store::TestStore;
