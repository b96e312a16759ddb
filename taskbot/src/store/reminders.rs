// File: taskbot/src/store/reminders.rs
use chrono::{DateTime, Utc, Weekday};

use super::{next_id, Reminder, ReminderMode, Store};
use crate::errors::StoreError;
use crate::trigger::TimeOfDay;

/// A validated reminder that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewReminder {
    pub weekday: Weekday,
    pub time: TimeOfDay,
    pub content: String,
    pub mode: ReminderMode,
}

impl Store {
    pub async fn add_reminder(&self, new: NewReminder) -> Result<Reminder, StoreError> {
        self.add_reminder_at(new, Utc::now()).await
    }

    pub async fn add_reminder_at(
        &self,
        new: NewReminder,
        created_at: DateTime<Utc>,
    ) -> Result<Reminder, StoreError> {
        self.reminders
            .modify(|reminders| {
                let reminder = Reminder {
                    id: next_id(reminders.iter().map(|r| r.id)),
                    weekday: new.weekday,
                    time: new.time,
                    content: new.content,
                    mode: new.mode,
                    last_fired_at: None,
                    created_at,
                };
                reminders.push(reminder.clone());
                reminder
            })
            .await
    }

    pub async fn list_reminders(&self) -> Result<Vec<Reminder>, StoreError> {
        self.reminders.read().await
    }

    pub async fn reminders_for_day(&self, weekday: Weekday) -> Result<Vec<Reminder>, StoreError> {
        let mut reminders = self.reminders.read().await?;
        reminders.retain(|r| r.weekday == weekday);
        Ok(reminders)
    }

    pub async fn get_reminder(&self, id: u64) -> Result<Option<Reminder>, StoreError> {
        Ok(self.reminders.read().await?.into_iter().find(|r| r.id == id))
    }

    /// Applies `change` to the reminder with `id`. Returns false if absent.
    pub async fn update_reminder(
        &self,
        id: u64,
        change: impl FnOnce(&mut Reminder),
    ) -> Result<bool, StoreError> {
        self.reminders
            .modify(|reminders| match reminders.iter_mut().find(|r| r.id == id) {
                Some(reminder) => {
                    change(reminder);
                    true
                }
                None => false,
            })
            .await
    }

    pub async fn remove_reminder(&self, id: u64) -> Result<bool, StoreError> {
        self.reminders
            .modify(|reminders| {
                let before = reminders.len();
                reminders.retain(|r| r.id != id);
                reminders.len() != before
            })
            .await
    }
}
