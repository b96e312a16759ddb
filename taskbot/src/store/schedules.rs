// File: taskbot/src/store/schedules.rs
use chrono::{Utc, Weekday};

use super::{next_id, ClassSchedule, Store};
use crate::errors::StoreError;
use crate::review::ReviewMode;
use crate::trigger::TimeOfDay;

#[derive(Debug, Clone, PartialEq)]
pub struct NewClassSchedule {
    pub weekday: Weekday,
    pub time: TimeOfDay,
    pub subject: String,
    pub content: Option<String>,
    pub instructor: Option<String>,
    pub review_offset_minutes: i32,
    pub review_mode: ReviewMode,
}

impl Store {
    pub async fn add_schedule(&self, new: NewClassSchedule) -> Result<ClassSchedule, StoreError> {
        self.schedules
            .modify(|schedules| {
                let schedule = ClassSchedule {
                    id: next_id(schedules.iter().map(|s| s.id)),
                    weekday: new.weekday,
                    time: new.time,
                    subject: new.subject,
                    content: new.content,
                    instructor: new.instructor,
                    review_offset_minutes: new.review_offset_minutes,
                    review_mode: new.review_mode,
                    created_at: Utc::now(),
                    last_generated_at: None,
                };
                schedules.push(schedule.clone());
                schedule
            })
            .await
    }

    pub async fn list_schedules(&self) -> Result<Vec<ClassSchedule>, StoreError> {
        self.schedules.read().await
    }

    pub async fn schedules_for_day(&self, weekday: Weekday) -> Result<Vec<ClassSchedule>, StoreError> {
        let mut schedules = self.schedules.read().await?;
        schedules.retain(|s| s.weekday == weekday);
        schedules.sort_by_key(|s| s.time);
        Ok(schedules)
    }

    /// Applies `change` to the schedule with `id`. Returns false if absent.
    pub async fn update_schedule(
        &self,
        id: u64,
        change: impl FnOnce(&mut ClassSchedule),
    ) -> Result<bool, StoreError> {
        self.schedules
            .modify(|schedules| match schedules.iter_mut().find(|s| s.id == id) {
                Some(schedule) => {
                    change(schedule);
                    true
                }
                None => false,
            })
            .await
    }

    pub async fn remove_schedule(&self, id: u64) -> Result<bool, StoreError> {
        self.schedules
            .modify(|schedules| {
                let before = schedules.len();
                schedules.retain(|s| s.id != id);
                schedules.len() != before
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_schedule(weekday: Weekday, time: &str, subject: &str) -> NewClassSchedule {
        NewClassSchedule {
            weekday,
            time: TimeOfDay::parse(time).unwrap(),
            subject: subject.to_string(),
            content: None,
            instructor: None,
            review_offset_minutes: 180,
            review_mode: ReviewMode::Normal,
        }
    }

    #[tokio::test]
    async fn test_schedules_by_day_sorted_by_time() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path()).await.unwrap();

        store.add_schedule(new_schedule(Weekday::Mon, "13:00", "Chemistry")).await.unwrap();
        store.add_schedule(new_schedule(Weekday::Mon, "09:00", "Math")).await.unwrap();
        store.add_schedule(new_schedule(Weekday::Wed, "09:00", "History")).await.unwrap();

        let monday: Vec<_> = store
            .schedules_for_day(Weekday::Mon)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.subject)
            .collect();
        assert_eq!(monday, vec!["Math", "Chemistry"]);
    }

    #[tokio::test]
    async fn test_ids_are_unique_after_removal() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path()).await.unwrap();

        let a = store.add_schedule(new_schedule(Weekday::Mon, "09:00", "A")).await.unwrap();
        let b = store.add_schedule(new_schedule(Weekday::Mon, "10:00", "B")).await.unwrap();
        assert!(store.remove_schedule(a.id).await.unwrap());
        let c = store.add_schedule(new_schedule(Weekday::Mon, "11:00", "C")).await.unwrap();

        assert_ne!(c.id, b.id);
        assert!(c.id > b.id);
    }

    #[tokio::test]
    async fn test_update_schedule_persists() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path()).await.unwrap();
        let schedule = store.add_schedule(new_schedule(Weekday::Tue, "09:00", "Art")).await.unwrap();
        let stamp = Utc::now();

        assert!(store
            .update_schedule(schedule.id, |s| s.last_generated_at = Some(stamp))
            .await
            .unwrap());
        assert!(!store.update_schedule(999, |_| {}).await.unwrap());

        let reopened = Store::new(dir.path()).await.unwrap();
        let stored = reopened.list_schedules().await.unwrap();
        assert_eq!(stored[0].last_generated_at, Some(stamp));
    }
}
