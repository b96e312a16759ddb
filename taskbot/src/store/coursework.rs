// File: taskbot/src/store/coursework.rs
use super::{Store, SyncedCourseworkRecord};
use crate::errors::StoreError;

impl Store {
    pub async fn list_synced_coursework(&self) -> Result<Vec<SyncedCourseworkRecord>, StoreError> {
        self.coursework.read().await
    }

    pub async fn get_synced_coursework(
        &self,
        key: &str,
    ) -> Result<Option<SyncedCourseworkRecord>, StoreError> {
        Ok(self
            .coursework
            .read()
            .await?
            .into_iter()
            .find(|r| r.key == key))
    }

    /// Inserts the record or replaces the one with the same key
    pub async fn upsert_synced_coursework(
        &self,
        record: SyncedCourseworkRecord,
    ) -> Result<(), StoreError> {
        self.coursework
            .modify(|records| match records.iter_mut().find(|r| r.key == record.key) {
                Some(existing) => *existing = record,
                None => records.push(record),
            })
            .await
    }

    pub async fn remove_synced_coursework(&self, key: &str) -> Result<bool, StoreError> {
        self.coursework
            .modify(|records| {
                let before = records.len();
                records.retain(|r| r.key != key);
                records.len() != before
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(key: &str, due_key: &str) -> SyncedCourseworkRecord {
        SyncedCourseworkRecord {
            key: key.to_string(),
            task_id: format!("task-{}", key),
            due_key: due_key.to_string(),
            content: "[Math] Essay".to_string(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_key() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path()).await.unwrap();

        store.upsert_synced_coursework(record("c:1", "2024-05-10")).await.unwrap();
        store.upsert_synced_coursework(record("c:1", "2024-05-12")).await.unwrap();
        store.upsert_synced_coursework(record("c:2", "2024-05-11")).await.unwrap();

        let all = store.list_synced_coursework().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(
            store.get_synced_coursework("c:1").await.unwrap().unwrap().due_key,
            "2024-05-12"
        );

        assert!(store.remove_synced_coursework("c:1").await.unwrap());
        assert!(store.get_synced_coursework("c:1").await.unwrap().is_none());
    }
}
