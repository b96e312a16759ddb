//! Store in a temporary directory, removed on drop

use std::sync::Arc;
use tempfile::TempDir;

use taskbot::store::Store;

pub struct TestStore {
    pub store: Arc<Store>,
    pub dir: TempDir,
}

impl TestStore {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = Store::new(dir.path().join("data"))
            .await
            .expect("Failed to create store");
        Self {
            store: Arc::new(store),
            dir,
        }
    }
}
