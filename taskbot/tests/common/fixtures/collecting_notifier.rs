//! Notification sink that keeps everything it receives

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use taskbot::services::{Notification, NotificationSink};

#[derive(Default)]
pub struct CollectingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.received.lock().await.clone()
    }

    pub async fn kinds(&self) -> Vec<&'static str> {
        self.received.lock().await.iter().map(|n| n.kind()).collect()
    }

    pub async fn count(&self) -> usize {
        self.received.lock().await.len()
    }
}

#[async_trait]
impl NotificationSink for CollectingNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        self.received.lock().await.push(notification);
        Ok(())
    }
}
