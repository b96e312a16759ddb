//! Mock webhook server for testing notification delivery
//!
//! This simulates the endpoint notifications are POSTed to, allowing tests
//! to inspect the delivered envelopes.

use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub struct MockWebhookServer {
    pub server: MockServer,
}

impl MockWebhookServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Mock successful webhook delivery
    pub async fn mock_success(&self) {
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.server)
            .await;
    }

    /// Mock webhook failure
    pub async fn mock_failure(&self, status_code: u16) {
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(status_code))
            .mount(&self.server)
            .await;
    }

    /// Bodies of every request received so far
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|req| req.body_json::<Value>().ok())
            .collect()
    }

    pub fn webhook_url(&self) -> String {
        format!("{}/webhook", self.server.uri())
    }
}
