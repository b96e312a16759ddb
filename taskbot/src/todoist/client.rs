// File: taskbot/src/todoist/client.rs
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::{NewTask, Project, Task, TaskPage, TaskTracker, TaskUpdate};
use crate::constants::{http, todoist::PAGE_LIMIT};
use crate::errors::RemoteError;

const SERVICE: &str = "Todoist";

/// Keys under which list endpoints have wrapped their items over API versions
const LIST_KEYS: [&str; 4] = ["results", "items", "tasks", "data"];

pub struct TodoistClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl TodoistClient {
    pub fn new(base_url: &str, api_token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(http::REQUEST_TIMEOUT)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client for Todoist: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<reqwest::Response> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| RemoteError::RequestFailed {
                service: SERVICE.to_string(),
                reason: format!("{}: {}", action, e),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                service: SERVICE.to_string(),
                status,
                body,
            }
            .into());
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> Result<T> {
        let response = self.send(request, action).await?;
        response.json::<T>().await.map_err(|e| {
            anyhow::Error::from(RemoteError::InvalidResponse {
                service: SERVICE.to_string(),
                reason: format!("{}: {}", action, e),
            })
        })
    }
}

/// Splits a list response into items and the next cursor.
///
/// Accepts a bare array or an object wrapping the array under one of
/// [`LIST_KEYS`], with the cursor as `next_cursor` or `nextCursor`.
fn normalize_list(body: Value) -> Result<(Vec<Value>, Option<String>), RemoteError> {
    match body {
        Value::Array(items) => Ok((items, None)),
        Value::Object(mut map) => {
            let cursor = ["next_cursor", "nextCursor"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .filter(|c| !c.is_empty())
                .map(str::to_string);

            let items = LIST_KEYS
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                })
                .unwrap_or_default();

            Ok((items, cursor))
        }
        other => Err(RemoteError::InvalidResponse {
            service: SERVICE.to_string(),
            reason: format!("expected a list, got {}", other),
        }),
    }
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Result<Vec<T>> {
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| {
                anyhow::Error::from(RemoteError::InvalidResponse {
                    service: SERVICE.to_string(),
                    reason: e.to_string(),
                })
            })
        })
        .collect()
}

#[async_trait]
impl TaskTracker for TodoistClient {
    async fn list_tasks(&self, limit: u32, cursor: Option<&str>) -> Result<TaskPage> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let body: Value = self
            .send_json(self.client.get(self.url("/tasks")).query(&query), "list tasks")
            .await?;
        let (items, next_cursor) = normalize_list(body)?;
        debug!("Fetched {} tasks (more: {})", items.len(), next_cursor.is_some());

        Ok(TaskPage {
            items: decode_items(items)?,
            next_cursor,
        })
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task> {
        self.send_json(
            self.client.post(self.url("/tasks")).json(task),
            "create task",
        )
        .await
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<()> {
        self.send(
            self.client
                .post(self.url(&format!("/tasks/{}", task_id)))
                .json(update),
            "update task",
        )
        .await?;
        Ok(())
    }

    async fn close_task(&self, task_id: &str) -> Result<()> {
        self.send(
            self.client
                .post(self.url(&format!("/tasks/{}/close", task_id))),
            "close task",
        )
        .await?;
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let mut projects = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("limit", PAGE_LIMIT.to_string())];
            if let Some(cursor) = &cursor {
                query.push(("cursor", cursor.clone()));
            }

            let body: Value = self
                .send_json(
                    self.client.get(self.url("/projects")).query(&query),
                    "list projects",
                )
                .await?;
            let (items, next) = normalize_list(body)?;
            projects.extend(decode_items::<Project>(items)?);

            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(projects)
    }

    async fn create_project(&self, name: &str) -> Result<Project> {
        self.send_json(
            self.client
                .post(self.url("/projects"))
                .json(&json!({ "name": name })),
            "create project",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bare_array() {
        let (items, cursor) = normalize_list(json!([{"id": "1"}])).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(cursor, None);
    }

    #[test]
    fn test_normalize_wrapped_variants() {
        for key in LIST_KEYS {
            let mut body = serde_json::Map::new();
            body.insert(key.to_string(), json!([{"id": "1"}, {"id": "2"}]));
            body.insert("next_cursor".to_string(), json!("abc"));

            let (items, cursor) = normalize_list(Value::Object(body)).unwrap();
            assert_eq!(items.len(), 2, "key {}", key);
            assert_eq!(cursor.as_deref(), Some("abc"));
        }

        let (_, cursor) = normalize_list(json!({"results": [], "nextCursor": "xyz"})).unwrap();
        assert_eq!(cursor.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_normalize_treats_empty_cursor_as_end() {
        let (_, cursor) = normalize_list(json!({"results": [], "next_cursor": ""})).unwrap();
        assert_eq!(cursor, None);
        let (_, cursor) = normalize_list(json!({"results": [], "next_cursor": null})).unwrap();
        assert_eq!(cursor, None);
    }

    #[test]
    fn test_normalize_rejects_scalars() {
        assert!(normalize_list(json!("nope")).is_err());
    }
}
