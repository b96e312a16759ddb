//! Integration tests for the Todoist client against a mock API

use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use wiremock::{
    matchers::{body_partial_json, header, method, path, query_param, query_param_is_missing},
    Mock, MockServer, ResponseTemplate,
};

use taskbot::errors::RemoteError;
use taskbot::review::ReviewPriority;
use taskbot::services::TaskService;
use taskbot::todoist::{TaskTracker, TodoistClient};

const TOKEN: &str = "test-token";

fn client(server: &MockServer) -> TodoistClient {
    TodoistClient::new(&server.uri(), TOKEN).unwrap()
}

fn task_json(id: &str, due: &str, priority: u8) -> serde_json::Value {
    json!({
        "id": id,
        "content": format!("task {}", id),
        "priority": priority,
        "due": {"date": due, "string": due},
        "labels": [],
        "checked": false
    })
}

#[tokio::test]
async fn test_task_pages_follow_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param_is_missing("cursor"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [task_json("1", "2024-05-10", 4), task_json("2", "2024-05-09", 1)],
            "next_cursor": "page-2"
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("cursor", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [task_json("3", "2024-05-10", 2)],
            "next_cursor": null
        })))
        .expect(2)
        .mount(&server)
        .await;

    let service = TaskService::new(Arc::new(client(&server)), chrono_tz::Asia::Tokyo);
    let tasks = service.all_tasks().await.unwrap();
    assert_eq!(
        tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        vec!["1", "2", "3"]
    );

    let digest = service
        .digest(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
        .await
        .unwrap();
    assert_eq!(
        digest.today.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        vec!["1", "3"]
    );
    assert_eq!(digest.overdue.len(), 1);
}

#[tokio::test]
async fn test_bare_array_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([task_json("9", "2024-05-10", 1)])),
        )
        .mount(&server)
        .await;

    let page = client(&server).list_tasks(50, None).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_review_task_created_in_resolved_project() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "p-1", "name": "Inbox"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/projects"))
        .and(body_partial_json(json!({"name": "復習タスク"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "p-2", "name": "復習タスク"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_partial_json(json!({
            "content": "Calculus (1回目の復習)",
            "project_id": "p-2",
            "due_date": "2024-05-11",
            "priority": 4,
            "labels": ["復習"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("t-1", "2024-05-11", 4)))
        .expect(2)
        .mount(&server)
        .await;

    let service = TaskService::new(Arc::new(client(&server)), chrono_tz::Asia::Tokyo);
    let due = NaiveDate::from_ymd_opt(2024, 5, 11).unwrap();

    for _ in 0..2 {
        let task = service
            .create_review_task("Calculus (1回目の復習)", due, ReviewPriority::High, "復習タスク")
            .await
            .unwrap();
        assert_eq!(task.id, "t-1");
    }
}

#[tokio::test]
async fn test_close_and_update_paths() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/t-7/close"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/tasks/t-7"))
        .and(body_partial_json(json!({
            "due_datetime": "2024-05-13T09:30:00",
            "due_timezone": "Asia/Tokyo"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("t-7", "2024-05-13", 1)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client
        .update_task(
            "t-7",
            &taskbot::todoist::TaskUpdate {
                content: None,
                description: None,
                due: Some(taskbot::todoist::DuePayload::DateTime {
                    due_datetime: "2024-05-13T09:30:00".to_string(),
                    due_timezone: "Asia/Tokyo".to_string(),
                }),
            },
        )
        .await
        .unwrap();
    client.close_task("t-7").await.unwrap();
}

#[tokio::test]
async fn test_error_status_is_a_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks/missing/close"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Task not found"))
        .mount(&server)
        .await;

    let err = client(&server).close_task("missing").await.unwrap_err();
    match err.downcast_ref::<RemoteError>() {
        Some(RemoteError::Status { status, body, .. }) => {
            assert_eq!(*status, 404);
            assert_eq!(body, "Task not found");
        }
        other => panic!("unexpected error {:?}", other),
    }
}
