//! In-memory task tracker
//!
//! Keeps tasks and projects in memory, records every write and can be told
//! to fail specific create calls.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::Mutex;

use taskbot::todoist::{DuePayload, NewTask, Project, Task, TaskDue, TaskPage, TaskTracker, TaskUpdate};

#[derive(Default)]
struct TrackerState {
    tasks: Vec<Task>,
    projects: Vec<Project>,
    created: Vec<NewTask>,
    updates: Vec<(String, TaskUpdate)>,
    closed: Vec<String>,
    create_calls: usize,
    failing_creates: HashSet<usize>,
    next_id: u64,
}

#[derive(Default)]
pub struct FakeTracker {
    state: Mutex<TrackerState>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `call`-th create request (1-based) fail
    pub async fn fail_create_call(&self, call: usize) {
        self.state.lock().await.failing_creates.insert(call);
    }

    /// Makes every create request fail
    pub async fn fail_all_creates(&self) {
        self.state.lock().await.failing_creates.extend(1..=1000);
    }

    pub async fn seed_task(&self, task: Task) {
        self.state.lock().await.tasks.push(task);
    }

    pub async fn seed_project(&self, id: &str, name: &str) {
        self.state.lock().await.projects.push(Project {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    pub async fn created(&self) -> Vec<NewTask> {
        self.state.lock().await.created.clone()
    }

    pub async fn updates(&self) -> Vec<(String, TaskUpdate)> {
        self.state.lock().await.updates.clone()
    }

    pub async fn closed(&self) -> Vec<String> {
        self.state.lock().await.closed.clone()
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.state.lock().await.projects.clone()
    }

    pub async fn open_tasks(&self) -> Vec<Task> {
        self.state
            .lock()
            .await
            .tasks
            .iter()
            .filter(|t| !t.is_completed)
            .cloned()
            .collect()
    }

    pub async fn task(&self, id: &str) -> Option<Task> {
        self.state.lock().await.tasks.iter().find(|t| t.id == id).cloned()
    }
}

fn task_due(payload: &DuePayload) -> TaskDue {
    match payload {
        DuePayload::Date { due_date } => TaskDue {
            date: due_date.clone(),
            datetime: None,
            timezone: None,
            string: None,
        },
        DuePayload::DateTime {
            due_datetime,
            due_timezone,
        } => TaskDue {
            date: due_datetime.chars().take(10).collect(),
            datetime: Some(due_datetime.clone()),
            timezone: Some(due_timezone.clone()),
            string: None,
        },
    }
}

#[async_trait]
impl TaskTracker for FakeTracker {
    async fn list_tasks(&self, limit: u32, cursor: Option<&str>) -> Result<TaskPage> {
        let state = self.state.lock().await;
        let open: Vec<&Task> = state.tasks.iter().filter(|t| !t.is_completed).collect();
        let start: usize = cursor.map(|c| c.parse()).transpose()?.unwrap_or(0);
        let end = (start + limit as usize).min(open.len());

        Ok(TaskPage {
            items: open[start.min(end)..end].iter().map(|t| (*t).clone()).collect(),
            next_cursor: (end < open.len()).then(|| end.to_string()),
        })
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task> {
        let mut state = self.state.lock().await;
        state.create_calls += 1;
        if state.failing_creates.contains(&state.create_calls) {
            return Err(anyhow!("injected failure on create call {}", state.create_calls));
        }

        state.next_id += 1;
        let created = Task {
            id: format!("task-{}", state.next_id),
            content: task.content.clone(),
            description: task.description.clone().unwrap_or_default(),
            due: task.due.as_ref().map(task_due),
            priority: task.priority.unwrap_or(1),
            labels: task.labels.clone(),
            project_id: task.project_id.clone(),
            is_completed: false,
        };
        state.created.push(task.clone());
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<()> {
        let mut state = self.state.lock().await;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| anyhow!("task {} not found", task_id))?;

        if let Some(content) = &update.content {
            task.content = content.clone();
        }
        if let Some(description) = &update.description {
            task.description = description.clone();
        }
        if let Some(due) = &update.due {
            task.due = Some(task_due(due));
        }
        state.updates.push((task_id.to_string(), update.clone()));
        Ok(())
    }

    async fn close_task(&self, task_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| anyhow!("task {} not found", task_id))?;
        task.is_completed = true;
        state.closed.push(task_id.to_string());
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.state.lock().await.projects.clone())
    }

    async fn create_project(&self, name: &str) -> Result<Project> {
        let mut state = self.state.lock().await;
        let project = Project {
            id: format!("project-{}", state.projects.len() + 1),
            name: name.to_string(),
        };
        state.projects.push(project.clone());
        Ok(project)
    }
}
