//! Fake coursework provider backed by in-memory courses

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

use taskbot::classroom::{Course, CourseWork, CourseworkProvider, DueDate, DueTime, Submission};

#[derive(Default)]
struct ClassroomState {
    courses: Vec<Course>,
    work: HashMap<String, Vec<CourseWork>>,
    submissions: HashMap<(String, String), Submission>,
    failing_courses: HashSet<String>,
    list_courses_error: Option<String>,
}

#[derive(Default)]
pub struct FakeClassroom {
    state: Mutex<ClassroomState>,
}

impl FakeClassroom {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_course(&self, id: &str, name: &str) {
        self.state.lock().await.courses.push(Course {
            id: id.to_string(),
            name: name.to_string(),
            course_state: Some("ACTIVE".to_string()),
        });
    }

    pub async fn add_work(&self, course_id: &str, work: CourseWork) {
        self.state
            .lock()
            .await
            .work
            .entry(course_id.to_string())
            .or_default()
            .push(work);
    }

    /// Replaces the due date and time of an existing item
    pub async fn set_due(
        &self,
        course_id: &str,
        work_id: &str,
        due_date: DueDate,
        due_time: Option<DueTime>,
    ) {
        let mut state = self.state.lock().await;
        if let Some(work) = state
            .work
            .get_mut(course_id)
            .and_then(|items| items.iter_mut().find(|w| w.id == work_id))
        {
            work.due_date = Some(due_date);
            work.due_time = due_time;
        }
    }

    pub async fn set_submission_state(&self, course_id: &str, work_id: &str, state: &str) {
        self.state.lock().await.submissions.insert(
            (course_id.to_string(), work_id.to_string()),
            Submission {
                id: Some(format!("sub-{}", work_id)),
                state: Some(state.to_string()),
            },
        );
    }

    /// Listing coursework for `course_id` fails from now on
    pub async fn fail_course(&self, course_id: &str) {
        self.state
            .lock()
            .await
            .failing_courses
            .insert(course_id.to_string());
    }

    pub async fn fail_list_courses(&self, reason: &str) {
        self.state.lock().await.list_courses_error = Some(reason.to_string());
    }
}

#[async_trait]
impl CourseworkProvider for FakeClassroom {
    async fn list_courses(&self) -> Result<Vec<Course>> {
        let state = self.state.lock().await;
        if let Some(reason) = &state.list_courses_error {
            return Err(anyhow!("{}", reason));
        }
        Ok(state.courses.clone())
    }

    async fn list_course_work(&self, course_id: &str) -> Result<Vec<CourseWork>> {
        let state = self.state.lock().await;
        if state.failing_courses.contains(course_id) {
            return Err(anyhow!("coursework listing failed for {}", course_id));
        }
        Ok(state.work.get(course_id).cloned().unwrap_or_default())
    }

    async fn get_my_submission(
        &self,
        course_id: &str,
        course_work_id: &str,
    ) -> Result<Option<Submission>> {
        Ok(self
            .state
            .lock()
            .await
            .submissions
            .get(&(course_id.to_string(), course_work_id.to_string()))
            .cloned())
    }
}
