// File: taskbot/src/classroom/client.rs
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::auth::{ClassroomCredentials, TokenSource};
use super::{Course, CourseWork, CourseworkProvider, Submission};
use crate::constants::{classroom::PAGE_SIZE, http};
use crate::errors::{ConfigError, RemoteError};

const SERVICE: &str = "Google Classroom";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoursesPage {
    #[serde(default)]
    courses: Vec<Course>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseWorkPage {
    #[serde(default)]
    course_work: Vec<CourseWork>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionsPage {
    #[serde(default)]
    student_submissions: Vec<Submission>,
    #[serde(default)]
    next_page_token: Option<String>,
}

pub struct GoogleClassroomClient {
    client: Client,
    base_url: String,
    tokens: TokenSource,
}

impl GoogleClassroomClient {
    pub fn new(
        base_url: &str,
        token_url: &str,
        credentials: Result<ClassroomCredentials, ConfigError>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(http::REQUEST_TIMEOUT)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client for Classroom: {}", e))?;

        Ok(Self {
            tokens: TokenSource::new(client.clone(), token_url, credentials),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| RemoteError::RequestFailed {
                service: SERVICE.to_string(),
                reason: format!("GET {}: {}", path, e),
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

        response.json::<T>().await.map_err(|e| {
            anyhow::Error::from(RemoteError::InvalidResponse {
                service: SERVICE.to_string(),
                reason: format!("GET {}: {}", path, e),
            })
        })
    }
}

fn page_query(page_token: &Option<String>) -> Vec<(&'static str, String)> {
    let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
    if let Some(token) = page_token {
        query.push(("pageToken", token.clone()));
    }
    query
}

fn next_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

#[async_trait]
impl CourseworkProvider for GoogleClassroomClient {
    async fn list_courses(&self) -> Result<Vec<Course>> {
        let mut courses = Vec::new();
        let mut page_token = None;

        loop {
            let mut query = page_query(&page_token);
            query.push(("courseStates", "ACTIVE".to_string()));

            let page: CoursesPage = self.get("/courses", &query).await?;
            courses.extend(page.courses);

            page_token = next_token(page.next_page_token);
            if page_token.is_none() {
                break;
            }
        }

        debug!("Listed {} active courses", courses.len());
        Ok(courses)
    }

    async fn list_course_work(&self, course_id: &str) -> Result<Vec<CourseWork>> {
        let path = format!("/courses/{}/courseWork", course_id);
        let mut work = Vec::new();
        let mut page_token = None;

        loop {
            let page: CourseWorkPage = self.get(&path, &page_query(&page_token)).await?;
            work.extend(page.course_work);

            page_token = next_token(page.next_page_token);
            if page_token.is_none() {
                break;
            }
        }

        debug!("Course {} has {} coursework items", course_id, work.len());
        Ok(work)
    }

    async fn get_my_submission(
        &self,
        course_id: &str,
        course_work_id: &str,
    ) -> Result<Option<Submission>> {
        let path = format!(
            "/courses/{}/courseWork/{}/studentSubmissions",
            course_id, course_work_id
        );
        let mut page_token = None;

        // Pages may come back empty with a continuation token
        loop {
            let mut query = page_query(&page_token);
            query.push(("userId", "me".to_string()));

            let page: SubmissionsPage = self.get(&path, &query).await?;
            if let Some(submission) = page.student_submissions.into_iter().next() {
                return Ok(Some(submission));
            }

            page_token = next_token(page.next_page_token);
            if page_token.is_none() {
                return Ok(None);
            }
        }
    }
}
