// Task listing, completion and manual review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use super::common::{failure, ApiResponse, ApiResult};
use crate::review::{CreatedReview, ReviewMode};
use crate::services::validation::require_text;
use crate::services::TaskDigest;
use crate::trigger::now_in;
use crate::web::AppState;

const MAX_REVIEW_CONTENT_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub content: String,
    #[serde(default)]
    pub mode: Option<ReviewMode>,
}

/// Open tasks due today plus overdue ones
pub async fn get_today_tasks(State(state): State<AppState>) -> ApiResult<TaskDigest> {
    let today = now_in(state.task_service.timezone()).date_naive();
    match state.task_service.digest(today).await {
        Ok(digest) => Ok(Json(ApiResponse::success(digest))),
        Err(e) => Err(failure("fetch today's tasks", e)),
    }
}

pub async fn close_task(
    Path(task_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Value> {
    match state.task_service.complete_task(&task_id).await {
        Ok(()) => {
            info!("Task {} closed", task_id);
            Ok(Json(ApiResponse::success(json!({ "task_id": task_id, "closed": true }))))
        }
        Err(e) => Err(failure("close task", e)),
    }
}

/// Builds a review series for arbitrary content
pub async fn create_review_series(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Vec<CreatedReview>> {
    let content = require_text("content", &request.content, MAX_REVIEW_CONTENT_CHARS)
        .map_err(|e| failure("create review series", e.into()))?;
    let mode = request.mode.unwrap_or_default();
    let today = now_in(state.task_service.timezone()).date_naive();

    let reviews = state.review_series.build_series(&content, mode, today).await;
    if reviews.is_empty() {
        error!("No review task could be created for '{}'", content);
        return Err((
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::error("No review task could be created".to_string())),
        ));
    }

    Ok(Json(ApiResponse::success(reviews)))
}
