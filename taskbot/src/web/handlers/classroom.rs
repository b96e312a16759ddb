// Coursework sync endpoints

use axum::{extract::State, response::Json};
use tracing::info;

use super::common::{failure, ApiResponse, ApiResult};
use crate::services::{SyncSummary, TrackedCoursework};
use crate::trigger::now_in;
use crate::web::AppState;

/// Stored coursework links split into overdue, upcoming and later
pub async fn get_tracked_coursework(
    State(state): State<AppState>,
) -> ApiResult<TrackedCoursework> {
    let now = now_in(state.config.classroom_timezone());
    match state.coursework_sync.tracked(now).await {
        Ok(tracked) => Ok(Json(ApiResponse::success(tracked))),
        Err(e) => Err(failure("list tracked coursework", e)),
    }
}

/// Runs a sync immediately and returns its counts
pub async fn sync_classroom(State(state): State<AppState>) -> ApiResult<SyncSummary> {
    info!("Manual classroom sync requested");
    let now = now_in(state.config.classroom_timezone());
    match state.coursework_sync.sync(now).await {
        Ok(summary) => Ok(Json(ApiResponse::success(summary))),
        Err(e) => Err(failure("sync classroom coursework", e)),
    }
}
