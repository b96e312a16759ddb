// Weekly reminder endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use super::common::{failure, not_found, ApiResponse, ApiResult};
use crate::services::ReminderRequest;
use crate::store::Reminder;
use crate::web::AppState;

pub async fn list_reminders(State(state): State<AppState>) -> ApiResult<Vec<Reminder>> {
    match state.reminder_service.list().await {
        Ok(reminders) => Ok(Json(ApiResponse::success(reminders))),
        Err(e) => Err(failure("list reminders", e)),
    }
}

pub async fn create_reminder(
    State(state): State<AppState>,
    Json(request): Json<ReminderRequest>,
) -> ApiResult<Reminder> {
    match state.reminder_service.add(&request).await {
        Ok(reminder) => Ok(Json(ApiResponse::success(reminder))),
        Err(e) => Err(failure("create reminder", e)),
    }
}

pub async fn delete_reminder(
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> ApiResult<Value> {
    match state.reminder_service.remove(id).await {
        Ok(true) => {
            info!("Reminder {} deleted", id);
            Ok(Json(ApiResponse::success(json!({ "id": id, "deleted": true }))))
        }
        Ok(false) => Err(not_found(format!("Reminder {} not found", id))),
        Err(e) => Err(failure("delete reminder", e)),
    }
}
