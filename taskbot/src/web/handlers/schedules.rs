// Class schedule endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use super::common::{failure, not_found, ApiResponse, ApiResult};
use crate::services::ClassScheduleRequest;
use crate::store::ClassSchedule;
use crate::web::AppState;

pub async fn list_schedules(State(state): State<AppState>) -> ApiResult<Vec<ClassSchedule>> {
    match state.class_schedule_service.list().await {
        Ok(schedules) => Ok(Json(ApiResponse::success(schedules))),
        Err(e) => Err(failure("list class schedules", e)),
    }
}

pub async fn create_schedule(
    State(state): State<AppState>,
    Json(request): Json<ClassScheduleRequest>,
) -> ApiResult<ClassSchedule> {
    match state.class_schedule_service.add(&request).await {
        Ok(schedule) => Ok(Json(ApiResponse::success(schedule))),
        Err(e) => Err(failure("create class schedule", e)),
    }
}

pub async fn delete_schedule(
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> ApiResult<Value> {
    match state.class_schedule_service.remove(id).await {
        Ok(true) => {
            info!("Class schedule {} deleted", id);
            Ok(Json(ApiResponse::success(json!({ "id": id, "deleted": true }))))
        }
        Ok(false) => Err(not_found(format!("Class schedule {} not found", id))),
        Err(e) => Err(failure("delete class schedule", e)),
    }
}
