// Liveness endpoint

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use super::common::{ApiResponse, ApiResult};
use crate::web::AppState;

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(Json(ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timezone": state.config.timezone.name(),
        "reminders_enabled": state.config.reminders.enabled,
        "class_schedules_enabled": state.config.class_schedules.enabled,
        "classroom_enabled": state.config.classroom.enabled,
    }))))
}
