// Common types and utilities for API handlers

use axum::{http::StatusCode, response::Json};
use chrono::Utc;
use serde::Serialize;
use tracing::error;

use crate::errors::ValidationError;

// Helper type for API responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Maps a service error to a response. Validation errors are echoed back as
/// a 400; everything else is logged in full and answered with a generic 500.
pub fn failure(action: &str, e: anyhow::Error) -> ApiError {
    if let Some(validation) = e.downcast_ref::<ValidationError>() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(validation.to_string())),
        );
    }

    error!("Failed to {}: {:#}", action, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(format!("Failed to {}", action))),
    )
}

pub fn not_found(message: String) -> ApiError {
    (StatusCode::NOT_FOUND, Json(ApiResponse::error(message)))
}
