// File: taskbot/src/web/server.rs
use anyhow::Result;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::web::{handlers, AppState};

pub async fn start_web_server(state: AppState) -> Result<()> {
    let app = create_router(state.clone());
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        // === REMINDER ROUTES ===
        .route(
            "/api/reminders",
            get(handlers::list_reminders).post(handlers::create_reminder),
        )
        .route("/api/reminders/{id}", delete(handlers::delete_reminder))
        // === CLASS SCHEDULE ROUTES ===
        .route(
            "/api/schedules",
            get(handlers::list_schedules).post(handlers::create_schedule),
        )
        .route("/api/schedules/{id}", delete(handlers::delete_schedule))
        // === CLASSROOM ROUTES ===
        .route("/api/classroom/tasks", get(handlers::get_tracked_coursework))
        .route("/api/classroom/sync", post(handlers::sync_classroom))
        // === TASK ROUTES ===
        .route("/api/tasks/today", get(handlers::get_today_tasks))
        .route("/api/tasks/{id}/close", post(handlers::close_task))
        .route("/api/review", post(handlers::create_review_series))
        // Add middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
