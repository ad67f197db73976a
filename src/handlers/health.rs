use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::{schemas::admin::HealthResponse, services::database, AppState};

/// Liveness and database probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Healthy", body = HealthResponse),
        (status = 500, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(app_state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let environment = app_state.config.server.environment.clone();

    match database::ping(&app_state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                timestamp: Utc::now(),
                database: "connected".to_string(),
                environment,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    timestamp: Utc::now(),
                    database: "disconnected".to_string(),
                    environment,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
