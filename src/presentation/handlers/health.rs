use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::presentation::middleware::{AppError, ErrorBody};
use crate::presentation::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    pub status: String,
}

/// Liveness probe; answers whenever the process can serve HTTP
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_string(), timestamp: chrono::Utc::now().to_rfc3339() })
}

/// Readiness probe; checks the user store
#[utoipa::path(
    get,
    path = "/api/v1/ready",
    tag = "health",
    responses(
        (status = 200, description = "Dependencies reachable", body = ReadyResponse),
        (status = 503, description = "User store unavailable", body = ErrorBody),
    )
)]
pub async fn ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, AppError> {
    state.users.health_check().await.map_err(|e| {
        warn!("Readiness check failed: {}", e);
        AppError::ServiceUnavailable { message: "user store is unreachable".to_string() }
    })?;
    Ok(Json(ReadyResponse { status: "ready".to_string() }))
}
