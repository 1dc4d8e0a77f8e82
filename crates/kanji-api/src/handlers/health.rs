//! Liveness endpoint

use axum::Json;
use chrono::Utc;
use kanji_core::models::HealthResponse;

use crate::constants::{SERVICE_NAME, SERVICE_VERSION};

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
        timestamp: Utc::now(),
    })
}
