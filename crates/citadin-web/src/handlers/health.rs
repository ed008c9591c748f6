//! Landing and health handlers.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LandingResponse {
    pub message: &'static str,
}

/// GET / - Service banner
pub async fn landing_handler() -> Json<LandingResponse> {
    Json(LandingResponse {
        message: "Observatoire Citadin API",
    })
}

/// GET /api/v1/health - Liveness check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
