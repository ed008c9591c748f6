//! # Citadin Web
//!
//! HTTP proxy in front of the Observatoire Citadin provider adapters.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /` | [`handlers::health::landing_handler`] |
//! | `GET /api/v1/health` | [`handlers::health::health_handler`] |
//! | `GET /api/v1/air-quality` | [`handlers::air_quality::air_quality_handler`] |
//! | `GET /api/v1/atmo/indices` | [`handlers::atmo::indices_handler`] |
//! | `GET /api/v1/insee_emploi/` | [`handlers::insee_emploi::employment_handler`] |
//! | `GET /api/v1/sdes/commune` | [`handlers::sdes::commune_handler`] |
//! | `GET /api/v1/indicators` | [`handlers::indicators::list_indicators_handler`] |

pub mod error;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

/// Build the application router over `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::health::landing_handler))
        .route("/api/v1/health", get(handlers::health::health_handler))
        .route(
            "/api/v1/air-quality",
            get(handlers::air_quality::air_quality_handler),
        )
        .route(
            "/api/v1/atmo/indices",
            get(handlers::atmo::indices_handler),
        )
        .route(
            "/api/v1/insee_emploi",
            get(handlers::insee_emploi::employment_handler),
        )
        .route(
            "/api/v1/insee_emploi/",
            get(handlers::insee_emploi::employment_handler),
        )
        .route(
            "/api/v1/sdes/commune",
            get(handlers::sdes::commune_handler),
        )
        .route(
            "/api/v1/indicators",
            get(handlers::indicators::list_indicators_handler),
        )
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
