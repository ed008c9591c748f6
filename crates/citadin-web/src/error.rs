use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use citadin_core::{SourceError, SourceErrorKind, ValidationError};
use citadin_store::StoreError;

/// Errors surfaced by the proxy endpoints, rendered as `{detail}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", .0.body_text())]
    Query(#[from] QueryRejection),

    #[error("{} error: {}", .0.provider().display_name(), .0.message())]
    Upstream(#[from] SourceError),

    #[error("indicator store error: {0}")]
    Store(#[from] StoreError),

    #[error("indicator store is not configured")]
    StoreUnavailable,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Query(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(source) if source.kind() == SourceErrorKind::Schema => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) | Self::StoreUnavailable | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Validation(_) | Self::Query(_) => {}
            Self::Upstream(source) => error!(
                provider = %source.provider(),
                code = source.code(),
                upstream_status = ?source.upstream_status(),
                "upstream failure: {}",
                source.message()
            ),
            other => error!("request failed: {other}"),
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
