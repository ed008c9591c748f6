//! Persisted indicator listing.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query};
use axum::Json;
use serde::Deserialize;

use citadin_store::{IndicatorFilter, IndicatorRecord};

use super::optional;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IndicatorsQueryParams {
    pub city_id: Option<i64>,
    #[serde(rename = "type")]
    pub indicator_type: Option<String>,
}

/// GET /api/v1/indicators - newest first, at most 1000 rows
pub async fn list_indicators_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<IndicatorsQueryParams>, QueryRejection>,
) -> Result<Json<Vec<IndicatorRecord>>, ApiError> {
    let Query(params) = query?;
    let filter = IndicatorFilter {
        city_id: params.city_id,
        indicator_type: optional("type", params.indicator_type)?,
    };

    let store = state.store.clone().ok_or(ApiError::StoreUnavailable)?;
    let rows = tokio::task::spawn_blocking(move || store.list_indicators(&filter))
        .await
        .map_err(|error| ApiError::Internal(error.to_string()))??;

    Ok(Json(rows))
}
