//! Geod'air measurements passthrough.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use citadin_core::AirQualityRequest;

use super::{optional, required};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AirQualityQueryParams {
    pub pollutant_code: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub station: Option<String>,
}

/// GET /api/v1/air-quality - `{data}` or `{content}`
pub async fn air_quality_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<AirQualityQueryParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = query?;
    let request = AirQualityRequest::new(
        required("pollutant_code", params.pollutant_code)?,
        required("start", params.start)?,
        required("end", params.end)?,
        optional("station", params.station)?,
    )?;

    let payload = state.geodair().fetch_air_quality(&request).await?;
    Ok(Json(payload.into_data_envelope()))
}
