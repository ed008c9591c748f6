//! SDES yearly series for one commune.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query};
use axum::Json;
use serde::Deserialize;

use citadin_core::{ResultsEnvelope, SeriesRequest, YearValue};

use super::{optional, required};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CommuneQueryParams {
    pub code_insee: Option<String>,
    pub variable_label: Option<String>,
    /// Blank means no sub-field filter
    pub subfield_label: Option<String>,
}

/// GET /api/v1/sdes/commune - `{results: [{year, value}]}`
pub async fn commune_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<CommuneQueryParams>, QueryRejection>,
) -> Result<Json<ResultsEnvelope<YearValue>>, ApiError> {
    let Query(params) = query?;
    let request = SeriesRequest::new(
        required("code_insee", params.code_insee)?,
        required("variable_label", params.variable_label)?,
        optional("subfield_label", params.subfield_label)?,
    )?;

    let series = state.sdes().fetch_series(&request).await?;
    Ok(Json(ResultsEnvelope::new(series)))
}
