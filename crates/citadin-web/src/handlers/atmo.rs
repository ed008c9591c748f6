//! Atmo France daily indices.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query};
use axum::Json;
use serde::Deserialize;

use citadin_core::{shape_indices, IndexRecord, IndicesRequest, ResultsEnvelope};

use super::{optional, required};
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the indices endpoint.
#[derive(Debug, Deserialize)]
pub struct IndicesQueryParams {
    /// Upper bound, `YYYY-MM-DD`
    pub date: Option<String>,
    /// Lower bound, strictly before `date`
    pub date_historique: Option<String>,
    pub code_zone: Option<String>,
}

/// GET /api/v1/atmo/indices - `{results: [{date, code_qual}]}`
///
/// Date ordering is checked before any upstream call.
pub async fn indices_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<IndicesQueryParams>, QueryRejection>,
) -> Result<Json<ResultsEnvelope<IndexRecord>>, ApiError> {
    let Query(params) = query?;
    let request = IndicesRequest::parse(
        &required("date", params.date)?,
        &required("date_historique", params.date_historique)?,
        optional("code_zone", params.code_zone)?,
    )?;

    let payload = state.atmo().fetch_indices(&request).await?;
    Ok(Json(ResultsEnvelope::new(shape_indices(&payload))))
}
