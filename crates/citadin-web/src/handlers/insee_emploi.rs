//! INSEE Melodi employment counts.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query};
use axum::Json;

use citadin_core::{shape_employment, EmploymentRequest, TabularEnvelope, ValidationError};

use super::optional;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/insee_emploi/ - `{data: [...], count}`
///
/// Read as raw pairs so every repeated `geo` value is kept.
pub async fn employment_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<TabularEnvelope>, ApiError> {
    let Query(pairs) = query?;

    let mut geo = Vec::new();
    let mut time_period = None;
    let mut pcs = None;
    let mut decode = None;
    for (name, value) in pairs {
        match name.as_str() {
            "geo" => geo.extend(optional("geo", Some(value))?),
            "time_period" if time_period.is_none() => {
                time_period = optional("time_period", Some(value))?;
            }
            "pcs" if pcs.is_none() => pcs = optional("pcs", Some(value))?,
            "decode" if decode.is_none() => decode = Some(parse_flag("decode", &value)?),
            _ => {}
        }
    }

    let request = EmploymentRequest::new(geo, time_period, pcs, decode.unwrap_or(true))?;
    let frame = state.melodi().fetch_employment(&request).await?;
    Ok(Json(shape_employment(frame, request.decode)))
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ValidationError::InvalidBool {
            name,
            value: value.to_owned(),
        }),
    }
}
