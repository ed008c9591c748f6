use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use super::transport_error;
use crate::config::{join_url, MelodiSettings};
use crate::data_source::{EmploymentRequest, SourceError};
use crate::frame::Frame;
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::source::ProviderId;

pub const EMPLOYMENT_DATASET: &str = "DS_RP_EMPLOI_LT_COMP";
pub const POPULATION_DATASET: &str = "DS_RP_POPULATION_PRINC";

/// Columns of the frame returned for a payload without observations.
pub const FALLBACK_COLUMNS: [&str; 6] = [
    "GEO",
    "SEX",
    "TIME_PERIOD",
    "RP_MEASURE",
    "AGE",
    "OBS_VALUE_NIVEAU",
];

/// Anonymous INSEE Melodi client.
#[derive(Clone)]
pub struct MelodiAdapter {
    settings: MelodiSettings,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl MelodiAdapter {
    pub fn new(settings: MelodiSettings, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            settings,
            http_client,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Fetch `dataset` with `params` (keys may repeat) as a flat frame.
    pub async fn fetch(
        &self,
        dataset: &str,
        params: &[(String, String)],
    ) -> Result<Frame, SourceError> {
        let request = HttpRequest::get(join_url(
            &self.settings.base_url,
            &format!("/data/{dataset}"),
        ))
        .with_header("accept", "application/json")
        .with_query_pairs(params.iter().cloned())
        .with_timeout_ms(self.timeout_ms);

        debug!(url = %request.full_url(), "melodi request");
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(ProviderId::Melodi, &error))?;

        if !response.is_success() {
            return Err(SourceError::status(
                ProviderId::Melodi,
                response.status,
                "data endpoint",
            ));
        }

        let payload = serde_json::from_str::<Value>(&response.body).map_err(|error| {
            SourceError::internal(
                ProviderId::Melodi,
                format!("melodi response for {dataset} is not JSON: {error}"),
            )
        })?;

        Ok(observations_to_frame(&payload))
    }

    /// Employment counts by place, period and socio-professional category.
    pub async fn fetch_employment(
        &self,
        request: &EmploymentRequest,
    ) -> Result<Frame, SourceError> {
        self.fetch(EMPLOYMENT_DATASET, &request.query_pairs()).await
    }

    /// Main population figures of one commune.
    pub async fn fetch_population_by_city(&self, code_insee: &str) -> Result<Frame, SourceError> {
        let params = [(String::from("GEO"), format!("COM-{code_insee}"))];
        self.fetch(POPULATION_DATASET, &params).await
    }
}

/// Flatten a Melodi `observations` payload into one row per observation.
///
/// Dimensions are copied as they are. Each measure contributes its nested
/// `value`, else its nested `values`, else the measure itself when it is a
/// scalar. No observations yields an empty frame with [`FALLBACK_COLUMNS`].
pub fn observations_to_frame(payload: &Value) -> Frame {
    let observations = payload
        .get("observations")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if observations.is_empty() {
        return Frame::with_columns(FALLBACK_COLUMNS);
    }

    let records = observations
        .iter()
        .map(|observation| {
            let mut row = Map::new();
            if let Some(dimensions) = observation.get("dimensions").and_then(Value::as_object) {
                row.extend(dimensions.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            if let Some(measures) = observation.get("measures").and_then(Value::as_object) {
                for (name, measure) in measures {
                    row.insert(name.clone(), measure_value(measure));
                }
            }
            row
        })
        .collect();

    Frame::from_records(records)
}

fn measure_value(measure: &Value) -> Value {
    match measure {
        Value::Object(fields) => fields
            .get("value")
            .filter(|value| !value.is_null())
            .or_else(|| fields.get("values"))
            .cloned()
            .unwrap_or(Value::Null),
        scalar => scalar.clone(),
    }
}
