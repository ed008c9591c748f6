use std::sync::Arc;

use tracing::debug;

use super::transport_error;
use crate::config::{join_url, GeodairSettings};
use crate::data_source::{AirQualityRequest, SourceError};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::payload::Payload;
use crate::source::ProviderId;

/// Geod'air measurement adapter.
///
/// Path and parameter names come from [`GeodairContract`](crate::GeodairContract).
#[derive(Clone)]
pub struct GeodairAdapter {
    settings: GeodairSettings,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl GeodairAdapter {
    pub fn new(settings: GeodairSettings, http_client: Arc<dyn HttpClient>) -> Self {
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

    pub async fn fetch_air_quality(
        &self,
        request: &AirQualityRequest,
    ) -> Result<Payload, SourceError> {
        let contract = &self.settings.contract;
        let mut http_request = HttpRequest::get(join_url(&self.settings.base_url, &contract.path))
            .with_header("accept", "application/json")
            .with_query(&contract.pollutant_param, &request.pollutant_code)
            .with_query(&contract.start_param, &request.start)
            .with_query(&contract.end_param, &request.end)
            .with_auth(&HttpAuth::bearer(self.settings.api_key.clone()))
            .with_timeout_ms(self.timeout_ms);
        if let Some(station) = &request.station {
            http_request = http_request.with_query(&contract.station_param, station);
        }

        debug!(url = %http_request.full_url(), "geodair request");
        let response = self
            .http_client
            .execute(http_request)
            .await
            .map_err(|error| transport_error(ProviderId::Geodair, &error))?;

        if !response.is_success() {
            return Err(SourceError::status(
                ProviderId::Geodair,
                response.status,
                "measurement endpoint",
            ));
        }

        Ok(Payload::from_body(&response.body))
    }
}
