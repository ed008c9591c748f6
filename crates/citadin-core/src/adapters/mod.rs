//! Provider adapters.
//!
//! Each adapter owns one upstream protocol and shares nothing with the
//! others beyond the [`HttpClient`](crate::HttpClient) seam.

mod atmo;
mod geodair;
mod melodi;
mod sdes;

pub use atmo::{AtmoAdapter, AtmoTokenCache, TOKEN_KEYS, TOKEN_LIFETIME};
pub use geodair::GeodairAdapter;
pub use melodi::{
    observations_to_frame, MelodiAdapter, EMPLOYMENT_DATASET, FALLBACK_COLUMNS,
    POPULATION_DATASET,
};
pub use sdes::{
    extract_series, is_year_column, SdesAdapter, COMMUNE_COLUMN, SUBFIELD_COLUMN,
    VARIABLE_COLUMN,
};

use crate::data_source::SourceError;
use crate::http_client::HttpError;
use crate::source::ProviderId;

/// Transport failure to upstream error; timeouts are reported as such.
pub(crate) fn transport_error(provider: ProviderId, error: &HttpError) -> SourceError {
    if error.timed_out() {
        SourceError::unavailable(
            provider,
            format!("{provider} request timed out: {}", error.message()),
        )
    } else {
        SourceError::unavailable(
            provider,
            format!("{provider} transport error: {}", error.message()),
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};

    /// Replays scripted responses in order and records every request.
    pub(crate) struct ScriptedHttpClient {
        responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        pub(crate) fn new<I>(responses: I) -> Self
        where
            I: IntoIterator<Item = Result<HttpResponse, HttpError>>,
        {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn replying(status: u16, body: &str) -> Self {
            Self::new([Ok(HttpResponse::new(status, body))])
        }

        pub(crate) fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self
                .responses
                .lock()
                .expect("response script should not be poisoned")
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::new("no scripted response left")));
            Box::pin(async move { response })
        }
    }
}
