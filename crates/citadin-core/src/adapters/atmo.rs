use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{json, Value};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use super::transport_error;
use crate::config::{join_url, AtmoSettings};
use crate::data_source::{IndicesRequest, SourceError};
use crate::domain::format_iso_date;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse, DEFAULT_TIMEOUT_MS};
use crate::payload::Payload;
use crate::source::ProviderId;

/// How long a login token is trusted before a new login is required.
pub const TOKEN_LIFETIME: Duration = Duration::minutes(23 * 60 + 50);

/// Keys tried, in order, for the token in a login response.
pub const TOKEN_KEYS: [&str; 4] = ["token", "access_token", "jwt", "id_token"];

const LOGIN_PATH: &str = "/api/login";
const INDICES_PATH: &str = "/api/v2/data/indices/atmo";

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: OffsetDateTime,
}

/// Process-wide Atmo token slot.
///
/// Readers take the read lock only; a login publishes a whole new token under
/// the write lock. Concurrent logins are harmless and the last one wins.
#[derive(Debug, Default)]
pub struct AtmoTokenCache {
    slot: RwLock<Option<CachedToken>>,
}

impl AtmoTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached token if it is still valid at `now`.
    pub fn valid_token_at(&self, now: OffsetDateTime) -> Option<String> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|cached| now < cached.expires_at)
            .map(|cached| cached.token.clone())
    }

    /// Store `token`, valid for [`TOKEN_LIFETIME`] from `issued_at`.
    pub fn publish(&self, token: impl Into<String>, issued_at: OffsetDateTime) {
        let cached = CachedToken {
            token: token.into(),
            expires_at: issued_at + TOKEN_LIFETIME,
        };
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(cached);
    }

    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(|cached| cached.expires_at)
    }
}

/// Atmo France indices adapter with login-based bearer authentication.
#[derive(Clone)]
pub struct AtmoAdapter {
    settings: AtmoSettings,
    http_client: Arc<dyn HttpClient>,
    tokens: Arc<AtmoTokenCache>,
    timeout_ms: u64,
}

impl AtmoAdapter {
    /// Adapter with a private token cache.
    pub fn new(settings: AtmoSettings, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            settings,
            http_client,
            tokens: Arc::new(AtmoTokenCache::new()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Share `tokens` with every other adapter holding the same cache.
    pub fn with_token_cache(mut self, tokens: Arc<AtmoTokenCache>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn token_cache(&self) -> &Arc<AtmoTokenCache> {
        &self.tokens
    }

    /// Token used for the next call: cached token, then static key, then none.
    pub fn effective_token(&self) -> Option<String> {
        self.effective_token_at(OffsetDateTime::now_utc())
    }

    pub fn effective_token_at(&self, now: OffsetDateTime) -> Option<String> {
        self.tokens
            .valid_token_at(now)
            .or_else(|| self.settings.api_key.clone())
    }

    /// Exchange the configured credentials for a bearer token and cache it.
    pub async fn login(&self) -> Result<String, SourceError> {
        let Some((username, password)) = self.settings.credentials() else {
            return Err(SourceError::configuration(
                ProviderId::Atmo,
                "ATMO_USERNAME and ATMO_PASSWORD must be set to log in to Atmo",
            ));
        };

        let request = HttpRequest::post(join_url(&self.settings.base_url, LOGIN_PATH))
            .with_header("accept", "application/json")
            .with_json_body(&json!({ "username": username, "password": password }))
            .with_timeout_ms(self.timeout_ms);

        debug!(url = %request.url, "atmo login request");
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(ProviderId::Atmo, &error))?;

        if !response.is_success() {
            return Err(SourceError::status(
                ProviderId::Atmo,
                response.status,
                "login endpoint",
            ));
        }

        let body = serde_json::from_str::<Value>(&response.body).map_err(|_| {
            SourceError::unavailable(ProviderId::Atmo, "atmo login response is not JSON")
        })?;
        let token = extract_token(&body).ok_or_else(|| {
            SourceError::unavailable(ProviderId::Atmo, "atmo login response carries no token")
        })?;

        let issued_at = OffsetDateTime::now_utc();
        self.tokens.publish(token.clone(), issued_at);
        info!(expires_at = %(issued_at + TOKEN_LIFETIME), "atmo login succeeded");

        Ok(token)
    }

    /// Fetch ATMO indices for `request`.
    ///
    /// Logs in first when no token is available and credentials exist. A 401
    /// answer triggers exactly one fresh login and one retried call.
    pub async fn fetch_indices(&self, request: &IndicesRequest) -> Result<Payload, SourceError> {
        let can_login = self.settings.credentials().is_some();

        let mut token = self.effective_token();
        if token.is_none() && can_login {
            token = Some(self.login().await?);
        }

        let response = self.get_indices(request, token).await?;
        if response.status == 401 && can_login {
            warn!("atmo rejected the bearer token, refreshing login once");
            let refreshed = self.login().await?;
            let retried = self.get_indices(request, Some(refreshed)).await?;
            return into_payload(retried);
        }

        into_payload(response)
    }

    async fn get_indices(
        &self,
        request: &IndicesRequest,
        token: Option<String>,
    ) -> Result<HttpResponse, SourceError> {
        let mut http_request = HttpRequest::get(join_url(&self.settings.base_url, INDICES_PATH))
            .with_header("accept", "application/json")
            .with_query("date", format_iso_date(request.date))
            .with_query("date_historique", format_iso_date(request.date_historique))
            .with_auth(&HttpAuth::bearer(token))
            .with_timeout_ms(self.timeout_ms);
        if let Some(code_zone) = &request.code_zone {
            http_request = http_request.with_query("code_zone", code_zone.clone());
        }

        debug!(url = %http_request.full_url(), "atmo indices request");
        self.http_client
            .execute(http_request)
            .await
            .map_err(|error| transport_error(ProviderId::Atmo, &error))
    }
}

fn into_payload(response: HttpResponse) -> Result<Payload, SourceError> {
    if !response.is_success() {
        return Err(SourceError::status(
            ProviderId::Atmo,
            response.status,
            "indices endpoint",
        ));
    }
    Ok(Payload::from_body(&response.body))
}

fn extract_token(body: &Value) -> Option<String> {
    TOKEN_KEYS
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}
