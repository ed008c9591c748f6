//! Shared application state.

use std::sync::Arc;

use citadin_core::{
    AtmoAdapter, AtmoTokenCache, GeodairAdapter, HttpClient, MelodiAdapter, ProxySettings,
    SdesAdapter,
};
use citadin_store::IndicatorStore;

/// Process-wide state handed to every handler.
///
/// Settings are immutable after startup. Adapters are cheap and built per
/// request; the Atmo token cache is the only state they share.
pub struct AppState {
    pub settings: ProxySettings,
    pub http_client: Arc<dyn HttpClient>,
    pub atmo_tokens: Arc<AtmoTokenCache>,
    pub store: Option<IndicatorStore>,
}

impl AppState {
    pub fn new(settings: ProxySettings, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            settings,
            http_client,
            atmo_tokens: Arc::new(AtmoTokenCache::new()),
            store: None,
        }
    }

    pub fn with_store(mut self, store: IndicatorStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn atmo(&self) -> AtmoAdapter {
        AtmoAdapter::new(self.settings.atmo.clone(), Arc::clone(&self.http_client))
            .with_token_cache(Arc::clone(&self.atmo_tokens))
            .with_timeout_ms(self.settings.timeout_ms())
    }

    pub fn geodair(&self) -> GeodairAdapter {
        GeodairAdapter::new(self.settings.geodair.clone(), Arc::clone(&self.http_client))
            .with_timeout_ms(self.settings.timeout_ms())
    }

    pub fn melodi(&self) -> MelodiAdapter {
        MelodiAdapter::new(self.settings.melodi.clone(), Arc::clone(&self.http_client))
            .with_timeout_ms(self.settings.timeout_ms())
    }

    pub fn sdes(&self) -> SdesAdapter {
        SdesAdapter::new(self.settings.sdes.clone(), Arc::clone(&self.http_client))
            .with_timeout_ms(self.settings.timeout_ms())
    }
}
