//! Immutable provider configuration.
//!
//! [`ProxySettings`] is built once at process start and handed to adapter
//! constructors; nothing in the crate reads the environment after that.
//! Empty variables count as unset.

use std::fmt::{Debug, Formatter};
use std::time::Duration;

use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::ValidationError;

pub const DEFAULT_ATMO_BASE_URL: &str = "https://admindata.atmo-france.org";
pub const DEFAULT_GEODAIR_BASE_URL: &str = "https://www.geodair.fr";
pub const DEFAULT_MELODI_BASE_URL: &str = "https://api.insee.fr/melodi";
pub const DEFAULT_SDES_BASE_URL: &str =
    "https://data.statistiques.developpement-durable.gouv.fr/dido/api/v1";
pub const DEFAULT_SDES_DATAFILE_RID: &str = "318d1042-79c8-4d39-b337-9d261050cf7d";

/// Atmo France credentials and endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AtmoSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AtmoSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            username: None,
            password: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Username and password, when both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }
}

impl Default for AtmoSettings {
    fn default() -> Self {
        Self::new(DEFAULT_ATMO_BASE_URL)
    }
}

impl Debug for AtmoSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtmoSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &redacted(&self.api_key))
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

/// Geod'air request shape. The upstream contract is provisional, so the path
/// and every parameter name are configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeodairContract {
    pub path: String,
    pub pollutant_param: String,
    pub start_param: String,
    pub end_param: String,
    pub station_param: String,
}

impl Default for GeodairContract {
    fn default() -> Self {
        Self {
            path: String::from("/donnees/api"),
            pollutant_param: String::from("pollutant"),
            start_param: String::from("start"),
            end_param: String::from("end"),
            station_param: String::from("station"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct GeodairSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub contract: GeodairContract,
}

impl Default for GeodairSettings {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_GEODAIR_BASE_URL),
            api_key: None,
            contract: GeodairContract::default(),
        }
    }
}

impl Debug for GeodairSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeodairSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &redacted(&self.api_key))
            .field("contract", &self.contract)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MelodiSettings {
    pub base_url: String,
}

impl Default for MelodiSettings {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_MELODI_BASE_URL),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdesSettings {
    pub base_url: String,
    pub datafile_rid: String,
}

impl Default for SdesSettings {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_SDES_BASE_URL),
            datafile_rid: String::from(DEFAULT_SDES_DATAFILE_RID),
        }
    }
}

/// Process-wide provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub atmo: AtmoSettings,
    pub geodair: GeodairSettings,
    pub melodi: MelodiSettings,
    pub sdes: SdesSettings,
    /// Connect and total timeout of every upstream call.
    pub upstream_timeout: Duration,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            atmo: AtmoSettings::default(),
            geodair: GeodairSettings::default(),
            melodi: MelodiSettings::default(),
            sdes: SdesSettings::default(),
            upstream_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ProxySettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let upstream_timeout = match get("CITADIN_UPSTREAM_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(seconds) if seconds > 0 => Duration::from_secs(seconds),
                _ => {
                    return Err(ValidationError::InvalidSetting {
                        key: "CITADIN_UPSTREAM_TIMEOUT_SECS",
                        value,
                    })
                }
            },
            None => defaults.upstream_timeout,
        };

        let contract_defaults = GeodairContract::default();
        let contract = GeodairContract {
            path: get("GEODAIR_ENDPOINT_PATH").unwrap_or(contract_defaults.path),
            pollutant_param: get("GEODAIR_PARAM_POLLUTANT")
                .unwrap_or(contract_defaults.pollutant_param),
            start_param: get("GEODAIR_PARAM_START").unwrap_or(contract_defaults.start_param),
            end_param: get("GEODAIR_PARAM_END").unwrap_or(contract_defaults.end_param),
            station_param: get("GEODAIR_PARAM_STATION")
                .unwrap_or(contract_defaults.station_param),
        };

        Ok(Self {
            atmo: AtmoSettings {
                base_url: get("ATMO_API_BASE_URL").unwrap_or(defaults.atmo.base_url),
                api_key: get("ATMO_API_KEY"),
                username: get("ATMO_USERNAME"),
                password: get("ATMO_PASSWORD"),
            },
            geodair: GeodairSettings {
                base_url: get("GEODAIR_API_BASE_URL").unwrap_or(defaults.geodair.base_url),
                api_key: get("GEODAIR_API_KEY"),
                contract,
            },
            melodi: MelodiSettings {
                base_url: get("MELODI_BASE_URL").unwrap_or(defaults.melodi.base_url),
            },
            sdes: SdesSettings {
                base_url: get("SDES_BASE_URL_API").unwrap_or(defaults.sdes.base_url),
                datafile_rid: get("SDES_DATAFILE_RID").unwrap_or(defaults.sdes.datafile_rid),
            },
            upstream_timeout,
        })
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.upstream_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Join a base URL and a path with exactly one slash.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn redacted(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "<redacted>"
    } else {
        "<unset>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let settings = ProxySettings::from_lookup(lookup(&[])).expect("valid settings");
        assert_eq!(settings, ProxySettings::default());
        assert_eq!(settings.timeout_ms(), 30_000);
        assert_eq!(settings.atmo.credentials(), None);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let settings = ProxySettings::from_lookup(lookup(&[
            ("ATMO_API_KEY", ""),
            ("ATMO_USERNAME", "svc"),
            ("ATMO_PASSWORD", "secret"),
            ("GEODAIR_ENDPOINT_PATH", "/api/v2/measures"),
        ]))
        .expect("valid settings");

        assert_eq!(settings.atmo.api_key, None);
        assert_eq!(settings.atmo.credentials(), Some(("svc", "secret")));
        assert_eq!(settings.geodair.contract.path, "/api/v2/measures");
        assert_eq!(settings.geodair.contract.pollutant_param, "pollutant");
    }

    #[test]
    fn rejects_invalid_timeout() {
        let err = ProxySettings::from_lookup(lookup(&[("CITADIN_UPSTREAM_TIMEOUT_SECS", "0")]))
            .expect_err("zero timeout must fail");
        assert!(matches!(err, ValidationError::InvalidSetting { .. }));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let settings = AtmoSettings::default()
            .with_api_key("static-key")
            .with_credentials("svc", "hunter2");
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("static-key"));
        assert!(rendered.contains("svc"));
    }

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("https://a.test/", "/api/login"), "https://a.test/api/login");
        assert_eq!(join_url("https://a.test", "data/DS"), "https://a.test/data/DS");
    }
}
