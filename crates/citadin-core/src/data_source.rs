//! Adapter error model and validated request types.
//!
//! Every provider adapter fails with a [`SourceError`]; the proxy boundary maps
//! each kind to exactly one response class. Requests are validated when they
//! are constructed, so an adapter never sees a malformed query.
//!
//! | Request | Adapter | Upstream |
//! |---------|---------|----------|
//! | [`AirQualityRequest`] | [`GeodairAdapter`](crate::GeodairAdapter) | Geod'air |
//! | [`IndicesRequest`] | [`AtmoAdapter`](crate::AtmoAdapter) | Atmo France |
//! | [`EmploymentRequest`] | [`MelodiAdapter`](crate::MelodiAdapter) | INSEE Melodi |
//! | [`SeriesRequest`] | [`SdesAdapter`](crate::SdesAdapter) | SDES DiDo |

use std::fmt::{Display, Formatter};

use time::Date;

use crate::domain::{parse_iso_date, validate_iso_datetime};
use crate::{ProviderId, ValidationError};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Required credentials or settings are absent.
    Configuration,
    /// Non-success status, transport failure or timeout.
    Unavailable,
    /// The upstream answered but the payload lacks mandatory structure.
    Schema,
    Internal,
}

/// Structured source error raised by provider adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    provider: ProviderId,
    kind: SourceErrorKind,
    message: String,
    status: Option<u16>,
}

impl SourceError {
    pub fn configuration(provider: ProviderId, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind: SourceErrorKind::Configuration,
            message: message.into(),
            status: None,
        }
    }

    pub fn unavailable(provider: ProviderId, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            status: None,
        }
    }

    /// Final non-2xx response from the upstream.
    pub fn status(provider: ProviderId, status: u16, context: &str) -> Self {
        Self {
            provider,
            kind: SourceErrorKind::Unavailable,
            message: format!("{provider} {context} returned status {status}"),
            status: Some(status),
        }
    }

    pub fn schema(provider: ProviderId, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind: SourceErrorKind::Schema,
            message: message.into(),
            status: None,
        }
    }

    pub fn internal(provider: ProviderId, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind: SourceErrorKind::Internal,
            message: message.into(),
            status: None,
        }
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status of the failing upstream response, when there was one.
    pub const fn upstream_status(&self) -> Option<u16> {
        self.status
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Configuration => "source.configuration",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Schema => "source.schema",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Geod'air measurement query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirQualityRequest {
    pub pollutant_code: String,
    /// ISO 8601 datetime, forwarded verbatim.
    pub start: String,
    /// ISO 8601 datetime, forwarded verbatim.
    pub end: String,
    pub station: Option<String>,
}

impl AirQualityRequest {
    pub fn new(
        pollutant_code: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        station: Option<String>,
    ) -> Result<Self, ValidationError> {
        let pollutant_code = pollutant_code.into();
        if pollutant_code.trim().is_empty() {
            return Err(ValidationError::BlankParameter {
                name: "pollutant_code",
            });
        }

        let start = start.into();
        let end = end.into();
        validate_iso_datetime("start", &start)?;
        validate_iso_datetime("end", &end)?;

        Ok(Self {
            pollutant_code,
            start,
            end,
            station: non_blank(station),
        })
    }
}

/// Atmo index query over `[date_historique, date)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicesRequest {
    pub date: Date,
    pub date_historique: Date,
    pub code_zone: Option<String>,
}

impl IndicesRequest {
    /// Build a request; `date_historique` must strictly precede `date`.
    pub fn new(
        date: Date,
        date_historique: Date,
        code_zone: Option<String>,
    ) -> Result<Self, ValidationError> {
        if date_historique >= date {
            return Err(ValidationError::HistoricalNotBeforeDate);
        }

        Ok(Self {
            date,
            date_historique,
            code_zone: non_blank(code_zone),
        })
    }

    /// Parse both dates as `YYYY-MM-DD` and check their ordering.
    pub fn parse(
        date: &str,
        date_historique: &str,
        code_zone: Option<String>,
    ) -> Result<Self, ValidationError> {
        let date = parse_iso_date("date", date)?;
        let date_historique = parse_iso_date("date_historique", date_historique)?;
        Self::new(date, date_historique, code_zone)
    }
}

/// Melodi employment query (`DS_RP_EMPLOI_LT_COMP`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmploymentRequest {
    pub geo: Vec<String>,
    pub time_period: Option<String>,
    pub pcs: Option<String>,
    pub decode: bool,
}

impl EmploymentRequest {
    pub fn new(
        geo: Vec<String>,
        time_period: Option<String>,
        pcs: Option<String>,
        decode: bool,
    ) -> Result<Self, ValidationError> {
        if geo.is_empty() {
            return Err(ValidationError::MissingParameter { name: "geo" });
        }
        if geo.iter().any(|value| value.trim().is_empty()) {
            return Err(ValidationError::BlankParameter { name: "geo" });
        }

        Ok(Self {
            geo,
            time_period: non_blank(time_period),
            pcs: non_blank(pcs),
            decode,
        })
    }

    /// Upstream query pairs, `GEO` repeated once per value.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self
            .geo
            .iter()
            .map(|geo| (String::from("GEO"), geo.clone()))
            .collect::<Vec<_>>();
        if let Some(time_period) = &self.time_period {
            pairs.push((String::from("TIME_PERIOD"), time_period.clone()));
        }
        if let Some(pcs) = &self.pcs {
            pairs.push((String::from("PCS"), pcs.clone()));
        }
        pairs
    }
}

/// SDES yearly series lookup for one commune.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub code_insee: String,
    pub variable_label: String,
    /// `None` when absent or blank; the sub-field clause is then skipped.
    pub subfield_label: Option<String>,
}

impl SeriesRequest {
    pub fn new(
        code_insee: impl Into<String>,
        variable_label: impl Into<String>,
        subfield_label: Option<String>,
    ) -> Result<Self, ValidationError> {
        let code_insee = code_insee.into();
        if code_insee.trim().is_empty() {
            return Err(ValidationError::BlankParameter { name: "code_insee" });
        }

        Ok(Self {
            code_insee,
            variable_label: variable_label.into(),
            subfield_label: non_blank(subfield_label),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
