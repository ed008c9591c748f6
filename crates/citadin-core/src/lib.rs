//! # Citadin Core
//!
//! Provider adapters and normalized contracts for the Observatoire Citadin
//! public-data proxy.
//!
//! ## Overview
//!
//! This crate talks to four unrelated French public-data providers and
//! reduces their payloads to small, stable response contracts:
//!
//! - **Atmo France** air-quality indices (login + bearer token lifecycle)
//! - **Geod'air** air-quality measurements (static bearer key)
//! - **INSEE Melodi** statistics (anonymous, observation-shaped JSON)
//! - **SDES DiDo** environmental indicators (CSV with `eq:` filters)
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | One adapter per provider |
//! | [`config`] | Immutable provider settings read once at startup |
//! | [`data_source`] | Adapter error model and validated request types |
//! | [`decode`] | INSEE code → label tables |
//! | [`domain`] | Normalized records and date handling |
//! | [`envelope`] | `{results}` and `{data, count}` response wrappers |
//! | [`error`] | Request and settings validation errors |
//! | [`frame`] | Row/column table used as adapter working state |
//! | [`http_client`] | HTTP transport seam |
//! | [`payload`] | Soft-decoded upstream bodies |
//! | [`shaping`] | Adapter output → response contracts |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use citadin_core::{shape_indices, AtmoAdapter, IndicesRequest, ProxySettings, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = ProxySettings::from_env()?;
//!     let client = Arc::new(ReqwestHttpClient::new(settings.upstream_timeout)?);
//!     let adapter = AtmoAdapter::new(settings.atmo.clone(), client);
//!
//!     let request = IndicesRequest::parse("2025-01-02", "2025-01-01", None)?;
//!     let payload = adapter.fetch_indices(&request).await?;
//!     for record in shape_indices(&payload) {
//!         println!("{} {}", record.date, record.code_qual);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ Proxy endpoint  │
//! └────────┬────────┘
//!          │ validated request
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Provider        │────▶│ HTTP Client      │
//! │ adapter         │     │ (reqwest/fake)   │
//! └────────┬────────┘     └──────────────────┘
//!          │ Payload / Frame
//!          ▼
//! ┌─────────────────┐
//! │ Shaping         │
//! │ (records)       │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Adapters fail with a structured [`SourceError`]:
//!
//! ```rust
//! use citadin_core::{SourceError, SourceErrorKind};
//!
//! fn status_class(error: &SourceError) -> u16 {
//!     match error.kind() {
//!         SourceErrorKind::Schema => 500,
//!         _ => 502,
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - Credentials come from the environment only and are redacted in `Debug`
//! - Tokens and passwords never appear in log events

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod decode;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod http_client;
pub mod payload;
pub mod shaping;
pub mod source;

// Adapter implementations
pub use adapters::{
    extract_series, observations_to_frame, AtmoAdapter, AtmoTokenCache, GeodairAdapter,
    MelodiAdapter, SdesAdapter,
};

// Configuration
pub use config::{
    AtmoSettings, GeodairContract, GeodairSettings, MelodiSettings, ProxySettings, SdesSettings,
};

// Request and error types
pub use data_source::{
    AirQualityRequest, EmploymentRequest, IndicesRequest, SeriesRequest, SourceError,
    SourceErrorKind,
};

// Domain models
pub use domain::{IndexRecord, NumericValue, YearValue};

// Envelope types
pub use envelope::{ResultsEnvelope, TabularEnvelope};

// Error types
pub use error::ValidationError;

pub use frame::Frame;

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};

pub use payload::Payload;
pub use shaping::{shape_employment, shape_indices};

// Source identifiers
pub use source::ProviderId;
