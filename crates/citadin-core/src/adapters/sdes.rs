use std::sync::Arc;

use tracing::debug;

use super::transport_error;
use crate::config::{join_url, SdesSettings};
use crate::data_source::{SeriesRequest, SourceError};
use crate::domain::{NumericValue, YearValue};
use crate::frame::{cell_text, Frame};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::source::ProviderId;

pub const COMMUNE_COLUMN: &str = "COG_COMMUNE - Code de la zone";
pub const VARIABLE_COLUMN: &str = "Libellé de la variable";
pub const SUBFIELD_COLUMN: &str = "Libellé du sous-champ";

/// SDES DiDo CSV extract adapter.
#[derive(Clone)]
pub struct SdesAdapter {
    settings: SdesSettings,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl SdesAdapter {
    pub fn new(settings: SdesSettings, http_client: Arc<dyn HttpClient>) -> Self {
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

    /// Download the datafile rows whose `CODGEO_CODE` equals `code_insee`.
    pub async fn fetch_table(&self, code_insee: &str) -> Result<Frame, SourceError> {
        let path = format!("/datafiles/{}/csv", self.settings.datafile_rid);
        let request = HttpRequest::get(join_url(&self.settings.base_url, &path))
            .with_header("accept", "text/csv")
            .with_query("withColumnName", "true")
            .with_query("withColumnDescription", "true")
            .with_query("withColumnUnit", "true")
            .with_query("CODGEO_CODE", format!("eq:{code_insee}"))
            .with_timeout_ms(self.timeout_ms);

        debug!(url = %request.full_url(), "sdes request");
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(ProviderId::Sdes, &error))?;

        if !response.is_success() {
            return Err(SourceError::status(
                ProviderId::Sdes,
                response.status,
                "datafile endpoint",
            ));
        }

        Frame::from_delimited(&response.body, b';').map_err(|error| {
            SourceError::internal(
                ProviderId::Sdes,
                format!("sdes csv could not be parsed: {error}"),
            )
        })
    }

    /// Fetch the commune table and extract the requested yearly series.
    pub async fn fetch_series(
        &self,
        request: &SeriesRequest,
    ) -> Result<Vec<YearValue>, SourceError> {
        let frame = self.fetch_table(&request.code_insee).await?;
        extract_series(&frame, request)
    }
}

/// `A` followed by exactly four ASCII digits.
pub fn is_year_column(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() == 5 && bytes[0] == b'A' && bytes[1..].iter().all(u8::is_ascii_digit)
}

/// Reshape the first row matching `request` into yearly values.
///
/// The commune, variable and sub-field columns must all exist; the sub-field
/// is only compared when the request carries one. No matching row, or no
/// year column, gives an empty series.
pub fn extract_series(
    frame: &Frame,
    request: &SeriesRequest,
) -> Result<Vec<YearValue>, SourceError> {
    let missing = [COMMUNE_COLUMN, VARIABLE_COLUMN, SUBFIELD_COLUMN]
        .into_iter()
        .filter(|column| !frame.has_column(column))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(SourceError::schema(
            ProviderId::Sdes,
            format!("missing columns in SDES response: {}", missing.join(", ")),
        ));
    }

    let Some(row) = frame.rows().find(|row| {
        row.text(COMMUNE_COLUMN).as_deref() == Some(request.code_insee.as_str())
            && row.text(VARIABLE_COLUMN).as_deref() == Some(request.variable_label.as_str())
            && request
                .subfield_label
                .as_deref()
                .map_or(true, |label| row.text(SUBFIELD_COLUMN).as_deref() == Some(label))
    }) else {
        return Ok(Vec::new());
    };

    let mut series = row
        .iter()
        .filter(|(column, _)| is_year_column(column))
        .filter_map(|(column, cell)| {
            let year = column[1..].parse::<i32>().ok()?;
            let value = cell_text(cell)
                .and_then(|text| text.trim().parse::<f64>().ok())
                .and_then(NumericValue::from_f64);
            Some(YearValue { year, value })
        })
        .collect::<Vec<_>>();
    series.sort_by_key(|item| item.year);

    Ok(series)
}
