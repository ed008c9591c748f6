//! HTTP request handlers for the proxy API.

pub mod air_quality;
pub mod atmo;
pub mod health;
pub mod indicators;
pub mod insee_emploi;
pub mod sdes;

use citadin_core::ValidationError;

/// Value of a query parameter that must be present.
pub(crate) fn required(
    name: &'static str,
    value: Option<String>,
) -> Result<String, ValidationError> {
    optional(name, value)?.ok_or(ValidationError::MissingParameter { name })
}

/// Value of an optional query parameter.
///
/// Percent-escapes that are not UTF-8 decode to U+FFFD and are rejected
/// rather than forwarded upstream.
pub(crate) fn optional(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<String>, ValidationError> {
    match value {
        Some(text) if text.contains(char::REPLACEMENT_CHARACTER) => {
            Err(ValidationError::InvalidEncoding { name })
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_parameter_is_reported_by_name() {
        assert_eq!(
            required("date", None),
            Err(ValidationError::MissingParameter { name: "date" })
        );
        assert_eq!(required("date", Some(String::from("2025-01-01"))).as_deref(), Ok("2025-01-01"));
    }

    #[test]
    fn lossy_decoded_values_are_rejected() {
        assert_eq!(
            optional("geo", Some(String::from("COM-\u{fffd}"))),
            Err(ValidationError::InvalidEncoding { name: "geo" })
        );
        assert_eq!(optional("geo", None), Ok(None));
    }
}
