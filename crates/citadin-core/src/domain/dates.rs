use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::ValidationError;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

const LOCAL_DATETIME_FORMATS: [&[FormatItem<'static>]; 4] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
];

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(name: &'static str, value: &str) -> Result<Date, ValidationError> {
    Date::parse(value.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        name,
        value: value.to_owned(),
    })
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_iso_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Check that `value` is an ISO 8601 datetime (offset optional) or a plain date.
pub fn validate_iso_datetime(name: &'static str, value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if parse_datetime_date(trimmed).is_some() || Date::parse(trimmed, DATE_FORMAT).is_ok() {
        return Ok(());
    }

    Err(ValidationError::InvalidDateTime {
        name,
        value: value.to_owned(),
    })
}

/// Calendar date (`YYYY-MM-DD`) of an upstream timestamp.
///
/// The date is taken in the timestamp's own offset. Unparseable input falls
/// back to the text before `T`, then to the raw value.
pub fn calendar_date_of(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(date) = parse_datetime_date(trimmed) {
        return date.to_string();
    }
    if let Ok(date) = Date::parse(trimmed, DATE_FORMAT) {
        return date.to_string();
    }

    match trimmed.split_once('T') {
        Some((date, _)) => date.to_owned(),
        None => trimmed.to_owned(),
    }
}

fn parse_datetime_date(value: &str) -> Option<Date> {
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed.date());
    }

    LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(value, *format).ok())
        .map(PrimitiveDateTime::date)
}
