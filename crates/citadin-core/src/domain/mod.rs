//! # Domain Models
//!
//! Normalized records returned to API clients, plus the date handling shared
//! by request validation and response shaping.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`IndexRecord`] | One Atmo air-quality index observation (`{date, code_qual}`) |
//! | [`YearValue`] | One yearly SDES observation (`{year, value}`) |
//! | [`NumericValue`] | Integer-or-float number without spurious `.0` suffixes |

mod dates;
mod records;

pub use dates::{calendar_date_of, format_iso_date, parse_iso_date, validate_iso_datetime};
pub use records::{IndexRecord, NumericValue, YearValue};
