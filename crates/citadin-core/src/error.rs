use thiserror::Error;

/// Request validation errors raised before any upstream call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required parameter '{name}'")]
    MissingParameter { name: &'static str },
    #[error("parameter '{name}' must not be blank")]
    BlankParameter { name: &'static str },

    #[error("Invalid date format for '{name}': '{value}'. Use YYYY-MM-DD.")]
    InvalidDate { name: &'static str, value: String },
    #[error("Invalid datetime for '{name}': '{value}'. Use an ISO 8601 datetime.")]
    InvalidDateTime { name: &'static str, value: String },
    #[error("'date_historique' must be strictly before 'date'.")]
    HistoricalNotBeforeDate,

    #[error("parameter '{name}' must be a boolean: '{value}'")]
    InvalidBool { name: &'static str, value: String },
    #[error("parameter '{name}' is not valid percent-encoded UTF-8")]
    InvalidEncoding { name: &'static str },

    #[error("invalid configuration value for {key}: '{value}'")]
    InvalidSetting { key: &'static str, value: String },
}
