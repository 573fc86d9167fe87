//! Error types for the pricewatch system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pricewatch system.
#[derive(Error, Debug)]
pub enum Error {
    /// The observation source could not be opened or read.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// A required column is missing from the source header.
    #[error("Missing required column: `{0}`")]
    MissingColumn(String),

    /// A row's date does not match the configured format.
    #[error("Malformed date '{value}' on line {line} (expected format `{format}`)")]
    MalformedDate {
        line: usize,
        value: String,
        format: String,
    },

    /// A row's price is not a usable amount.
    #[error("Malformed price '{value}' on line {line}")]
    MalformedPrice { line: usize, value: String },

    /// A row is missing a required value.
    #[error("Missing value for `{field}` on line {line}")]
    MissingField { line: usize, field: String },

    /// A row could not be decoded at all.
    #[error("Malformed row on line {line}: {message}")]
    MalformedRow { line: usize, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (invalid or missing data).
    #[error("Data error: {0}")]
    Data(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a source-unavailable error.
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Error::SourceUnavailable(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a missing-field error for a given source line.
    pub fn missing_field(line: usize, field: impl Into<String>) -> Self {
        Error::MissingField {
            line,
            field: field.into(),
        }
    }

    /// Whether this error concerns a single row.
    ///
    /// Row-level errors are subject to the configured row policy; everything
    /// else aborts the load.
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            Error::MalformedDate { .. }
                | Error::MalformedPrice { .. }
                | Error::MissingField { .. }
                | Error::MalformedRow { .. }
        )
    }

    /// Source line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::MalformedDate { line, .. }
            | Error::MalformedPrice { line, .. }
            | Error::MissingField { line, .. }
            | Error::MalformedRow { line, .. } => Some(*line),
            _ => None,
        }
    }
}
