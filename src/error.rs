//! Error types for csv2influx.

use thiserror::Error;

use crate::protocol::EncodeError;

/// Main error type for the converter.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Line {line}: {source}")]
    Row {
        line: usize,
        #[source]
        source: EncodeError,
    },

    #[error("Line {line}: received {found} values for {expected} labels")]
    RowWidth {
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("Invalid column spec: {0}")]
    InvalidColumnSpec(String),

    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid write URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Write endpoint answered {status}: {body}")]
    DeliveryFailure { status: u16, body: String },
}

impl Error {
    /// Attach the CSV line number to an encoding error.
    pub fn at_line(line: usize, source: EncodeError) -> Self {
        Error::Row { line, source }
    }
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
