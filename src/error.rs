//! Error handling for tide-gauge ingestion and retrieval.
//!
//! Provides error types with context for token parsing, header and
//! filename validation, row extraction, and database failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TideError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Directory traversal error: {0}")]
    DirectoryTraversal(#[from] walkdir::Error),

    #[error("Unrecognised quality flag in observation '{token}'")]
    UnrecognizedFlag { token: String },

    #[error("Malformed observation value '{token}'")]
    MalformedValue { token: String },

    #[error("Header parsing failed for file: {path} - {reason}")]
    HeaderParse { path: PathBuf, reason: String },

    #[error("Invalid tide file name '{file_name}': expected <4-char prefix><3-letter code>.txt")]
    InvalidFilename { file_name: String },

    #[error("Failed to parse row at line {line} of {path}: {reason} ('{content}')")]
    RowParse {
        path: PathBuf,
        line: usize,
        content: String,
        reason: String,
        #[source]
        source: Option<Box<TideError>>,
    },

    #[error("Observation already loaded for site {site_id} at epoch second {time}")]
    DuplicateKey { site_id: i64, time: i64 },

    #[error("No sites in database")]
    NoSites,

    #[error("Invalid coordinate: latitude {lat}, longitude {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Timestamp out of range: {message}")]
    TimestampOutOfRange { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl TideError {
    /// Create a row parse error wrapping the underlying cause
    pub fn row_parse(
        path: impl Into<PathBuf>,
        line: usize,
        content: impl Into<String>,
        source: TideError,
    ) -> Self {
        Self::RowParse {
            path: path.into(),
            line,
            content: content.into(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a row parse error for a row with the wrong shape
    pub fn malformed_row(
        path: impl Into<PathBuf>,
        line: usize,
        content: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::RowParse {
            path: path.into(),
            line,
            content: content.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a header parse error
    pub fn header_parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::HeaderParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TideError>;
