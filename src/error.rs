//! Error types for the price-history converter
//!
//! Errors fall into two tiers. Row-level errors are logged and the conversion
//! keeps going; file-level errors end the run.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for conversion operations
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input file could not be opened
    #[error("Failed to open input '{}': {source}", path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be created
    #[error("Failed to create output '{}': {source}", path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tokenizer failure other than end of input
    #[error("Failed to read line {line}: {source}")]
    Read {
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// Row with the wrong number of columns
    #[error("Line {line} has {found} columns, expected {expected}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Encoding a buffered row group failed
    #[error("Failed to write row group of {rows} records: {source}")]
    RowGroupWrite {
        rows: usize,
        #[source]
        source: polars::error::PolarsError,
    },

    /// Writing the footer failed
    #[error("Failed to finalize output: {0}")]
    Finalize(#[source] polars::error::PolarsError),

    /// Written file does not hold what was written
    #[error("Output verification failed: expected {expected} rows, found {found}")]
    Verification { expected: usize, found: usize },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("Failed to read config '{}': {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Log subscriber could not be installed
    #[error("Logging setup failed: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Polars data processing error
    #[error("Data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

impl ConvertError {
    /// Whether the converter may log this error and continue with the next row
    pub fn is_row_level(&self) -> bool {
        matches!(self, ConvertError::RowGroupWrite { .. })
    }

    /// Get a short title for the error (used as a log prefix)
    pub fn title(&self) -> &'static str {
        match self {
            ConvertError::OpenInput { .. } => "Input Error",
            ConvertError::CreateOutput { .. } => "Output Error",
            ConvertError::Read { .. } => "Read Error",
            ConvertError::FieldCount { .. } => "Malformed Row",
            ConvertError::RowGroupWrite { .. } => "Write Error",
            ConvertError::Finalize(_) => "Finalize Error",
            ConvertError::Verification { .. } => "Verification Error",
            ConvertError::Config(_) | ConvertError::ConfigFile { .. } => "Configuration Error",
            ConvertError::Json(_) => "JSON Error",
            ConvertError::Logging(_) => "Logging Error",
            ConvertError::Polars(_) => "Data Error",
        }
    }
}
