//! Error types for form input and data loading

use thiserror::Error;

/// Errors that can occur while preparing merge input
#[derive(Debug, Error)]
pub enum MailMergeError {
    /// IO error reading files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing CSV data
    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    /// Error parsing JSON data
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A required form field was empty after trimming
    #[error("Field is required: {0}")]
    FieldRequired(String),

    /// Column not found in data source
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Unknown placeholder syntax name
    #[error("Unknown placeholder syntax: {0}")]
    UnknownSyntax(String),
}

/// Result type for mail merge operations
pub type Result<T> = std::result::Result<T, MailMergeError>;
