//! Error types for survey extract ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a survey extract.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The source file is missing or could not be read.
    #[error("source file unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source was read but a record cannot be treated as text.
    #[error("malformed source {path} at line {line}: {reason}")]
    MalformedSource {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// The population key field is not part of the layout.
    #[error("population field {field} is not declared in the field layout")]
    UnknownKeyField { field: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        IngestError::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;
