use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while normalizing a table.
#[derive(Debug, Error)]
pub enum NormalizationError {
    /// A column the schema relies on is absent from the input table.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}
