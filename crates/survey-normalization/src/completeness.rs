//! Completed-interview filter.

use polars::prelude::*;
use survey_common::string_values;
use survey_model::CompletionFilter;

use crate::error::NormalizationError;

/// Keep rows whose completion field equals the complete code exactly.
///
/// Returns the filtered table and the number of rows dropped. The value is
/// compared untrimmed, and a null never matches.
pub fn filter_complete(
    df: &DataFrame,
    filter: &CompletionFilter,
) -> Result<(DataFrame, usize), NormalizationError> {
    let column = df
        .column(&filter.field)
        .map_err(|_| NormalizationError::ColumnNotFound(filter.field.clone()))?;
    let mask: Vec<bool> = string_values(column)?
        .iter()
        .map(|value| filter.matches(value.as_deref()))
        .collect();
    let kept = mask.iter().filter(|keep| **keep).count();

    let mask = BooleanChunked::from_slice("keep".into(), &mask);
    let filtered = df.filter(&mask)?;
    Ok((filtered, df.height() - kept))
}
