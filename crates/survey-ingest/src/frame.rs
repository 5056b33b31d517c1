//! Raw rows as a polars DataFrame.

use polars::prelude::*;
use survey_model::{FieldLayout, RawRow};

use crate::error::Result;

/// Build a DataFrame with one nullable string column per layout field.
///
/// Columns follow layout order and rows follow `rows` order. A missing
/// value becomes null.
pub fn rows_to_dataframe(rows: &[RawRow], layout: &FieldLayout) -> Result<DataFrame> {
    let columns: Vec<Column> = layout
        .names()
        .enumerate()
        .map(|(position, name)| {
            let values: Vec<Option<&str>> = rows.iter().map(|row| row.get(position)).collect();
            Series::new(name.into(), values).into_column()
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}
