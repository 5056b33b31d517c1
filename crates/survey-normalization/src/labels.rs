//! Code-to-label recoding.

use polars::prelude::*;
use survey_common::string_values;
use survey_model::{CategoricalVariable, UnmappedPolicy};
use tracing::debug;

use crate::error::NormalizationError;

/// How a raw categorical value relates to its code map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLookup<'a> {
    Label(&'a str),
    /// Null, or nothing but whitespace.
    Blank,
    /// A non-blank code the code map does not define.
    Unmapped,
}

/// Look a raw value up in a variable's code map, ignoring surrounding
/// ASCII whitespace.
pub fn lookup_code<'a>(raw: Option<&str>, variable: &'a CategoricalVariable) -> CodeLookup<'a> {
    let Some(code) = raw.map(str::trim_ascii).filter(|code| !code.is_empty()) else {
        return CodeLookup::Blank;
    };
    match variable.labels.label(code) {
        Some(label) => CodeLookup::Label(label),
        None => CodeLookup::Unmapped,
    }
}

/// Label for one raw value, or `None` for missing.
///
/// Blank values are always missing. Unmapped codes are missing under
/// [`UnmappedPolicy::Missing`] and get `unrecognized_label` under
/// [`UnmappedPolicy::Unrecognized`].
///
/// ```
/// use survey_model::{CategoricalVariable, UnmappedPolicy};
/// use survey_normalization::label_value;
///
/// let sex = CategoricalVariable::new("_SEX")
///     .with_label("1", "Male")
///     .with_label("2", "Female");
///
/// assert_eq!(label_value(Some("1"), &sex, UnmappedPolicy::Missing, "?"), Some("Male"));
/// assert_eq!(label_value(Some("3"), &sex, UnmappedPolicy::Missing, "?"), None);
/// ```
pub fn label_value<'a>(
    raw: Option<&str>,
    variable: &'a CategoricalVariable,
    policy: UnmappedPolicy,
    unrecognized_label: &'a str,
) -> Option<&'a str> {
    match (lookup_code(raw, variable), policy) {
        (CodeLookup::Label(label), _) => Some(label),
        (CodeLookup::Unmapped, UnmappedPolicy::Unrecognized) => Some(unrecognized_label),
        (CodeLookup::Unmapped, UnmappedPolicy::Missing) | (CodeLookup::Blank, _) => None,
    }
}

/// Add a `<NAME>_LABEL` string column for every categorical variable.
///
/// Returns the new table and the number of unmapped codes seen. The raw
/// column is kept unchanged, and an existing label column is replaced.
pub fn apply_labels(
    df: &DataFrame,
    variables: &[CategoricalVariable],
    policy: UnmappedPolicy,
    unrecognized_label: &str,
) -> Result<(DataFrame, usize), NormalizationError> {
    let mut result = df.clone();
    let mut unmapped_total = 0;

    for variable in variables {
        let column = df
            .column(&variable.name)
            .map_err(|_| NormalizationError::ColumnNotFound(variable.name.clone()))?;
        let raw = string_values(column)?;

        let mut unmapped = 0;
        let labels: Vec<Option<&str>> = raw
            .iter()
            .map(|value| {
                let value = value.as_deref();
                if lookup_code(value, variable) == CodeLookup::Unmapped {
                    unmapped += 1;
                }
                label_value(value, variable, policy, unrecognized_label)
            })
            .collect();

        debug!(variable = %variable.name, unmapped, "labels applied");
        unmapped_total += unmapped;
        result.with_column(Series::new(variable.output_column().into(), labels))?;
    }

    Ok((result, unmapped_total))
}
