//! Sentinel-aware numeric coercion.

use polars::prelude::*;
use survey_common::string_values;
use survey_model::NumericVariable;
use tracing::debug;

use crate::error::NormalizationError;

/// What a raw numeric field resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericOutcome {
    Value(f64),
    /// A reserved non-answer code.
    Sentinel,
    /// Null, or nothing but whitespace.
    Blank,
    /// Not a finite decimal number.
    Invalid,
}

impl NumericOutcome {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(value),
            Self::Sentinel | Self::Blank | Self::Invalid => None,
        }
    }
}

/// Sentinel and invalid counts from one coercion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumericCounts {
    pub sentinel_values: usize,
    pub invalid_numeric: usize,
}

/// Parse a plain decimal: optional sign, digits, optional fraction.
///
/// Exponents, `NaN` and infinities are rejected.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !all_digits(whole) || !all_digits(fraction) {
        return None;
    }
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Resolve one raw value of a numeric variable.
///
/// Surrounding ASCII whitespace is ignored. Sentinels are checked first,
/// then substitutions, then the value is parsed and scaled by the
/// variable's implied decimals.
///
/// ```
/// use survey_model::NumericVariable;
/// use survey_normalization::{NumericOutcome, coerce_value};
///
/// let physhlth = NumericVariable::new("PHYSHLTH").with_sentinels(["77", "99"]);
/// assert_eq!(coerce_value(Some("15"), &physhlth), NumericOutcome::Value(15.0));
/// assert_eq!(coerce_value(Some("77"), &physhlth), NumericOutcome::Sentinel);
/// ```
pub fn coerce_value(raw: Option<&str>, variable: &NumericVariable) -> NumericOutcome {
    let Some(code) = raw.map(str::trim_ascii).filter(|code| !code.is_empty()) else {
        return NumericOutcome::Blank;
    };
    if variable.sentinels.contains(code) {
        return NumericOutcome::Sentinel;
    }
    if let Some(value) = variable.substitutions.get(code) {
        return NumericOutcome::Value(*value);
    }
    let Some(value) = parse_decimal(code) else {
        return NumericOutcome::Invalid;
    };
    match i32::try_from(variable.implied_decimals) {
        Ok(0) => NumericOutcome::Value(value),
        Ok(places) => NumericOutcome::Value(value / 10f64.powi(places)),
        // Only reachable when the schema was never validated.
        Err(_) => NumericOutcome::Invalid,
    }
}

/// Add a `<NAME>_NUM` Float64 column for every numeric variable.
///
/// Raw columns are left as they are. An existing `<NAME>_NUM` column is
/// replaced in place.
pub fn coerce_numeric(
    df: &DataFrame,
    variables: &[NumericVariable],
) -> Result<(DataFrame, NumericCounts), NormalizationError> {
    let mut result = df.clone();
    let mut counts = NumericCounts::default();

    for variable in variables {
        let column = df
            .column(&variable.name)
            .map_err(|_| NormalizationError::ColumnNotFound(variable.name.clone()))?;
        let raw = string_values(column)?;

        let mut sentinels = 0;
        let mut invalid = 0;
        let values: Vec<Option<f64>> = raw
            .iter()
            .map(|value| {
                let outcome = coerce_value(value.as_deref(), variable);
                match outcome {
                    NumericOutcome::Sentinel => sentinels += 1,
                    NumericOutcome::Invalid => invalid += 1,
                    NumericOutcome::Value(_) | NumericOutcome::Blank => {}
                }
                outcome.value()
            })
            .collect();

        debug!(
            variable = %variable.name,
            sentinels,
            invalid,
            "numeric coercion"
        );
        counts.sentinel_values += sentinels;
        counts.invalid_numeric += invalid;
        result.with_column(Series::new(variable.output_column().into(), values))?;
    }

    Ok((result, counts))
}
