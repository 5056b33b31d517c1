//! Runs the normalization stages in order.

use polars::prelude::*;
use serde::Serialize;
use survey_model::SurveySchema;
use tracing::{info, info_span};

use crate::completeness::filter_complete;
use crate::error::NormalizationError;
use crate::labels::apply_labels;
use crate::numeric::coerce_numeric;

/// Aggregate counts from one normalization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    pub input_rows: usize,
    pub complete_rows: usize,
    pub dropped_incomplete: usize,
    pub sentinel_values: usize,
    pub invalid_numeric: usize,
    pub unmapped_codes: usize,
}

impl NormalizationReport {
    /// Add the counts of another run (e.g. the next chunk).
    pub fn merge(&mut self, other: &Self) {
        self.input_rows += other.input_rows;
        self.complete_rows += other.complete_rows;
        self.dropped_incomplete += other.dropped_incomplete;
        self.sentinel_values += other.sentinel_values;
        self.invalid_numeric += other.invalid_numeric;
        self.unmapped_codes += other.unmapped_codes;
    }
}

/// The analysis table plus the counts that produced it.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub frame: DataFrame,
    pub report: NormalizationReport,
}

/// Normalize a raw extract table against a schema.
///
/// Output columns are the input columns unchanged, then one `<NAME>_NUM`
/// per numeric variable, then one `<NAME>_LABEL` per categorical variable.
/// Row order is preserved.
pub fn normalize(
    df: &DataFrame,
    schema: &SurveySchema,
) -> Result<Normalized, NormalizationError> {
    let span = info_span!("normalize", survey = %schema.name, rows = df.height());
    let _guard = span.enter();

    for name in schema.required_columns() {
        if df.column(name).is_err() {
            return Err(NormalizationError::ColumnNotFound(name.to_string()));
        }
    }

    let (complete, dropped) = filter_complete(df, &schema.completion)?;
    let (coerced, numeric) = coerce_numeric(&complete, &schema.numeric)?;
    let (labeled, unmapped) = apply_labels(
        &coerced,
        &schema.categorical,
        schema.unmapped,
        &schema.unrecognized_label,
    )?;

    let report = NormalizationReport {
        input_rows: df.height(),
        complete_rows: labeled.height(),
        dropped_incomplete: dropped,
        sentinel_values: numeric.sentinel_values,
        invalid_numeric: numeric.invalid_numeric,
        unmapped_codes: unmapped,
    };
    info!(
        input_rows = report.input_rows,
        complete_rows = report.complete_rows,
        sentinel_values = report.sentinel_values,
        invalid_numeric = report.invalid_numeric,
        unmapped_codes = report.unmapped_codes,
        "normalization complete"
    );

    Ok(Normalized {
        frame: labeled,
        report,
    })
}

#[cfg(test)]
mod tests {
    use survey_model::{
        CategoricalVariable, CompletionFilter, FieldLayout, FieldSpec, NumericVariable,
        PopulationFilter,
    };

    use super::*;

    fn schema() -> SurveySchema {
        let layout = FieldLayout::new(vec![
            FieldSpec::new("_STATE", 0, 2),
            FieldSpec::new("DISPCODE", 2, 6),
            FieldSpec::new("PHYSHLTH", 6, 8),
            FieldSpec::new("_SEX", 8, 9),
        ])
        .unwrap();
        SurveySchema::new(
            "test",
            layout,
            PopulationFilter::new("_STATE", "27"),
            CompletionFilter::new("DISPCODE", "1100"),
        )
        .with_numeric(NumericVariable::new("PHYSHLTH").with_sentinels(["77", "99"]))
        .with_categorical(CategoricalVariable::new("_SEX").with_label("1", "Male"))
    }

    #[test]
    fn test_missing_required_column() {
        let df = df! { "DISPCODE" => &["1100"], "_SEX" => &["1"] }.unwrap();
        let err = normalize(&df, &schema()).unwrap_err();
        assert!(matches!(err, NormalizationError::ColumnNotFound(name) if name == "PHYSHLTH"));
    }

    #[test]
    fn test_report_counts() {
        let df = df! {
            "_STATE" => &["27", "27", "27", "27"],
            "DISPCODE" => &["1100", "1100", "1200", "1100"],
            "PHYSHLTH" => &["77", "xx", "05", "10"],
            "_SEX" => &["1", "4", "1", " "],
        }
        .unwrap();
        let normalized = normalize(&df, &schema()).unwrap();
        assert_eq!(
            normalized.report,
            NormalizationReport {
                input_rows: 4,
                complete_rows: 3,
                dropped_incomplete: 1,
                sentinel_values: 1,
                invalid_numeric: 1,
                unmapped_codes: 1,
            }
        );
    }

    #[test]
    fn test_merge_reports() {
        let mut total = NormalizationReport {
            input_rows: 2,
            complete_rows: 1,
            dropped_incomplete: 1,
            ..Default::default()
        };
        total.merge(&NormalizationReport {
            input_rows: 3,
            complete_rows: 3,
            unmapped_codes: 2,
            ..Default::default()
        });
        assert_eq!(total.input_rows, 5);
        assert_eq!(total.complete_rows, 4);
        assert_eq!(total.unmapped_codes, 2);
    }
}
