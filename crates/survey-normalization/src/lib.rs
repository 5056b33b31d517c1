//! Categorical normalization of survey extracts.
//!
//! Takes the raw string table produced by `survey-ingest` and returns an
//! analysis-ready table. Stages run in a fixed order:
//!
//! 1. **Completeness**: keep completed interviews only
//! 2. **Numeric coercion**: sentinel codes become missing, the rest become numbers
//! 3. **Labeling**: raw codes get a human-readable label column
//!
//! Every stage is driven by the [`survey_model::SurveySchema`]; nothing about
//! a particular survey is hard-coded. Stages return new tables and never
//! touch raw columns, so running them again on their own output changes
//! nothing.

mod completeness;
mod error;
mod executor;
mod labels;
mod numeric;

pub use completeness::filter_complete;
pub use error::NormalizationError;
pub use executor::{NormalizationReport, Normalized, normalize};
pub use labels::{CodeLookup, apply_labels, label_value, lookup_code};
pub use numeric::{NumericCounts, NumericOutcome, coerce_numeric, coerce_value, parse_decimal};
