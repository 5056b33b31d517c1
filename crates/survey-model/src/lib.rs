//! Survey extract data model.
//!
//! Types shared by the extraction and normalization crates:
//!
//! - **Field layout**: named half-open byte ranges over a fixed-width record
//! - **Raw rows**: untrimmed text values sliced out of one record
//! - **Code maps and sentinel sets**: per-variable codebook entries
//! - **Survey schema**: the validated configuration object passed to every stage
//!
//! Everything here is plain data plus validation. Reading files lives in
//! `survey-ingest` and `survey-standards`.

#![deny(unsafe_code)]

mod codelist;
mod error;
mod layout;
mod naming;
mod row;
mod schema;
mod variable;

pub use codelist::{CodeMap, SentinelSet};
pub use error::SchemaError;
pub use layout::{FieldLayout, FieldSpec};
pub use naming::{LABEL_SUFFIX, NUMERIC_SUFFIX, label_column, numeric_column};
pub use row::RawRow;
pub use schema::{
    CompletionFilter, DEFAULT_UNRECOGNIZED_LABEL, MAX_IMPLIED_DECIMALS, PopulationFilter,
    SurveySchema,
};
pub use variable::{CategoricalVariable, NumericVariable, UnmappedPolicy};
