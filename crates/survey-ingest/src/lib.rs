//! Field extraction for fixed-width survey extracts.
//!
//! This crate turns a fixed-width text file into rows of raw field values:
//!
//! - **Reading**: [`RecordReader`] walks physical lines, skipping blank ones
//!   and rejecting bytes that cannot be text
//! - **Slicing**: [`slice_record`] cuts every declared byte range out of a record
//! - **Filtering**: [`Extractor`] keeps only records of the target population
//! - **Tables**: [`rows_to_dataframe`] turns raw rows into a string DataFrame
//!
//! Values are never trimmed or coerced here.

pub mod error;
pub mod extract;
pub mod frame;
pub mod reader;
pub mod record;

pub use error::{IngestError, Result};
pub use extract::{ExtractSummary, Extraction, Extractor, RawChunk};
pub use frame::rows_to_dataframe;
pub use reader::{RecordReader, SourceRecord};
pub use record::{slice_field, slice_record};
