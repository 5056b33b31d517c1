//! Output for normalized survey tables.
//!
//! - **CSV**: [`CsvTableWriter`] writes one or more frames to a single file
//! - **Frequencies**: [`FrequencySummary`] tallies labels and numeric ranges
//! - **Run summary**: [`RunSummary`] bundles every count of a run for JSON output

mod csv_table;
mod error;
mod frequency;
mod run;

pub use csv_table::{CsvTableWriter, write_csv};
pub use error::ReportError;
pub use frequency::{CategoricalTally, FrequencySummary, LabelCount, NumericTally};
pub use run::RunSummary;
