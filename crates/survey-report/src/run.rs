//! Everything a run counted, in one serializable value.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use survey_ingest::ExtractSummary;
use survey_normalization::NormalizationReport;

use crate::error::ReportError;
use crate::frequency::FrequencySummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub survey: String,
    pub year: Option<u16>,
    pub source: String,
    pub codebook: String,
    pub codebook_fingerprint: String,
    /// `None` for dry runs.
    pub output: Option<String>,
    pub extract: ExtractSummary,
    pub normalization: NormalizationReport,
    pub frequencies: FrequencySummary,
}

impl RunSummary {
    /// Records that passed the population filter and the completeness filter.
    pub fn records_complete(&self) -> usize {
        self.normalization.complete_rows
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let io_err = |source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)
    }
}
