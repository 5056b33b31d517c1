//! Delimited output of analysis tables.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use polars::prelude::*;
use survey_common::any_to_string;
use tracing::debug;

use crate::error::ReportError;

/// Writes frames with identical columns to one CSV file.
///
/// The header comes from the first frame written. Nulls become empty
/// fields and floats are written without trailing zeros.
pub struct CsvTableWriter {
    writer: Writer<File>,
    path: PathBuf,
    columns: Option<Vec<String>>,
    rows_written: usize,
}

impl CsvTableWriter {
    pub fn create(path: &Path) -> Result<Self, ReportError> {
        let writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|source| ReportError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            columns: None,
            rows_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Append a frame; the first call also writes the header row.
    pub fn write_frame(&mut self, df: &DataFrame) -> Result<(), ReportError> {
        let names: Vec<String> = df
            .get_column_names_str()
            .into_iter()
            .map(str::to_string)
            .collect();
        match &self.columns {
            Some(expected) if *expected != names => {
                return Err(ReportError::ColumnMismatch {
                    expected: expected.clone(),
                    found: names,
                });
            }
            Some(_) => {}
            None => {
                self.write_record(&names)?;
                self.columns = Some(names);
            }
        }

        let columns = df.get_columns();
        let mut record = Vec::with_capacity(columns.len());
        for idx in 0..df.height() {
            record.clear();
            for column in columns {
                record.push(any_to_string(column.get(idx)?));
            }
            self.write_record(&record)?;
        }
        self.rows_written += df.height();
        debug!(path = %self.path.display(), rows = df.height(), "frame written");
        Ok(())
    }

    /// Flush and close the file, returning the number of data rows written.
    pub fn finish(mut self) -> Result<usize, ReportError> {
        self.writer.flush().map_err(|source| ReportError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.rows_written)
    }

    fn write_record(&mut self, record: &[String]) -> Result<(), ReportError> {
        self.writer
            .write_record(record)
            .map_err(|source| ReportError::Csv {
                path: self.path.clone(),
                source,
            })
    }
}

/// Write a single frame to `path`.
pub fn write_csv(path: &Path, df: &DataFrame) -> Result<usize, ReportError> {
    let mut writer = CsvTableWriter::create(path)?;
    writer.write_frame(df)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nulls_and_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let df = df! {
            "_SEX" => &[Some("1"), None],
            "PHYSHLTH_NUM" => &[Some(15.0), Some(72.5)],
            "_SEX_LABEL" => &[Some("Male"), None],
        }
        .unwrap();

        let rows = write_csv(&path, &df).unwrap();
        assert_eq!(rows, 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "_SEX,PHYSHLTH_NUM,_SEX_LABEL\n1,15,Male\n,72.5,\n");
    }

    #[test]
    fn test_quotes_when_needed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let df = df! { "BPHIGH4_LABEL" => &["Yes, but female told only during pregnancy"] }.unwrap();
        write_csv(&path, &df).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "BPHIGH4_LABEL\n\"Yes, but female told only during pregnancy\"\n"
        );
    }

    #[test]
    fn test_mismatched_frames_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CsvTableWriter::create(&dir.path().join("out.csv")).unwrap();
        writer.write_frame(&df! { "A" => &["1"] }.unwrap()).unwrap();
        let err = writer.write_frame(&df! { "B" => &["1"] }.unwrap()).unwrap_err();
        assert!(matches!(err, ReportError::ColumnMismatch { .. }));
    }
}
