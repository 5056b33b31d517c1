//! Population-filtered extraction.

use std::io::BufRead;
use std::num::NonZeroUsize;
use std::path::Path;

use serde::Serialize;
use survey_model::{FieldLayout, PopulationFilter, RawRow, SurveySchema};
use tracing::{debug, info, info_span};

use crate::error::{IngestError, Result};
use crate::reader::{RecordReader, SourceRecord};
use crate::record::slice_record;

/// Counts accumulated while streaming one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractSummary {
    /// Non-blank records read.
    pub records_read: u64,
    /// Records whose population key equals the target.
    pub records_matched: u64,
    pub blank_lines: u64,
    /// Records with no readable population key: too short to contain it, or
    /// the key bytes split a multi-byte character.
    pub missing_key: u64,
}

/// Matched rows of a whole source.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub rows: Vec<RawRow>,
    pub summary: ExtractSummary,
}

/// A bounded batch of matched rows.
#[derive(Debug, Clone)]
pub struct RawChunk {
    /// 0-based position of the chunk in the source.
    pub index: usize,
    pub rows: Vec<RawRow>,
}

/// Slices records and keeps those of one sub-population.
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'a> {
    layout: &'a FieldLayout,
    population: &'a PopulationFilter,
    key_position: usize,
}

impl<'a> Extractor<'a> {
    pub fn new(layout: &'a FieldLayout, population: &'a PopulationFilter) -> Result<Self> {
        let key_position =
            layout
                .position(&population.field)
                .ok_or_else(|| IngestError::UnknownKeyField {
                    field: population.field.clone(),
                })?;
        Ok(Self {
            layout,
            population,
            key_position,
        })
    }

    pub fn from_schema(schema: &'a SurveySchema) -> Result<Self> {
        Self::new(&schema.layout, &schema.population)
    }

    pub fn layout(&self) -> &'a FieldLayout {
        self.layout
    }

    /// Extract every matching row of a source into memory.
    pub fn extract<R: BufRead>(&self, records: RecordReader<R>) -> Result<Extraction> {
        let mut rows = Vec::new();
        let summary = self.stream(records, |row| {
            rows.push(row);
            Ok::<(), IngestError>(())
        })?;
        Ok(Extraction { rows, summary })
    }

    /// Open a file and extract every matching row.
    pub fn extract_file(&self, path: &Path) -> Result<Extraction> {
        self.extract(RecordReader::open(path)?)
    }

    /// Extract matching rows in chunks of at most `chunk_rows`.
    ///
    /// Only one chunk is held in memory at a time. An error from the source
    /// or from `on_chunk` stops extraction; chunks already delivered are not
    /// taken back.
    pub fn extract_chunks<R, E, F>(
        &self,
        records: RecordReader<R>,
        chunk_rows: NonZeroUsize,
        mut on_chunk: F,
    ) -> std::result::Result<ExtractSummary, E>
    where
        R: BufRead,
        E: From<IngestError>,
        F: FnMut(RawChunk) -> std::result::Result<(), E>,
    {
        let mut index = 0;
        let mut pending = Vec::with_capacity(chunk_rows.get());
        let summary = self.stream::<R, E, _>(records, |row| {
            pending.push(row);
            if pending.len() == chunk_rows.get() {
                let rows = std::mem::replace(&mut pending, Vec::with_capacity(chunk_rows.get()));
                debug!(chunk = index, rows = rows.len(), "chunk extracted");
                on_chunk(RawChunk { index, rows })?;
                index += 1;
            }
            Ok(())
        })?;
        if !pending.is_empty() || index == 0 {
            debug!(chunk = index, rows = pending.len(), "chunk extracted");
            on_chunk(RawChunk {
                index,
                rows: pending,
            })?;
        }
        Ok(summary)
    }

    fn stream<R, E, F>(
        &self,
        records: RecordReader<R>,
        mut keep: F,
    ) -> std::result::Result<ExtractSummary, E>
    where
        R: BufRead,
        E: From<IngestError>,
        F: FnMut(RawRow) -> std::result::Result<(), E>,
    {
        let span = info_span!(
            "extract",
            source = %records.path().display(),
            field = %self.population.field,
            target = %self.population.target
        );
        let _guard = span.enter();

        let mut summary = ExtractSummary::default();
        let mut records = records;
        for record in records.by_ref() {
            let SourceRecord { line_number, text } = record?;
            summary.records_read += 1;
            let row = slice_record(line_number, text.as_bytes(), self.layout);
            match row.get(self.key_position) {
                None => summary.missing_key += 1,
                Some(key) if self.population.matches(Some(key)) => {
                    summary.records_matched += 1;
                    keep(row)?;
                }
                Some(_) => {}
            }
        }
        summary.blank_lines = records.blank_lines();

        info!(
            records_read = summary.records_read,
            records_matched = summary.records_matched,
            blank_lines = summary.blank_lines,
            missing_key = summary.missing_key,
            "extraction complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use survey_model::FieldSpec;

    use super::*;

    fn layout() -> FieldLayout {
        FieldLayout::new(vec![FieldSpec::new("_STATE", 0, 2), FieldSpec::new("X", 2, 4)]).unwrap()
    }

    fn reader(text: &str) -> RecordReader<Cursor<Vec<u8>>> {
        RecordReader::new(Cursor::new(text.as_bytes().to_vec()), "input.txt")
    }

    #[test]
    fn test_exact_key_match() {
        let layout = layout();
        let population = PopulationFilter::new("_STATE", "27");
        let extractor = Extractor::new(&layout, &population).unwrap();

        let extraction = extractor
            .extract(reader("27aa\n 27b\n55cc\n2\n\n27dd\n"))
            .unwrap();
        let lines: Vec<u64> = extraction.rows.iter().map(RawRow::line_number).collect();
        assert_eq!(lines, vec![1, 6]);
        assert_eq!(
            extraction.summary,
            ExtractSummary {
                records_read: 5,
                records_matched: 2,
                blank_lines: 1,
                missing_key: 1,
            }
        );
    }

    #[test]
    fn test_split_character_key_is_missing() {
        let layout = layout();
        let population = PopulationFilter::new("_STATE", "27");
        let extractor = Extractor::new(&layout, &population).unwrap();

        let extraction = extractor.extract(reader("2\u{e9}a\n27bb\n")).unwrap();
        assert_eq!(extraction.rows.len(), 1);
        assert_eq!(extraction.summary.missing_key, 1);
        assert_eq!(extraction.summary.records_read, 2);
    }

    #[test]
    fn test_unknown_key_field() {
        let layout = layout();
        let population = PopulationFilter::new("_REGION", "27");
        assert!(matches!(
            Extractor::new(&layout, &population),
            Err(IngestError::UnknownKeyField { .. })
        ));
    }

    #[test]
    fn test_chunks_cover_all_rows() {
        let layout = layout();
        let population = PopulationFilter::new("_STATE", "27");
        let extractor = Extractor::new(&layout, &population).unwrap();

        let mut sizes = Vec::new();
        let summary = extractor
            .extract_chunks(
                reader("27a1\n27a2\n55a3\n27a4\n27a5\n27a6\n"),
                NonZeroUsize::new(2).unwrap(),
                |chunk| {
                    sizes.push((chunk.index, chunk.rows.len()));
                    Ok::<(), IngestError>(())
                },
            )
            .unwrap();
        assert_eq!(sizes, vec![(0, 2), (1, 2), (2, 1)]);
        assert_eq!(summary.records_matched, 5);
    }

    #[test]
    fn test_empty_source_yields_one_empty_chunk() {
        let layout = layout();
        let population = PopulationFilter::new("_STATE", "27");
        let extractor = Extractor::new(&layout, &population).unwrap();

        let mut chunks = 0;
        extractor
            .extract_chunks(reader(""), NonZeroUsize::new(10).unwrap(), |chunk| {
                assert!(chunk.rows.is_empty());
                chunks += 1;
                Ok::<(), IngestError>(())
            })
            .unwrap();
        assert_eq!(chunks, 1);
    }
}
