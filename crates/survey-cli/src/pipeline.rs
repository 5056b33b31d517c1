//! The extract, normalize and output stages of one run.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

use survey_ingest::{ExtractSummary, Extractor, RecordReader, rows_to_dataframe};
use survey_model::SurveySchema;
use survey_normalization::{NormalizationReport, normalize};
use survey_report::{CsvTableWriter, FrequencySummary, RunSummary};
use survey_standards::Codebook;

/// Settings for one run, after CLI defaults have been applied.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source: PathBuf,
    /// Where the analysis CSV goes; ignored for dry runs.
    pub output: PathBuf,
    /// Process matching rows in chunks of this size instead of all at once.
    pub chunk_size: Option<NonZeroUsize>,
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let output = default_output_path(&source);
        Self {
            source,
            output,
            chunk_size: None,
            dry_run: false,
        }
    }
}

/// `<dir>/<stem>_analysis.csv` next to the source file.
pub fn default_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "survey".to_string());
    source.with_file_name(format!("{stem}_analysis.csv"))
}

struct StageTotals {
    extract: ExtractSummary,
    normalization: NormalizationReport,
    frequencies: FrequencySummary,
}

/// Run the whole pipeline for one source file.
///
/// On failure no output file is left behind. In whole-file mode the output
/// is only created once every record has been read and normalized; in
/// chunked mode a partially written file is removed.
pub fn run_pipeline(codebook: &Codebook, options: &RunOptions) -> Result<RunSummary> {
    let schema = &codebook.schema;
    let span = info_span!("run", source = %options.source.display(), survey = %schema.name);
    let _guard = span.enter();

    let output = (!options.dry_run).then_some(options.output.as_path());
    let totals = match options.chunk_size {
        Some(chunk_rows) => run_chunked(schema, &options.source, output, chunk_rows)?,
        None => run_whole(schema, &options.source, output)?,
    };

    info!(
        records_read = totals.extract.records_read,
        records_matched = totals.extract.records_matched,
        records_complete = totals.normalization.complete_rows,
        "run complete"
    );
    Ok(RunSummary {
        survey: schema.name.clone(),
        year: schema.year,
        source: options.source.display().to_string(),
        codebook: codebook.source.describe(),
        codebook_fingerprint: codebook.fingerprint.clone(),
        output: output.map(|path| path.display().to_string()),
        extract: totals.extract,
        normalization: totals.normalization,
        frequencies: totals.frequencies,
    })
}

fn run_whole(schema: &SurveySchema, source: &Path, output: Option<&Path>) -> Result<StageTotals> {
    let extractor = Extractor::from_schema(schema)?;
    let extraction = extractor
        .extract_file(source)
        .with_context(|| format!("extract {}", source.display()))?;
    let raw = rows_to_dataframe(&extraction.rows, &schema.layout)?;
    let normalized = normalize(&raw, schema).context("normalize")?;
    let frequencies = FrequencySummary::from_frame(schema, &normalized.frame)?;

    if let Some(path) = output {
        write_output(path, &normalized.frame)?;
    }
    Ok(StageTotals {
        extract: extraction.summary,
        normalization: normalized.report,
        frequencies,
    })
}

fn run_chunked(
    schema: &SurveySchema,
    source: &Path,
    output: Option<&Path>,
    chunk_rows: NonZeroUsize,
) -> Result<StageTotals> {
    let extractor = Extractor::from_schema(schema)?;
    let records = RecordReader::open(source)
        .with_context(|| format!("extract {}", source.display()))?;
    let mut writer = match output {
        Some(path) => Some(
            CsvTableWriter::create(path)
                .with_context(|| format!("create {}", path.display()))?,
        ),
        None => None,
    };
    let mut normalization = NormalizationReport::default();
    let mut frequencies = FrequencySummary::new(schema);

    let extracted = extractor
        .extract_chunks(records, chunk_rows, |chunk| -> Result<()> {
            let raw = rows_to_dataframe(&chunk.rows, &schema.layout)?;
            let normalized = normalize(&raw, schema)
                .with_context(|| format!("normalize chunk {}", chunk.index))?;
            normalization.merge(&normalized.report);
            frequencies.add_frame(&normalized.frame)?;
            if let Some(writer) = writer.as_mut() {
                writer.write_frame(&normalized.frame)?;
            }
            Ok(())
        })
        .with_context(|| format!("extract {}", source.display()))
        .and_then(|extract| {
            if let Some(writer) = writer {
                let path = writer.path().to_path_buf();
                let rows = writer.finish()?;
                info!(path = %path.display(), rows, "output written");
            }
            Ok(extract)
        });
    let extract = match extracted {
        Ok(extract) => extract,
        Err(error) => {
            if let Some(path) = output {
                remove_partial_output(path);
            }
            return Err(error);
        }
    };
    Ok(StageTotals {
        extract,
        normalization,
        frequencies,
    })
}

fn write_output(path: &Path, frame: &DataFrame) -> Result<()> {
    let span = info_span!("output", path = %path.display());
    let _guard = span.enter();
    let mut writer =
        CsvTableWriter::create(path).with_context(|| format!("create {}", path.display()))?;
    let written = writer
        .write_frame(frame)
        .and_then(|()| writer.finish());
    match written {
        Ok(rows) => {
            info!(rows, "output written");
            Ok(())
        }
        Err(error) => {
            remove_partial_output(path);
            Err(error).with_context(|| format!("write {}", path.display()))
        }
    }
}

fn remove_partial_output(path: &Path) {
    if path.exists()
        && let Err(error) = std::fs::remove_file(path)
    {
        warn!(path = %path.display(), %error, "could not remove partial output");
    }
}
