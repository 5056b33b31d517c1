//! Integration tests for the run pipeline.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use survey_cli::pipeline::{RunOptions, default_output_path, run_pipeline};
use survey_ingest::IngestError;
use survey_standards::{Codebook, CodebookSource, parse_codebook};
use tempfile::TempDir;

const CODEBOOK: &str = r#"
[survey]
name = "BRFSS"
year = 2015

[population]
field = "_STATE"
target = "27"

[completion]
field = "DISPCODE"
complete = "1100"

[[fields]]
name = "_STATE"
start = 0
end = 2

[[fields]]
name = "DISPCODE"
start = 2
end = 6

[[fields]]
name = "PHYSHLTH"
start = 6
end = 8

[[fields]]
name = "_SEX"
start = 8
end = 9

[[numeric]]
name = "PHYSHLTH"
sentinels = ["77", "99"]
substitutions = { "88" = 0.0 }

[[categorical]]
name = "_SEX"
labels = { "1" = "Male", "2" = "Female" }
"#;

fn codebook() -> Codebook {
    Codebook {
        schema: parse_codebook(CODEBOOK, "test codebook").unwrap(),
        fingerprint: "0".repeat(64),
        source: CodebookSource::File(PathBuf::from("test.toml")),
    }
}

fn write_source(dir: &Path, contents: &[u8]) -> PathBuf {
    let path = dir.join("LLCP2015.ASC");
    fs::write(&path, contents).unwrap();
    path
}

fn many_records() -> Vec<u8> {
    let mut contents = Vec::new();
    for i in 0..40u32 {
        let state = if i % 4 == 0 { "55" } else { "27" };
        let disposition = if i % 5 == 0 { "1200" } else { "1100" };
        let days = match i % 6 {
            0 => "77".to_string(),
            1 => "88".to_string(),
            _ => format!("{:02}", i % 31),
        };
        let sex = ["1", "2", "3", " "][(i % 4) as usize];
        contents.extend_from_slice(format!("{state}{disposition}{days}{sex}\n").as_bytes());
    }
    contents
}

#[test]
fn three_line_file_produces_one_analysis_row() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), b"271100151\n551100152\n271200772\n");
    let options = RunOptions::new(&source);

    let summary = run_pipeline(&codebook(), &options).unwrap();

    assert_eq!(summary.extract.records_read, 3);
    assert_eq!(summary.extract.records_matched, 2);
    assert_eq!(summary.records_complete(), 1);
    let text = fs::read_to_string(dir.path().join("LLCP2015_analysis.csv")).unwrap();
    assert_eq!(
        text,
        "_STATE,DISPCODE,PHYSHLTH,_SEX,PHYSHLTH_NUM,_SEX_LABEL\n27,1100,15,1,15,Male\n"
    );
}

#[test]
fn chunked_run_matches_whole_file_run() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), &many_records());
    let codebook = codebook();

    let mut whole = RunOptions::new(&source);
    whole.output = dir.path().join("whole.csv");
    let whole_summary = run_pipeline(&codebook, &whole).unwrap();

    let mut chunked = RunOptions::new(&source);
    chunked.output = dir.path().join("chunked.csv");
    chunked.chunk_size = NonZeroUsize::new(3);
    let chunked_summary = run_pipeline(&codebook, &chunked).unwrap();

    assert_eq!(
        fs::read(&whole.output).unwrap(),
        fs::read(&chunked.output).unwrap()
    );
    assert_eq!(whole_summary.extract, chunked_summary.extract);
    assert_eq!(whole_summary.normalization, chunked_summary.normalization);
    assert_eq!(whole_summary.frequencies, chunked_summary.frequencies);
}

#[test]
fn missing_source_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let options = RunOptions::new(dir.path().join("absent.asc"));

    let error = run_pipeline(&codebook(), &options).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<IngestError>(),
        Some(IngestError::SourceUnavailable { .. })
    ));
    assert!(!options.output.exists());
}

#[test]
fn malformed_source_removes_partial_chunked_output() {
    let dir = TempDir::new().unwrap();
    let mut contents = many_records();
    contents.extend_from_slice(b"27\xff\xfe1100\n");
    let source = write_source(dir.path(), &contents);
    let mut options = RunOptions::new(&source);
    options.chunk_size = NonZeroUsize::new(2);

    let error = run_pipeline(&codebook(), &options).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<IngestError>(),
        Some(IngestError::MalformedSource { line: 41, .. })
    ));
    assert!(!options.output.exists());
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), b"271100151\n");
    let mut options = RunOptions::new(&source);
    options.dry_run = true;

    let summary = run_pipeline(&codebook(), &options).unwrap();
    assert_eq!(summary.output, None);
    assert_eq!(summary.records_complete(), 1);
    assert!(!options.output.exists());
}

#[test]
fn summary_json_round_trips_counts() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), b"271100881\n271100992\n");
    let summary = run_pipeline(&codebook(), &RunOptions::new(&source)).unwrap();

    let path = dir.path().join("summary.json");
    summary.write_json(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["normalization"]["sentinel_values"], 1);
    assert_eq!(json["frequencies"]["numeric"][0]["count"], 1);
    assert_eq!(json["frequencies"]["categorical"][0]["labels"][1]["label"], "Female");
}

#[test]
fn default_output_sits_next_to_source() {
    assert_eq!(
        default_output_path(Path::new("/data/LLCP2015.ASC")),
        PathBuf::from("/data/LLCP2015_analysis.csv")
    );
}
