//! TOML codebooks.
//!
//! ```toml
//! [survey]
//! name = "BRFSS"
//! year = 2015
//!
//! [population]
//! field = "_STATE"
//! target = "27"
//!
//! [completion]
//! field = "DISPCODE"
//! complete = "1100"
//!
//! [[fields]]
//! name = "_STATE"
//! start = 0
//! end = 2
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use survey_model::{
    CategoricalVariable, CompletionFilter, DEFAULT_UNRECOGNIZED_LABEL, FieldLayout, FieldSpec,
    NumericVariable, PopulationFilter, SurveySchema, UnmappedPolicy,
};
use tracing::{debug, info};

use crate::code_maps::{merge_code_maps, parse_code_maps};
use crate::error::StandardsError;
use crate::hash::{sha256_hex, sha256_hex_parts};

/// BRFSS 2015 state extract codebook, restricted to Minnesota.
pub const BUNDLED_CODEBOOK: &str = include_str!("../codebooks/brfss_2015.toml");

const BUNDLED_ORIGIN: &str = "<bundled brfss_2015.toml>";

/// Where a codebook comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodebookSource {
    File(PathBuf),
    Bundled,
}

impl CodebookSource {
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Bundled => BUNDLED_ORIGIN.to_string(),
        }
    }
}

/// A loaded, validated codebook.
#[derive(Debug, Clone)]
pub struct Codebook {
    pub schema: SurveySchema,
    /// sha256 over the codebook bytes followed by the code-map bytes.
    pub fingerprint: String,
    pub source: CodebookSource,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CodebookFile {
    survey: SurveySection,
    population: PopulationFilter,
    completion: CompletionFilter,
    #[serde(default)]
    labels: LabelsSection,
    fields: Vec<FieldSpec>,
    #[serde(default)]
    numeric: Vec<NumericVariable>,
    #[serde(default)]
    categorical: Vec<CategoricalVariable>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SurveySection {
    name: String,
    #[serde(default)]
    year: Option<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LabelsSection {
    #[serde(default)]
    unmapped: UnmappedPolicy,
    #[serde(default = "default_unrecognized_label")]
    unrecognized_label: String,
    #[serde(default)]
    code_maps: Option<PathBuf>,
}

impl Default for LabelsSection {
    fn default() -> Self {
        Self {
            unmapped: UnmappedPolicy::default(),
            unrecognized_label: default_unrecognized_label(),
            code_maps: None,
        }
    }
}

fn default_unrecognized_label() -> String {
    DEFAULT_UNRECOGNIZED_LABEL.to_string()
}

/// Load the codebook a [`CodebookSource`] points at.
pub fn load_codebook(source: &CodebookSource) -> Result<Codebook, StandardsError> {
    match source {
        CodebookSource::File(path) => load_codebook_file(path),
        CodebookSource::Bundled => bundled_codebook(),
    }
}

/// Load and validate a codebook file, plus its code-map file if it names one.
pub fn load_codebook_file(path: &Path) -> Result<Codebook, StandardsError> {
    let text = std::fs::read_to_string(path).map_err(|err| StandardsError::io(path, err))?;
    let origin = path.display().to_string();
    let file = parse_file(&text, &origin)?;
    let base_dir = path.parent().unwrap_or(Path::new("."));

    let code_maps = match &file.labels.code_maps {
        Some(relative) => {
            let csv_path = base_dir.join(relative);
            let bytes = std::fs::read(&csv_path).map_err(|err| StandardsError::io(&csv_path, err))?;
            Some((csv_path, bytes))
        }
        None => None,
    };

    let mut schema = build_schema(file, &origin)?;
    if let Some((csv_path, bytes)) = &code_maps {
        let entries = parse_code_maps(bytes, csv_path)?;
        debug!(path = %csv_path.display(), entries = entries.len(), "loaded code maps");
        merge_code_maps(&mut schema, entries, csv_path)?;
    }
    validate(&schema, &origin)?;

    let fingerprint = sha256_hex_parts(
        std::iter::once(text.as_bytes())
            .chain(code_maps.as_ref().map(|(_, bytes)| bytes.as_slice())),
    );
    log_loaded(&schema, &origin, &fingerprint);
    Ok(Codebook {
        schema,
        fingerprint,
        source: CodebookSource::File(path.to_path_buf()),
    })
}

/// The bundled BRFSS 2015 codebook.
pub fn bundled_codebook() -> Result<Codebook, StandardsError> {
    let schema = parse_codebook(BUNDLED_CODEBOOK, BUNDLED_ORIGIN)?;
    let fingerprint = sha256_hex(BUNDLED_CODEBOOK.as_bytes());
    log_loaded(&schema, BUNDLED_ORIGIN, &fingerprint);
    Ok(Codebook {
        schema,
        fingerprint,
        source: CodebookSource::Bundled,
    })
}

/// Parse and validate codebook text that carries its labels inline.
///
/// `origin` names the text in error messages. A codebook that refers to a
/// code-map file must be loaded with [`load_codebook_file`] instead.
pub fn parse_codebook(text: &str, origin: &str) -> Result<SurveySchema, StandardsError> {
    let file = parse_file(text, origin)?;
    if file.labels.code_maps.is_some() {
        return Err(StandardsError::UnresolvedCodeMaps {
            origin: origin.to_string(),
        });
    }
    let schema = build_schema(file, origin)?;
    validate(&schema, origin)?;
    Ok(schema)
}

fn parse_file(text: &str, origin: &str) -> Result<CodebookFile, StandardsError> {
    toml::from_str(text).map_err(|source| StandardsError::Toml {
        origin: origin.to_string(),
        source,
    })
}

fn build_schema(file: CodebookFile, origin: &str) -> Result<SurveySchema, StandardsError> {
    let layout = FieldLayout::new(file.fields).map_err(|source| StandardsError::Schema {
        origin: origin.to_string(),
        source,
    })?;
    let mut schema = SurveySchema::new(file.survey.name, layout, file.population, file.completion)
        .with_unmapped(file.labels.unmapped)
        .with_unrecognized_label(file.labels.unrecognized_label);
    if let Some(year) = file.survey.year {
        schema = schema.with_year(year);
    }
    schema.numeric = file.numeric;
    schema.categorical = file.categorical;
    Ok(schema)
}

fn validate(schema: &SurveySchema, origin: &str) -> Result<(), StandardsError> {
    schema.validate().map_err(|source| StandardsError::Schema {
        origin: origin.to_string(),
        source,
    })
}

fn log_loaded(schema: &SurveySchema, origin: &str, fingerprint: &str) {
    info!(
        codebook = origin,
        survey = %schema.name,
        fields = schema.layout.len(),
        numeric = schema.numeric.len(),
        categorical = schema.categorical.len(),
        fingerprint = %fingerprint,
        "codebook loaded"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_codebook_is_valid() {
        let codebook = bundled_codebook().unwrap();
        let schema = &codebook.schema;
        assert_eq!(schema.name, "BRFSS");
        assert_eq!(schema.year, Some(2015));
        assert_eq!(schema.population.target, "27");
        assert_eq!(schema.completion.complete, "1100");
        assert!(schema.layout.get("_PSU").is_some_and(|f| f.is_alias()));
        assert_eq!(
            schema
                .categorical_variable("_SEX")
                .and_then(|v| v.labels.label("2")),
            Some("Female")
        );
        assert!(
            schema
                .numeric_variable("PHYSHLTH")
                .is_some_and(|v| v.sentinels.contains("77"))
        );
        assert_eq!(codebook.fingerprint.len(), 64);
        assert_eq!(codebook.source, CodebookSource::Bundled);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let text = format!("{BUNDLED_CODEBOOK}\n[extra]\nkey = 1\n");
        let err = parse_codebook(&text, "inline").unwrap_err();
        assert!(matches!(err, StandardsError::Toml { .. }));
    }

    #[test]
    fn test_code_maps_need_a_file() {
        let text = BUNDLED_CODEBOOK.replacen(
            "[labels]\n",
            "[labels]\ncode_maps = \"codes.csv\"\n",
            1,
        );
        let err = parse_codebook(&text, "inline").unwrap_err();
        assert!(matches!(err, StandardsError::UnresolvedCodeMaps { .. }));
    }
}
