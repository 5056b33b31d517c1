//! CSV code-map files.
//!
//! Long codebooks keep their label tables out of the TOML file. The CSV has
//! a `variable,code,label` header and one row per code.

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use survey_model::SurveySchema;

use crate::error::StandardsError;

/// One row of a code-map file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodeMapEntry {
    pub variable: String,
    pub code: String,
    pub label: String,
}

/// Parse code-map rows. `path` is only used for error messages.
pub fn parse_code_maps(bytes: &[u8], path: &Path) -> Result<Vec<CodeMapEntry>, StandardsError> {
    let bytes = bytes.strip_prefix("\u{feff}".as_bytes()).unwrap_or(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let mut entries = Vec::new();
    for record in reader.deserialize::<CodeMapEntry>() {
        let entry = record.map_err(|err| StandardsError::Csv {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Merge code-map rows into the schema's categorical variables.
///
/// Rows may only target declared categorical variables, and a code already
/// labeled differently (in the TOML or earlier in the file) is rejected.
pub fn merge_code_maps(
    schema: &mut SurveySchema,
    entries: Vec<CodeMapEntry>,
    path: &Path,
) -> Result<(), StandardsError> {
    for entry in entries {
        let Some(variable) = schema
            .categorical
            .iter_mut()
            .find(|variable| variable.name == entry.variable)
        else {
            return Err(StandardsError::UnknownCodeMapVariable {
                path: path.to_path_buf(),
                variable: entry.variable,
            });
        };
        if let Some(existing) = variable.labels.label(&entry.code)
            && existing != entry.label
        {
            return Err(StandardsError::CodeMapConflict {
                path: path.to_path_buf(),
                variable: entry.variable,
                code: entry.code,
                existing: existing.to_string(),
                incoming: entry.label,
            });
        }
        variable.labels.insert(entry.code, entry.label);
    }
    Ok(())
}
