//! Codebook path resolution.

use std::ffi::OsString;
use std::path::Path;

use crate::codebook::CodebookSource;

/// Environment variable naming a codebook to use instead of the bundled one.
pub const CODEBOOK_ENV_VAR: &str = "SURVEY_CODEBOOK";

/// Decide which codebook a run uses.
///
/// Resolution order:
/// 1. an explicit path (the `--codebook` flag)
/// 2. the `SURVEY_CODEBOOK` environment variable
/// 3. the bundled BRFSS 2015 codebook
pub fn resolve_codebook(explicit: Option<&Path>) -> CodebookSource {
    resolve_with(explicit, std::env::var_os(CODEBOOK_ENV_VAR))
}

fn resolve_with(explicit: Option<&Path>, env_value: Option<OsString>) -> CodebookSource {
    if let Some(path) = explicit {
        return CodebookSource::File(path.to_path_buf());
    }
    match env_value {
        Some(value) if !value.is_empty() => CodebookSource::File(value.into()),
        _ => CodebookSource::Bundled,
    }
}
