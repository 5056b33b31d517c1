#![deny(unsafe_code)]

use std::path::PathBuf;

use survey_model::SchemaError;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML codebook {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("invalid codebook {origin}: {source}")]
    Schema {
        origin: String,
        #[source]
        source: SchemaError,
    },

    #[error("code map file {path} refers to {variable}, which is not a categorical variable")]
    UnknownCodeMapVariable { path: PathBuf, variable: String },

    #[error(
        "code {code} of {variable} is labeled both {existing:?} and {incoming:?} in {path}"
    )]
    CodeMapConflict {
        path: PathBuf,
        variable: String,
        code: String,
        existing: String,
        incoming: String,
    },

    #[error("codebook {origin} names a code map file but has no directory to resolve it from")]
    UnresolvedCodeMaps { origin: String },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
