//! Survey codebook loading.
//!
//! A codebook is a TOML file describing one survey year's record layout,
//! filters and variable declarations, optionally paired with a CSV file of
//! code labels. Loading it produces a validated [`survey_model::SurveySchema`]
//! plus a sha256 fingerprint of the bytes it came from.

#![deny(unsafe_code)]

pub mod code_maps;
pub mod codebook;
pub mod error;
pub mod hash;
pub mod paths;

pub use crate::codebook::{
    BUNDLED_CODEBOOK, Codebook, CodebookSource, bundled_codebook, load_codebook,
    load_codebook_file, parse_codebook,
};
pub use crate::error::StandardsError;
pub use crate::paths::{CODEBOOK_ENV_VAR, resolve_codebook};
