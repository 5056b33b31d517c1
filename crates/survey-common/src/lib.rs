//! Shared utilities for the survey recoding crates.
//!
//! This crate provides common helpers used across the workspace,
//! including Polars value conversions.

pub mod values;

pub use values::{any_to_string, format_numeric, string_values};
