//! CLI argument definitions for survey-recode.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "survey-recode",
    version,
    about = "Recode a fixed-width survey extract into an analysis-ready CSV",
    long_about = "Parse a fixed-width survey extract, keep one sub-population's completed\n\
                  interviews, and add numeric and label columns for every variable the\n\
                  codebook declares.\n\n\
                  The codebook is taken from --codebook, then SURVEY_CODEBOOK, then the\n\
                  bundled BRFSS 2015 codebook."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract, filter and recode a survey file.
    Run(RunArgs),

    /// Show the field layout of a codebook.
    Layout(CodebookArgs),

    /// Validate a codebook and print its fingerprint.
    Check(CodebookArgs),
}

#[derive(Parser)]
pub struct CodebookArgs {
    /// Codebook TOML file (default: $SURVEY_CODEBOOK, then the bundled codebook).
    #[arg(long = "codebook", value_name = "PATH")]
    pub codebook: Option<PathBuf>,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Fixed-width survey extract.
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    #[command(flatten)]
    pub codebook: CodebookArgs,

    /// Output CSV path (default: <SOURCE stem>_analysis.csv next to SOURCE).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Population code to keep instead of the codebook's target.
    #[arg(long = "target", value_name = "CODE")]
    pub target: Option<String>,

    /// What unmapped codes become (overrides the codebook).
    #[arg(long = "unmapped", value_enum)]
    pub unmapped: Option<UnmappedArg>,

    /// Process matching records in chunks of this many rows.
    #[arg(long = "chunk-size", value_name = "ROWS")]
    pub chunk_size: Option<NonZeroUsize>,

    /// Also write the run summary as JSON.
    #[arg(long = "summary-json", value_name = "PATH")]
    pub summary_json: Option<PathBuf>,

    /// Report counts without writing the output CSV.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum UnmappedArg {
    Missing,
    Unrecognized,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
