use anyhow::{Context, Result};
use tracing::info;

use survey_model::UnmappedPolicy;
use survey_report::RunSummary;
use survey_standards::{Codebook, load_codebook, resolve_codebook};

use survey_cli::pipeline::{RunOptions, default_output_path, run_pipeline};

use crate::cli::{CodebookArgs, RunArgs, UnmappedArg};
use crate::summary::{print_check, print_layout};

pub fn run_recode(args: &RunArgs) -> Result<RunSummary> {
    let mut codebook = load(&args.codebook)?;
    apply_overrides(&mut codebook, args)?;

    let options = RunOptions {
        source: args.source.clone(),
        output: args
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&args.source)),
        chunk_size: args.chunk_size,
        dry_run: args.dry_run,
    };
    let summary = run_pipeline(&codebook, &options)?;

    if let Some(path) = &args.summary_json {
        summary
            .write_json(path)
            .with_context(|| format!("write summary {}", path.display()))?;
        info!(path = %path.display(), "summary written");
    }
    Ok(summary)
}

pub fn run_layout(args: &CodebookArgs) -> Result<()> {
    let codebook = load(args)?;
    print_layout(&codebook);
    Ok(())
}

pub fn run_check(args: &CodebookArgs) -> Result<()> {
    let codebook = load(args)?;
    print_check(&codebook);
    Ok(())
}

fn load(args: &CodebookArgs) -> Result<Codebook> {
    let source = resolve_codebook(args.codebook.as_deref());
    load_codebook(&source).with_context(|| format!("load codebook {}", source.describe()))
}

fn apply_overrides(codebook: &mut Codebook, args: &RunArgs) -> Result<()> {
    if args.target.is_none() && args.unmapped.is_none() {
        return Ok(());
    }
    let mut schema = codebook.schema.clone();
    if let Some(target) = &args.target {
        schema = schema.with_population_target(target.clone());
    }
    if let Some(unmapped) = args.unmapped {
        schema = schema.with_unmapped(match unmapped {
            UnmappedArg::Missing => UnmappedPolicy::Missing,
            UnmappedArg::Unrecognized => UnmappedPolicy::Unrecognized,
        });
    }
    schema.validate().context("apply command-line overrides")?;
    codebook.schema = schema;
    Ok(())
}
