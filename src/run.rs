//! Top-level orchestration: loader → resolver → pool → output.
//!
//! A small ladder of `pub fn run*` entry points of increasing
//! configurability, each delegating to the next, down to
//! [`run_with_oracle`] which accepts any [`Oracle`] implementation so
//! tests never need a real external query binary.

use bio::io::fasta;
use std::fs;
use std::io::BufReader;

use crate::context::RunContext;
use crate::data::{GeneInfo, Report, Transcriptome};
use crate::error::KmeratorError;
use crate::oracle::{CommandOracle, Oracle};
use crate::resolver::resolve_fasta_file;
use crate::{loader, output, pool};

#[cfg(feature = "tracing")]
use tracing::info;

/// Runs a full extraction from CLI-level configuration: loads the
/// transcriptome and gene-info, resolves the requested items, drives them
/// through the worker pool against the real external query tool, and
/// writes the output files and report.
///
/// # Errors
///
/// Returns `KmeratorError` on loader I/O failures or an unwritable output
/// directory; per-item resolution/specificity/oracle outcomes are recorded
/// in the returned [`Report`] instead.
pub fn run(ctx: &RunContext) -> Result<Report, KmeratorError> {
    run_with_oracle(ctx, &CommandOracle::default())
}

/// Like [`run`], but with an injectable [`Oracle`] so callers can supply a
/// stub for testing.
pub fn run_with_oracle<O: Oracle + Sync>(ctx: &RunContext, oracle: &O) -> Result<Report, KmeratorError> {
    let transcriptome = loader::load_transcriptome(&ctx.transcriptome)?;
    let gene_info = loader::load_geneinfo(&ctx.geneinfo)?;

    #[cfg(feature = "tracing")]
    info!(
        selection = ctx.selection.len(),
        fasta_file = ?ctx.fasta_file,
        "starting run"
    );

    run_with_inputs(ctx, &transcriptome, &gene_info, oracle)
}

/// Like [`run_with_oracle`], but with a pre-loaded transcriptome and
/// gene-info, so tests can supply in-memory fixtures instead of files.
pub fn run_with_inputs<O: Oracle + Sync>(
    ctx: &RunContext,
    transcriptome: &Transcriptome,
    gene_info: &GeneInfo,
    oracle: &O,
) -> Result<Report, KmeratorError> {
    let fasta_items = if let Some(path) = &ctx.fasta_file {
        let file = fs::File::open(path).map_err(|source| KmeratorError::TranscriptomeRead {
            source,
            path: path.clone(),
        })?;
        let reader = fasta::Reader::new(BufReader::new(file));
        let resolved = resolve_fasta_file(reader, ctx.chimera, ctx.k)?;

        let mut items = Vec::new();
        let mut misses = Vec::new();
        for result in resolved {
            match result {
                Ok(item) => items.push(item),
                Err(message) => misses.push(message),
            }
        }
        (items, misses)
    } else {
        (Vec::new(), Vec::new())
    };

    let (items, misses) = fasta_items;
    let (mut report, outputs) = pool::run(ctx, transcriptome, gene_info, items, oracle)?;
    for message in misses {
        report.record(crate::data::Status::Failed, message);
    }

    let output_root = if ctx.keep { &ctx.output } else { &ctx.tmpdir };
    output::write_all(output_root, &outputs, &report)?;

    #[cfg(feature = "tracing")]
    info!(done = report.done.len(), failed = report.failed.len(), "run complete");

    Ok(report)
}
