//! Worker Pool: fans resolved `QueryItem`s out across a `rayon` thread
//! pool, isolating per-item oracle failures, and aggregates a `Report`.
//!
//! Each work unit drives independent per-item processing through a
//! `rayon` `ParallelIterator` and returns its own `(Report, Vec<ItemOutput>)`
//! pair rather than mutating a shared sink, so results can be merged
//! after the pool drains instead of being synchronized during it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::context::RunContext;
use crate::data::{Contig, Report, SpecificKmer, Status};
use crate::error::KmeratorError;
use crate::oracle::Oracle;
use crate::resolver::resolve_selection;
use crate::specificity::{self, SpecificityContext};
use crate::{data::QueryItem, data::Transcriptome};
use crate::data::GeneInfo;

#[cfg(feature = "tracing")]
use tracing::{debug, info_span, warn};

/// One item's worth of output: the files to write, or nothing if it
/// produced no specific k-mers.
pub struct ItemOutput {
    /// Output-filename stem, already carrying the kind-specific suffix
    /// (`-gene`/`-transcript`/`-chimera`).
    pub stem: String,
    pub kmers: Vec<SpecificKmer>,
    pub contigs: Vec<Contig>,
}

/// Runs the full resolve → oracle → specificity pipeline over `selection`
/// tokens or the pre-resolved `fasta_items`, across `ctx.thread` workers.
///
/// Returns the aggregate report plus the per-item outputs to persist.
pub fn run<O: Oracle + Sync>(
    ctx: &RunContext,
    transcriptome: &Transcriptome,
    gene_info: &GeneInfo,
    fasta_items: Vec<QueryItem>,
    oracle: &O,
) -> Result<(Report, Vec<ItemOutput>), KmeratorError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(ctx.thread)
        .build()
        .map_err(|e| KmeratorError::ConfigError {
            details: format!("failed to start worker pool: {e}"),
        })?;

    let work_units: Vec<WorkUnit> = if ctx.fasta_file.is_some() {
        fasta_items.into_iter().map(WorkUnit::Item).collect()
    } else {
        ctx.selection
            .iter()
            .map(|token| WorkUnit::Token(token.clone()))
            .collect()
    };

    let spec_ctx = SpecificityContext {
        stringent: ctx.stringent,
        max_on_transcriptome: ctx.max_on_transcriptome,
        chimera: ctx.chimera,
        k: ctx.k,
        transcriptome,
        gene_info,
    };

    let results: Vec<(Report, Vec<ItemOutput>)> = pool.install(|| {
        work_units
            .into_par_iter()
            .map(|unit| process_work_unit(unit, ctx, transcriptome, gene_info, &spec_ctx, oracle))
            .collect()
    });

    let mut report = Report::new();
    let mut outputs = Vec::new();
    for (item_report, item_outputs) in results {
        report.extend(item_report);
        outputs.extend(item_outputs);
    }
    Ok((report, outputs))
}

enum WorkUnit {
    Token(String),
    Item(QueryItem),
}

fn process_work_unit<O: Oracle>(
    unit: WorkUnit,
    ctx: &RunContext,
    transcriptome: &Transcriptome,
    gene_info: &GeneInfo,
    spec_ctx: &SpecificityContext<'_>,
    oracle: &O,
) -> (Report, Vec<ItemOutput>) {
    let items = match unit {
        WorkUnit::Item(item) => vec![item],
        WorkUnit::Token(token) => match resolve_selection(&token, transcriptome, gene_info, ctx.k) {
            Ok(items) => items,
            Err(message) => {
                let mut report = Report::new();
                report.record(Status::Failed, message);
                return (report, Vec::new());
            }
        },
    };

    let mut report = Report::new();
    let mut outputs = Vec::new();
    for item in items {
        #[cfg(feature = "tracing")]
        let _span = info_span!("item", f_id = %item.f_id).entered();

        match process_one_item(&item, ctx, spec_ctx, oracle) {
            Ok((status, message, output)) => {
                report.record(status, message);
                if let Some(output) = output {
                    outputs.push(output);
                }
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                warn!(error = %e, f_id = %item.f_id, "oracle failure");
                report.record(Status::Failed, format!("{}: {e}", given_or_f_id(&item)));
            }
        }
    }
    (report, outputs)
}

fn process_one_item<O: Oracle>(
    item: &QueryItem,
    ctx: &RunContext,
    spec_ctx: &SpecificityContext<'_>,
    oracle: &O,
) -> Result<(Status, String, Option<ItemOutput>), KmeratorError> {
    let seq_path = dump_fasta(&ctx.tmpdir, &item.f_id, &item.seq)?;

    let count_gn = oracle.query(&seq_path, &ctx.genome_index)?;
    let count_tx = oracle.query(&seq_path, &ctx.transcriptome_index)?;

    if !ctx.keep {
        let _ = fs::remove_file(&seq_path);
    }

    let result = specificity::process(item, &count_gn, &count_tx, spec_ctx);

    #[cfg(feature = "tracing")]
    debug!(
        f_id = %item.f_id,
        kmers = result.kmers.len(),
        contigs = result.contigs.len(),
        "processed item"
    );

    let output = if result.kmers.is_empty() {
        None
    } else {
        Some(ItemOutput {
            stem: output_stem(item),
            kmers: result.kmers,
            contigs: result.contigs,
        })
    };

    Ok((result.status, result.message, output))
}

/// Builds the per-item output-filename stem: `{GIVEN_UPPER}-{ENST}-{level}`
/// for selection mode (level is `gene` or `transcript`), `{f_id}-chimera`
/// for chimera mode, and `{f_id}-transcript` for unannotated fasta-file
/// mode.
fn output_stem(item: &QueryItem) -> String {
    use crate::data::ItemKind;
    match item.kind {
        ItemKind::Gene => format!("{}-{}-gene", item.given.to_uppercase(), item.enst),
        ItemKind::Transcript => format!("{}-{}-transcript", item.given.to_uppercase(), item.enst),
        ItemKind::Chimera => format!("{}-chimera", item.f_id),
        ItemKind::Unannotated => format!("{}-transcript", item.f_id),
    }
}

/// Writes a single-record FASTA file for `seq` under `tmpdir`, for the
/// oracle to query against. Keyed by `f_id` so concurrent workers never
/// collide on a path.
fn dump_fasta(tmpdir: &Path, f_id: &str, seq: &str) -> Result<PathBuf, KmeratorError> {
    fs::create_dir_all(tmpdir).map_err(|source| KmeratorError::IoError {
        source,
        path: tmpdir.to_path_buf(),
    })?;
    let path = tmpdir.join(format!("{f_id}.fa"));
    let mut file = fs::File::create(&path).map_err(|source| KmeratorError::IoError {
        source,
        path: path.clone(),
    })?;
    writeln!(file, ">{f_id}\n{seq}").map_err(|source| KmeratorError::IoError {
        source,
        path: path.clone(),
    })?;
    Ok(path)
}

fn given_or_f_id(item: &QueryItem) -> &str {
    if item.given.is_empty() {
        &item.f_id
    } else {
        &item.given
    }
}
