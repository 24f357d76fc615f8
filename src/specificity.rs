//! Specificity Engine: for one resolved item, decides which k-mers are
//! specific and stitches adjacent specific k-mers into contigs.
//!
//! A typed decision table plus a small `ContigBuilder` state machine.
//! Every header site uses `ENST` and `contig_start` uniformly, and
//! `kept_count` is incremented on every retention regardless of branch.

use crate::data::{Contig, GeneInfo, ItemKind, KmerCountMap, QueryItem, SpecificKmer, Status, Transcriptome};

/// Per-run parameters the decision rules and header formatting need.
#[derive(Debug, Clone, Copy)]
pub struct SpecificityContext<'a> {
    pub stringent: bool,
    pub max_on_transcriptome: u64,
    pub chimera: bool,
    pub k: usize,
    pub transcriptome: &'a Transcriptome,
    pub gene_info: &'a GeneInfo,
}

/// Result of processing one item: retained k-mers, stitched contigs, and
/// the report outcome.
pub struct SpecificityResult {
    pub kmers: Vec<SpecificKmer>,
    pub contigs: Vec<Contig>,
    pub status: Status,
    pub message: String,
}

/// Runs the specificity decision rule and contig stitching over every
/// position of `item.seq`.
#[must_use]
pub fn process(
    item: &QueryItem,
    count_gn: &KmerCountMap,
    count_tx: &KmerCountMap,
    ctx: &SpecificityContext<'_>,
) -> SpecificityResult {
    let k = ctx.k;
    let seq = item.seq.as_str();
    let n = seq.len();

    let isoforms = match item.kind {
        ItemKind::Gene => item
            .ensg
            .as_deref()
            .and_then(|ensg| ctx.gene_info.gene(ensg))
            .map(|record| {
                record
                    .transcripts
                    .iter()
                    .filter_map(|enst| ctx.transcriptome.get(enst))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    let total_isoforms = isoforms.len();

    let mut builder = ContigBuilder::new();
    let mut kmers = Vec::new();
    let mut contigs = Vec::new();

    for p in 1..=n.saturating_sub(k).saturating_add(1) {
        if p + k - 1 > n {
            break;
        }
        let kmer = &seq[p - 1..p - 1 + k];
        let gn = count_gn.get(kmer).copied().unwrap_or(0);
        let tx = count_tx.get(kmer).copied().unwrap_or(0);

        let containing = isoforms.iter().filter(|iso| iso.contains(kmer)).count() as u64;

        let retained = match item.kind {
            ItemKind::Gene => {
                if ctx.stringent {
                    gn <= 1 && tx == total_isoforms as u64 && containing == total_isoforms as u64
                } else {
                    gn <= 1 && tx == containing
                }
            }
            ItemKind::Transcript => tx == 1 && gn <= 1,
            ItemKind::Unannotated => tx <= ctx.max_on_transcriptome && gn <= 1,
            ItemKind::Chimera => tx == 0 && gn == 0,
        };

        if !retained {
            continue;
        }

        let header = kmer_header(item, p, containing, total_isoforms as u64);
        kmers.push(SpecificKmer {
            position: p,
            sequence: kmer.to_string(),
            header,
        });

        if let Some(flushed) = builder.accept(p, kmer) {
            contigs.push(finish_contig(item, flushed));
        }
    }

    if let Some(flushed) = builder.finish() {
        contigs.push(finish_contig(item, flushed));
    }

    if builder.kept_count == 0 {
        let label = item_label(item);
        return SpecificityResult {
            kmers,
            contigs,
            status: Status::Failed,
            message: format!("{label}: no specific kmers found"),
        };
    }

    let label = item_label(item);
    SpecificityResult {
        kmers,
        contigs,
        status: Status::Done,
        message: format!("{label}: {} specific kmers, {} contigs", builder.kept_total, contigs.len()),
    }
}

fn item_label(item: &QueryItem) -> &str {
    if item.given.is_empty() {
        &item.f_id
    } else {
        &item.given
    }
}

fn kmer_header(item: &QueryItem, position: usize, containing_isoforms: u64, total_isoforms: u64) -> String {
    match item.kind {
        ItemKind::Gene => format!(
            "{}:{}.kmer{position} ({containing_isoforms}/{total_isoforms})",
            item.given.to_uppercase(),
            item.enst
        ),
        ItemKind::Transcript => format!("{}:{}.kmer{position}", item.given.to_uppercase(), item.enst),
        ItemKind::Unannotated | ItemKind::Chimera => format!("{}.kmer{position}", item.f_id),
    }
}

/// Builds the stitched-contig FASTA record for a flushed run of k-mers.
fn finish_contig(item: &QueryItem, flushed: FlushedContig) -> Contig {
    let prefix = match item.kind {
        ItemKind::Gene | ItemKind::Transcript => format!("{}:{}", item.given.to_uppercase(), item.enst),
        ItemKind::Unannotated | ItemKind::Chimera => item.f_id.clone(),
    };
    let header = format!(
        "{prefix}.contig{} (at position {})",
        flushed.contig_count, flushed.contig_start
    );
    Contig {
        start_position: flushed.contig_start,
        sequence: flushed.sequence,
        header,
    }
}

struct FlushedContig {
    contig_start: usize,
    contig_count: usize,
    sequence: String,
}

/// The contig-stitching state machine, maintained per item in position
/// order.
struct ContigBuilder {
    current_contig: String,
    contig_start: usize,
    last_accepted_pos: usize,
    contig_count: usize,
    kept_count: usize,
    kept_total: usize,
}

impl ContigBuilder {
    fn new() -> Self {
        Self {
            current_contig: String::new(),
            contig_start: 0,
            last_accepted_pos: 0,
            contig_count: 0,
            kept_count: 0,
            kept_total: 0,
        }
    }

    /// Feeds one retained k-mer at position `p`; returns a flushed contig
    /// if accepting it closed out the previous run.
    fn accept(&mut self, p: usize, kmer: &str) -> Option<FlushedContig> {
        self.kept_total += 1;
        if self.kept_count == 0 {
            self.current_contig = kmer.to_string();
            self.contig_start = p;
            self.last_accepted_pos = p;
            self.kept_count = 1;
            self.contig_count = 1;
            None
        } else if p == self.last_accepted_pos + 1 {
            if let Some(last_base) = kmer.chars().last() {
                self.current_contig.push(last_base);
            }
            self.last_accepted_pos = p;
            self.kept_count += 1;
            None
        } else {
            let flushed = FlushedContig {
                contig_start: self.contig_start,
                contig_count: self.contig_count,
                sequence: std::mem::take(&mut self.current_contig),
            };
            self.contig_count += 1;
            self.current_contig = kmer.to_string();
            self.contig_start = p;
            self.last_accepted_pos = p;
            self.kept_count += 1;
            Some(flushed)
        }
    }

    /// Flushes any in-progress contig at the end of the sequence.
    fn finish(&mut self) -> Option<FlushedContig> {
        if self.current_contig.is_empty() {
            return None;
        }
        Some(FlushedContig {
            contig_start: self.contig_start,
            contig_count: self.contig_count,
            sequence: std::mem::take(&mut self.current_contig),
        })
    }
}
