//! Data model for the specificity pipeline: a read-only transcriptome
//! and gene catalogue supplied by the external dataset collaborator, the
//! per-token `QueryItem`s produced by the resolver, the k-mer count maps
//! returned by the oracle, and the specific k-mers/contigs produced by
//! the specificity engine.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Mapping from transcript-id (e.g. `ENST00000456328`) to nucleotide sequence.
///
/// Read-only after construction; shared across worker threads.
#[derive(Debug, Clone, Default)]
pub struct Transcriptome(HashMap<String, String>);

impl Transcriptome {
    #[must_use]
    pub fn new(sequences: HashMap<String, String>) -> Self {
        Self(sequences)
    }

    #[must_use]
    pub fn get(&self, transcript_id: &str) -> Option<&str> {
        self.0.get(transcript_id).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, transcript_id: &str) -> bool {
        self.0.contains_key(transcript_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-gene metadata record: `{symbol, aliases, transcripts, assembly}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneRecord {
    pub symbol: String,
    #[serde(default)]
    pub aliases: HashSet<String>,
    pub transcripts: HashSet<String>,
}

/// Mapping from gene-id to its record, plus the secondary symbol/alias/
/// transcript indices the resolver needs to go the other direction.
///
/// The `assembly` field is a single process-wide invariant tagged to the
/// dataset release; it is carried here rather than per-gene.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneInfo {
    pub assembly: String,
    pub genes: HashMap<String, GeneRecord>,
    #[serde(skip)]
    symbol_to_gene: HashMap<String, String>,
    #[serde(skip)]
    alias_to_gene: HashMap<String, String>,
    #[serde(skip)]
    transcript_to_gene: HashMap<String, String>,
}

impl GeneInfo {
    /// Builds the secondary (symbol/alias/transcript → gene-id) indices.
    ///
    /// Must be called once after deserializing or otherwise constructing
    /// `genes` directly, since those indices are not themselves serialized.
    pub fn build_indices(&mut self) {
        self.symbol_to_gene.clear();
        self.alias_to_gene.clear();
        self.transcript_to_gene.clear();
        for (gene_id, record) in &self.genes {
            self.symbol_to_gene
                .insert(record.symbol.to_uppercase(), gene_id.clone());
            for alias in &record.aliases {
                self.alias_to_gene
                    .insert(alias.to_uppercase(), gene_id.clone());
            }
            for transcript_id in &record.transcripts {
                self.transcript_to_gene
                    .insert(transcript_id.clone(), gene_id.clone());
            }
        }
    }

    #[must_use]
    pub fn gene(&self, gene_id: &str) -> Option<&GeneRecord> {
        self.genes.get(gene_id)
    }

    #[must_use]
    pub fn gene_for_symbol(&self, symbol: &str) -> Option<&str> {
        self.symbol_to_gene
            .get(&symbol.to_uppercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn gene_for_alias(&self, alias: &str) -> Option<&str> {
        self.alias_to_gene
            .get(&alias.to_uppercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn gene_for_transcript(&self, transcript_id: &str) -> Option<&str> {
        self.transcript_to_gene.get(transcript_id).map(String::as_str)
    }
}

/// The kind of a query item, deciding which specificity rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Resolved from a gene token (ENSG, symbol, or alias).
    Gene,
    /// Resolved from a transcript token (ENST), annotated in the transcriptome.
    Transcript,
    /// Read from an external FASTA file, treated as unannotated.
    Unannotated,
    /// Read from an external FASTA file with `--chimera` set.
    Chimera,
}

/// A single resolved query, ready for the specificity engine.
#[derive(Debug, Clone)]
pub struct QueryItem {
    /// The raw user token, preserved verbatim for report messages.
    pub given: String,
    pub kind: ItemKind,
    pub ensg: Option<String>,
    /// Transcript id. Empty for unannotated/chimera items with no Ensembl identity.
    pub enst: String,
    pub symbol: Option<String>,
    pub seq: String,
    /// Filesystem-safe stem used for output filenames and temporary FASTA dumps.
    pub f_id: String,
}

impl QueryItem {
    #[must_use]
    pub fn is_gene_level(&self) -> bool {
        matches!(self.kind, ItemKind::Gene)
    }
}

/// Mapping from k-mer string to its occurrence count in an index.
pub type KmerCountMap = HashMap<String, u64>;

/// A specific k-mer retained by the specificity engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecificKmer {
    /// 1-based index into the query sequence.
    pub position: usize,
    pub sequence: String,
    pub header: String,
}

/// A contig formed by stitching together adjacent specific k-mers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    pub start_position: usize,
    pub sequence: String,
    pub header: String,
}

/// Outcome of processing one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Done,
    Failed,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// Aggregate run report: status → ordered human-readable lines.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub done: Vec<String>,
    pub failed: Vec<String>,
}

impl Report {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, status: Status, message: String) {
        match status {
            Status::Done => self.done.push(message),
            Status::Failed => self.failed.push(message),
        }
    }

    pub fn extend(&mut self, other: Self) {
        self.done.extend(other.done);
        self.failed.extend(other.failed);
    }
}
