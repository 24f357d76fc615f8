//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

/// Extracts gene- and transcript-specific k-mers from a reference transcriptome.
///
/// Queries a user-selected set of genes/transcripts (`--selection`) or an
/// external FASTA of unannotated sequences (`--fasta-file`) against
/// pre-built genome and transcriptome k-mer-count indices, and writes the
/// k-mers and contigs that satisfy the mode's specificity rule.
#[derive(Parser, Debug)]
#[command(name = "kmerator")]
#[command(version, author, about, long_about = None)]
pub struct Args {
    /// Gene symbol, alias, ENSG, or ENST token(s) to query. A single token
    /// that names a readable file is expanded into that file's whitespace
    /// -separated, `#`-comment-stripped contents. Mutually exclusive with
    /// `--fasta-file`.
    #[arg(short, long, conflicts_with = "fasta_file", num_args = 1..)]
    pub selection: Vec<String>,

    /// External FASTA of query sequences. Mutually exclusive with `--selection`.
    #[arg(short = 'f', long)]
    pub fasta_file: Option<PathBuf>,

    /// Treat `--fasta-file` records as chimeric junction sequences.
    #[arg(long, requires = "fasta_file")]
    pub chimera: bool,

    /// Tighten the gene-mode rule: require the k-mer to appear in every
    /// isoform of the gene, not merely a consistent subset.
    #[arg(long)]
    pub stringent: bool,

    /// Maximum transcriptome occurrence count tolerated in unannotated mode.
    #[arg(long, default_value = "0")]
    pub max_on_transcriptome: u64,

    /// K-mer length (1-32). Must match the K the indices were built with.
    #[arg(short = 'k', long = "kmer-length", default_value = "31")]
    pub kmer_length: usize,

    /// Number of worker threads.
    #[arg(short = 't', long, default_value = "1")]
    pub thread: usize,

    /// Scratch directory for intermediate FASTA dumps.
    #[arg(long, default_value = "/tmp/kmerator")]
    pub tmpdir: PathBuf,

    /// Final output directory, used when `--keep` is set.
    #[arg(short, long, default_value = "kmerator_output")]
    pub output: PathBuf,

    /// Retain intermediate files; write directly to `--output` instead of tmpdir.
    #[arg(long)]
    pub keep: bool,

    /// Enable debug-level logging for this run.
    #[arg(long)]
    pub debug: bool,

    /// Reference transcriptome FASTA (transcript-id -> sequence).
    #[arg(long)]
    pub transcriptome: PathBuf,

    /// Gene-info JSON file (gene-id -> {symbol, aliases, transcripts, assembly}).
    #[arg(long)]
    pub geneinfo: PathBuf,

    /// Path to the persistent genome k-mer-count index.
    #[arg(long)]
    pub genome_index: PathBuf,

    /// Path to the persistent transcriptome k-mer-count index.
    #[arg(long)]
    pub transcriptome_index: PathBuf,
}
