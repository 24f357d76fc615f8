//! `RunContext`: the immutable, validated configuration a run operates
//! under, built once from [`crate::cli::Args`].
//!
//! This is the single place that rejects bad CLI combinations; nothing
//! downstream re-validates: selection/fasta-file exclusivity, chimera
//! requiring fasta-file, versioned-id rejection, selection-from-file
//! expansion.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Args;
use crate::error::KmeratorError;

/// Validated, immutable run configuration.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub stringent: bool,
    pub max_on_transcriptome: u64,
    pub selection: Vec<String>,
    pub fasta_file: Option<PathBuf>,
    pub chimera: bool,
    pub geneinfo: PathBuf,
    pub transcriptome: PathBuf,
    pub genome_index: PathBuf,
    pub transcriptome_index: PathBuf,
    pub k: usize,
    pub thread: usize,
    pub tmpdir: PathBuf,
    pub output: PathBuf,
    pub keep: bool,
    pub debug: bool,
}

impl RunContext {
    /// Validates `args` and builds a `RunContext`, or fails with
    /// [`KmeratorError::ConfigError`].
    pub fn from_args(args: Args) -> Result<Self, KmeratorError> {
        let selection_given = !args.selection.is_empty();
        let fasta_given = args.fasta_file.is_some();

        if selection_given == fasta_given {
            return Err(KmeratorError::ConfigError {
                details: "exactly one of --selection or --fasta-file is required".to_string(),
            });
        }

        if args.chimera && !fasta_given {
            return Err(KmeratorError::ConfigError {
                details: "--chimera requires --fasta-file".to_string(),
            });
        }

        let selection = expand_selection(&args.selection)?;
        for token in &selection {
            if has_version_suffix(token) {
                return Err(KmeratorError::ConfigError {
                    details: format!("versioned identifier not allowed: '{token}'"),
                });
            }
        }

        if !(1..=32).contains(&args.kmer_length) {
            return Err(KmeratorError::ConfigError {
                details: format!(
                    "kmer-length must be between 1 and 32, got {}",
                    args.kmer_length
                ),
            });
        }

        if args.keep {
            fs::create_dir_all(&args.output).map_err(|_| KmeratorError::ConfigError {
                details: format!("output directory '{}' is not writable", args.output.display()),
            })?;
        }

        Ok(Self {
            stringent: args.stringent,
            max_on_transcriptome: args.max_on_transcriptome,
            selection,
            fasta_file: args.fasta_file,
            chimera: args.chimera,
            geneinfo: args.geneinfo,
            transcriptome: args.transcriptome,
            genome_index: args.genome_index,
            transcriptome_index: args.transcriptome_index,
            k: args.kmer_length,
            thread: args.thread.max(1),
            tmpdir: args.tmpdir,
            output: args.output,
            keep: args.keep,
            debug: args.debug,
        })
    }
}

/// A dotted version suffix after an Ensembl-style prefix, e.g. `ENST0001.2`.
fn has_version_suffix(token: &str) -> bool {
    let is_ensembl_id = token.starts_with("ENST") || token.starts_with("ENSG");
    is_ensembl_id && token.rsplit_once('.').is_some_and(|(_, suffix)| suffix.chars().all(|c| c.is_ascii_digit()) && !suffix.is_empty())
}

/// Expands a `--selection` that names a single readable file into the
/// whitespace-separated, `#`-comment-stripped token list it contains.
fn expand_selection(selection: &[String]) -> Result<Vec<String>, KmeratorError> {
    if let [only] = selection {
        if Path::new(only).is_file() {
            let contents = fs::read_to_string(only).map_err(|e| KmeratorError::ConfigError {
                details: format!("failed to read selection file '{only}': {e}"),
            })?;
            return Ok(contents
                .lines()
                .map(|line| line.split('#').next().unwrap_or("").trim())
                .filter(|line| !line.is_empty())
                .flat_map(str::split_whitespace)
                .map(str::to_string)
                .collect());
        }
    }
    Ok(selection.to_vec())
}
