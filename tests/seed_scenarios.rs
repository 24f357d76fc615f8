//! Integration tests exercising the full resolve → oracle → specificity →
//! output pipeline through the public library API, against a stub
//! [`Oracle`] so no real k-mer-count index or external binary is needed.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use kmerator::cli::Args;
use kmerator::context::RunContext;
use kmerator::data::{GeneInfo, GeneRecord, KmerCountMap, Transcriptome};
use kmerator::error::KmeratorError;
use kmerator::oracle::Oracle;
use kmerator::run::run_with_inputs;

/// Returns `transcriptome_count` for every k-mer of the dumped sequence
/// when queried against the transcriptome index, `genome_count` against
/// the genome index.
struct FixedOracle {
    transcriptome_index: PathBuf,
    transcriptome_count: u64,
    genome_count: u64,
    k: usize,
}

impl Oracle for FixedOracle {
    fn query(&self, seq_path: &Path, index_path: &Path) -> Result<KmerCountMap, KmeratorError> {
        let dumped = fs::read_to_string(seq_path).unwrap();
        let seq = dumped.lines().nth(1).unwrap_or("");
        let count = if index_path == self.transcriptome_index {
            self.transcriptome_count
        } else {
            self.genome_count
        };
        let mut map = HashMap::new();
        if seq.len() >= self.k {
            for i in 0..=seq.len() - self.k {
                map.insert(seq[i..i + self.k].to_string(), count);
            }
        }
        Ok(map)
    }
}

fn base_args(tmpdir: &Path) -> Args {
    Args {
        selection: Vec::new(),
        fasta_file: None,
        chimera: false,
        stringent: false,
        max_on_transcriptome: 0,
        kmer_length: 5,
        thread: 2,
        tmpdir: tmpdir.to_path_buf(),
        output: tmpdir.to_path_buf(),
        keep: true,
        debug: false,
        transcriptome: PathBuf::from("unused.fa"),
        geneinfo: PathBuf::from("unused.json"),
        genome_index: PathBuf::from("genome.jf"),
        transcriptome_index: PathBuf::from("transcriptome.jf"),
    }
}

#[test]
fn versioned_id_is_rejected_before_any_worker_starts() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = base_args(dir.path());
    args.selection = vec!["ENST0001.2".to_string()];
    let err = RunContext::from_args(args).unwrap_err();
    assert!(matches!(err, KmeratorError::ConfigError { .. }));
}

#[test]
fn gene_stringent_multi_isoform_retains_only_shared_kmer() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = base_args(dir.path());
    args.selection = vec!["ENSG1".to_string()];
    args.stringent = true;
    let ctx = RunContext::from_args(args).unwrap();

    let mut seqs = HashMap::new();
    seqs.insert("T1".to_string(), "AAAAAGGGGG".to_string());
    seqs.insert("T2".to_string(), "AAAAATTTTT".to_string());
    let transcriptome = Transcriptome::new(seqs);

    let mut genes = HashMap::new();
    genes.insert(
        "ENSG1".to_string(),
        GeneRecord {
            symbol: "G1".to_string(),
            aliases: HashSet::new(),
            transcripts: HashSet::from(["T1".to_string(), "T2".to_string()]),
        },
    );
    let mut gene_info = GeneInfo {
        assembly: "GRCh38".to_string(),
        genes,
        ..Default::default()
    };
    gene_info.build_indices();

    // Only "AAAAA" is shared between both isoforms (count_tx == 2); every
    // other k-mer is private to its own isoform. Genome counts stay at 0
    // throughout so the `count_gn <= 1` half of the rule never blocks.
    struct StringentOracle {
        transcriptome_index: PathBuf,
    }
    impl Oracle for StringentOracle {
        fn query(&self, seq_path: &Path, index_path: &Path) -> Result<KmerCountMap, KmeratorError> {
            if index_path != self.transcriptome_index {
                return Ok(HashMap::new());
            }
            let dumped = fs::read_to_string(seq_path).unwrap();
            let seq = dumped.lines().nth(1).unwrap_or("");
            let mut map = HashMap::new();
            for i in 0..=seq.len().saturating_sub(5) {
                let kmer = &seq[i..i + 5];
                let count = if kmer == "AAAAA" { 2 } else { 1 };
                map.insert(kmer.to_string(), count);
            }
            Ok(map)
        }
    }
    let oracle = StringentOracle {
        transcriptome_index: ctx.transcriptome_index.clone(),
    };

    let report = run_with_inputs(&ctx, &transcriptome, &gene_info, &oracle).unwrap();
    assert_eq!(report.done.len(), 2, "one report line per isoform item");

    let t1_kmers = fs::read_to_string(dir.path().join("kmers/ENSG1-T1-gene-specific_kmers.fa")).unwrap();
    assert_eq!(t1_kmers.matches('>').count(), 1);
    assert!(t1_kmers.contains("AAAAA"));
}

#[test]
fn chimera_fasta_record_retained_when_both_counts_zero() {
    let dir = tempfile::tempdir().unwrap();
    let fasta_path = dir.path().join("query.fa");
    fs::write(&fasta_path, ">c1\nXXXXXXXX\n").unwrap();

    let mut args = base_args(dir.path());
    args.fasta_file = Some(fasta_path);
    args.chimera = true;
    let ctx = RunContext::from_args(args).unwrap();

    let transcriptome = Transcriptome::default();
    let gene_info = GeneInfo::default();
    let oracle = FixedOracle {
        transcriptome_index: ctx.transcriptome_index.clone(),
        transcriptome_count: 0,
        genome_count: 0,
        k: ctx.k,
    };

    let report = run_with_inputs(&ctx, &transcriptome, &gene_info, &oracle).unwrap();
    assert_eq!(report.done.len(), 1);

    let contigs = fs::read_to_string(dir.path().join("contigs/c1-chimera-specific_contigs.fa")).unwrap();
    assert!(contigs.contains("XXXXXXXX"));
}

#[test]
fn too_short_sequence_produces_failed_report_and_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = base_args(dir.path());
    args.selection = vec!["ENST1".to_string()];
    let ctx = RunContext::from_args(args).unwrap();

    let mut seqs = HashMap::new();
    seqs.insert("ENST1".to_string(), "ACG".to_string());
    let transcriptome = Transcriptome::new(seqs);
    let gene_info = GeneInfo::default();

    let oracle = FixedOracle {
        transcriptome_index: ctx.transcriptome_index.clone(),
        transcriptome_count: 0,
        genome_count: 0,
        k: ctx.k,
    };
    let report = run_with_inputs(&ctx, &transcriptome, &gene_info, &oracle).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].contains("too short"));
    assert!(!dir.path().join("kmers/ENST1-specific_kmers.fa").exists());
}

#[test]
fn selection_from_file_is_expanded_before_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let selection_file = dir.path().join("selection.txt");
    fs::write(&selection_file, "ENST1\n# a comment\n").unwrap();

    let mut args = base_args(dir.path());
    args.selection = vec![selection_file.to_string_lossy().to_string()];
    let ctx = RunContext::from_args(args).unwrap();
    assert_eq!(ctx.selection, vec!["ENST1".to_string()]);
}
