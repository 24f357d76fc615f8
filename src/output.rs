//! Output Writer: persists per-item specific-k-mer and specific-contig
//! FASTA files under `kmers/`/`contigs/` subdirectories (newline-joined
//! records, trailing newline), plus the aggregate `report.md`, via
//! buffered `Write`.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::data::Report;
use crate::error::KmeratorError;
use crate::pool::ItemOutput;

/// Writes every item's specific-kmer/contig FASTA files under
/// `{root}/kmers/` and `{root}/contigs/`, then `{root}/report.md`.
pub fn write_all(root: &Path, outputs: &[ItemOutput], report: &Report) -> Result<(), KmeratorError> {
    let kmers_dir = root.join("kmers");
    let contigs_dir = root.join("contigs");
    create_dir(&kmers_dir)?;
    create_dir(&contigs_dir)?;

    for output in outputs {
        if !output.kmers.is_empty() {
            write_fasta(
                &kmers_dir.join(format!("{}-specific_kmers.fa", output.stem)),
                output.kmers.iter().map(|k| (k.header.as_str(), k.sequence.as_str())),
            )?;
        }
        if !output.contigs.is_empty() {
            write_fasta(
                &contigs_dir.join(format!("{}-specific_contigs.fa", output.stem)),
                output.contigs.iter().map(|c| (c.header.as_str(), c.sequence.as_str())),
            )?;
        }
    }

    write_report(&root.join("report.md"), report)
}

fn create_dir(path: &Path) -> Result<(), KmeratorError> {
    fs::create_dir_all(path).map_err(|source| KmeratorError::IoError {
        source,
        path: path.to_path_buf(),
    })
}

fn write_fasta<'a>(
    path: &PathBuf,
    records: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<(), KmeratorError> {
    let file = fs::File::create(path).map_err(|source| KmeratorError::IoError {
        source,
        path: path.clone(),
    })?;
    let mut writer = BufWriter::new(file);
    for (header, sequence) in records {
        writeln!(writer, ">{header}\n{sequence}").map_err(|source| KmeratorError::IoError {
            source,
            path: path.clone(),
        })?;
    }
    writer.flush().map_err(|source| KmeratorError::IoError {
        source,
        path: path.clone(),
    })
}

fn write_report(path: &Path, report: &Report) -> Result<(), KmeratorError> {
    let file = fs::File::create(path).map_err(|source| KmeratorError::IoError {
        source,
        path: path.to_path_buf(),
    })?;
    let mut writer = BufWriter::new(file);
    let map_err = |source| KmeratorError::IoError {
        source,
        path: path.to_path_buf(),
    };

    writeln!(writer, "# kmerator run report\n").map_err(map_err)?;
    writeln!(writer, "## done ({})\n", report.done.len()).map_err(map_err)?;
    for line in &report.done {
        writeln!(writer, "- {line}").map_err(map_err)?;
    }
    writeln!(writer, "\n## failed ({})\n", report.failed.len()).map_err(map_err)?;
    for line in &report.failed {
        writeln!(writer, "- {line}").map_err(map_err)?;
    }
    writer.flush().map_err(map_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Contig, SpecificKmer, Status};

    #[test]
    fn writes_kmer_and_contig_files_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = vec![ItemOutput {
            stem: "TP53-ENST1-transcript".to_string(),
            kmers: vec![SpecificKmer {
                position: 1,
                sequence: "ACGTA".to_string(),
                header: "TP53:ENST1.kmer1".to_string(),
            }],
            contigs: vec![Contig {
                start_position: 1,
                sequence: "ACGTACGTAC".to_string(),
                header: "TP53:ENST1.contig1 (at position 1)".to_string(),
            }],
        }];
        let mut report = Report::new();
        report.record(Status::Done, "ENST1: 1 specific kmers, 1 contigs".to_string());

        write_all(dir.path(), &outputs, &report).unwrap();

        let kmers = fs::read_to_string(dir.path().join("kmers/TP53-ENST1-transcript-specific_kmers.fa")).unwrap();
        assert!(kmers.contains(">TP53:ENST1.kmer1"));
        assert!(kmers.contains("ACGTA"));

        let contigs = fs::read_to_string(dir.path().join("contigs/TP53-ENST1-transcript-specific_contigs.fa")).unwrap();
        assert!(contigs.contains(">TP53:ENST1.contig1"));

        let report_text = fs::read_to_string(dir.path().join("report.md")).unwrap();
        assert!(report_text.contains("## done (1)"));
        assert!(report_text.contains("ENST1: 1 specific kmers"));
    }

    #[test]
    fn skips_files_for_items_with_no_kmers() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = vec![ItemOutput {
            stem: "ENST2-ENST2-transcript".to_string(),
            kmers: Vec::new(),
            contigs: Vec::new(),
        }];
        let report = Report::new();
        write_all(dir.path(), &outputs, &report).unwrap();
        assert!(!dir.path().join("kmers/ENST2-ENST2-transcript-specific_kmers.fa").exists());
    }
}
