//! Loads the external collaborator's inputs from disk: a transcriptome
//! FASTA file (`bio::io::fasta`) and a gene-info JSON file
//! (`serde_json`).
//!
//! Dataset *acquisition* (hitting Ensembl, building the indices) stays out
//! of scope; this module only reads artifacts already on disk.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bio::io::fasta;

use crate::data::{GeneInfo, Transcriptome};
use crate::error::KmeratorError;

#[cfg(feature = "tracing")]
use tracing::info;

/// Reads a transcriptome FASTA into an in-memory [`Transcriptome`].
///
/// Sequences are upper-cased on load so downstream code can assume the
/// `ACGTN` alphabet invariant without re-checking it.
pub fn load_transcriptome(path: &Path) -> Result<Transcriptome, KmeratorError> {
    let file = File::open(path).map_err(|source| KmeratorError::TranscriptomeRead {
        source,
        path: path.to_path_buf(),
    })?;
    let reader = fasta::Reader::new(BufReader::new(file));

    let mut sequences = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|e| KmeratorError::TranscriptomeParse {
            details: e.to_string(),
        })?;
        let seq = String::from_utf8_lossy(record.seq()).to_uppercase();
        sequences.insert(record.id().to_string(), seq);
    }

    #[cfg(feature = "tracing")]
    info!(count = sequences.len(), path = %path.display(), "loaded transcriptome");

    Ok(Transcriptome::new(sequences))
}

/// Reads a gene-info JSON file into a [`GeneInfo`], building its secondary
/// symbol/alias/transcript indices.
pub fn load_geneinfo(path: &Path) -> Result<GeneInfo, KmeratorError> {
    let file = File::open(path).map_err(|source| KmeratorError::GeneInfoRead {
        source,
        path: path.to_path_buf(),
    })?;
    let mut gene_info: GeneInfo =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| KmeratorError::GeneInfoParse {
            source,
            path: path.to_path_buf(),
        })?;
    gene_info.build_indices();

    #[cfg(feature = "tracing")]
    info!(genes = gene_info.genes.len(), path = %path.display(), "loaded gene info");

    Ok(gene_info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_and_uppercases_transcriptome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcriptome.fa");
        let mut f = File::create(&path).unwrap();
        writeln!(f, ">ENST1\nacgtacgt").unwrap();
        writeln!(f, ">ENST2 some description\nGGGG").unwrap();
        drop(f);

        let transcriptome = load_transcriptome(&path).unwrap();
        assert_eq!(transcriptome.get("ENST1"), Some("ACGTACGT"));
        assert_eq!(transcriptome.get("ENST2"), Some("GGGG"));
        assert_eq!(transcriptome.len(), 2);
    }

    #[test]
    fn missing_transcriptome_file_is_a_read_error() {
        let err = load_transcriptome(Path::new("/nonexistent/transcriptome.fa")).unwrap_err();
        assert!(matches!(err, KmeratorError::TranscriptomeRead { .. }));
    }

    #[test]
    fn loads_geneinfo_and_builds_indices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geneinfo.json");
        std::fs::write(
            &path,
            r#"{
                "assembly": "GRCh38",
                "genes": {
                    "ENSG1": {
                        "symbol": "TP53",
                        "aliases": ["P53"],
                        "transcripts": ["ENST1", "ENST2"]
                    }
                }
            }"#,
        )
        .unwrap();

        let gene_info = load_geneinfo(&path).unwrap();
        assert_eq!(gene_info.assembly, "GRCh38");
        assert_eq!(gene_info.gene_for_symbol("tp53"), Some("ENSG1"));
        assert_eq!(gene_info.gene_for_transcript("ENST1"), Some("ENSG1"));
    }

    #[test]
    fn malformed_geneinfo_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geneinfo.json");
        std::fs::write(&path, "not json").unwrap();
        let err = load_geneinfo(&path).unwrap_err();
        assert!(matches!(err, KmeratorError::GeneInfoParse { .. }));
    }
}
