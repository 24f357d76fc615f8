//! Error types for kmerator.
//!
//! Expected, per-item outcomes (a resolution miss, a too-short sequence, an
//! item with no specific k-mers) are *not* represented here: per the
//! specificity engine's contract they are recorded as report lines, not
//! propagated as errors. This enum covers only failures that abort the run
//! (`ConfigError`, I/O) or a single worker (`OracleFailure`).

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in kmerator operations.
#[derive(Debug, Error)]
pub enum KmeratorError {
    /// Bad CLI combination, missing paths, or a versioned Ensembl id.
    #[error("configuration error: {details}")]
    ConfigError { details: String },

    /// Failed to read the transcriptome FASTA file.
    #[error("failed to read transcriptome '{path}': {source}")]
    TranscriptomeRead {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to parse a transcriptome FASTA record.
    #[error("failed to parse transcriptome record: {details}")]
    TranscriptomeParse { details: String },

    /// Failed to read the gene-info JSON file.
    #[error("failed to read gene-info '{path}': {source}")]
    GeneInfoRead {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Gene-info JSON was malformed.
    #[error("failed to parse gene-info '{path}': {source}")]
    GeneInfoParse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },

    /// The external k-mer-count query tool failed for one item.
    #[error("k-mer count query failed (`{command}`): {details}")]
    OracleFailure { command: String, details: String },

    /// Output directory could not be created or written to.
    #[error("failed to write output to '{path}': {source}")]
    IoError {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = KmeratorError::ConfigError {
            details: "selection and fasta_file are mutually exclusive".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "configuration error: selection and fasta_file are mutually exclusive"
        );
    }

    #[test]
    fn oracle_failure_display() {
        let err = KmeratorError::OracleFailure {
            command: "query -s seq.fa idx.jf".to_string(),
            details: "exit status 1".to_string(),
        };
        assert!(err.to_string().contains("query -s seq.fa idx.jf"));
        assert!(err.to_string().contains("exit status 1"));
    }
}
