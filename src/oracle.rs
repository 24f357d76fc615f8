//! Count Oracle (spec §4.A): queries a persistent k-mer-count index for the
//! abundance of every k-mer of a sequence.
//!
//! The index itself is built and maintained entirely outside this crate; all
//! that's contracted here is the functional mapping `(seq_path, index_path)
//! -> KmerCountMap`. [`CommandOracle`] implements that mapping by shelling
//! out to an external query tool, following the exact invocation shape of
//! the reference implementation's `jellyfish query -s <seq.fa> <index>`.
//! [`Oracle`] is a trait so the worker pool and specificity engine can be
//! exercised in tests without a real index or external binary on hand.

use std::path::Path;
use std::process::Command;

use crate::data::KmerCountMap;
use crate::error::KmeratorError;

#[cfg(feature = "tracing")]
use tracing::debug;

/// Queries a k-mer-count index for every distinct k-mer of a sequence file.
pub trait Oracle {
    /// Returns one entry per distinct k-mer found in `seq_path`, mapped to
    /// its count in the index at `index_path`.
    ///
    /// # Errors
    ///
    /// Returns [`KmeratorError::OracleFailure`] if the index is missing or
    /// malformed, or the external query tool exits non-zero.
    fn query(&self, seq_path: &Path, index_path: &Path) -> Result<KmerCountMap, KmeratorError>;
}

/// Default oracle: shells out to an external k-mer-count query tool.
///
/// The tool is invoked as `<binary> query -s <seq_path> <index_path>` and is
/// expected to print `KMER COUNT` on stdout, one line per distinct k-mer,
/// whitespace-separated. The tool must already be indexed at the run's K.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    binary: String,
}

impl CommandOracle {
    /// Creates an oracle that invokes `binary` as its external query tool.
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for CommandOracle {
    /// Defaults to `jellyfish`, the reference implementation's query tool.
    fn default() -> Self {
        Self::new("jellyfish")
    }
}

impl Oracle for CommandOracle {
    fn query(&self, seq_path: &Path, index_path: &Path) -> Result<KmerCountMap, KmeratorError> {
        let command_line = format!(
            "{} query -s {} {}",
            self.binary,
            seq_path.display(),
            index_path.display()
        );

        #[cfg(feature = "tracing")]
        debug!(command = %command_line, "querying k-mer count index");

        let output = Command::new(&self.binary)
            .arg("query")
            .arg("-s")
            .arg(seq_path)
            .arg(index_path)
            .output()
            .map_err(|e| KmeratorError::OracleFailure {
                command: command_line.clone(),
                details: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(KmeratorError::OracleFailure {
                command: command_line,
                details: format!(
                    "exit status {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        parse_counts(&output.stdout, &command_line)
    }
}

fn parse_counts(stdout: &[u8], command_line: &str) -> Result<KmerCountMap, KmeratorError> {
    let text = String::from_utf8_lossy(stdout);
    let mut counts = KmerCountMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(kmer), Some(count_str)) = (fields.next(), fields.next()) else {
            return Err(KmeratorError::OracleFailure {
                command: command_line.to_string(),
                details: format!("malformed output line: {line:?}"),
            });
        };
        let count: u64 = count_str
            .parse()
            .map_err(|_| KmeratorError::OracleFailure {
                command: command_line.to_string(),
                details: format!("non-numeric count in line: {line:?}"),
            })?;
        counts.insert(kmer.to_uppercase(), count);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_output() {
        let stdout = b"ACGTA 0\nCGTAC 2\nGTACG 0\n";
        let counts = parse_counts(stdout, "cmd").unwrap();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.get("ACGTA"), Some(&0));
        assert_eq!(counts.get("CGTAC"), Some(&2));
    }

    #[test]
    fn uppercases_kmers() {
        let stdout = b"acgta 1\n";
        let counts = parse_counts(stdout, "cmd").unwrap();
        assert_eq!(counts.get("ACGTA"), Some(&1));
    }

    #[test]
    fn ignores_trailing_blank_lines() {
        let stdout = b"ACGTA 0\n\n";
        let counts = parse_counts(stdout, "cmd").unwrap();
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn rejects_malformed_line() {
        let stdout = b"ACGTA\n";
        let result = parse_counts(stdout, "cmd");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("malformed"));
    }

    #[test]
    fn rejects_non_numeric_count() {
        let stdout = b"ACGTA notanumber\n";
        let result = parse_counts(stdout, "cmd");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("non-numeric"));
    }

    #[test]
    fn default_oracle_uses_jellyfish() {
        assert_eq!(CommandOracle::default().binary, "jellyfish");
    }
}
