//! Sequence Resolver: translates a user query token into one or more
//! [`QueryItem`]s, or an external FASTA record directly into one.
//!
//! Resolution misses and too-short sequences are *expected* outcomes,
//! not [`KmeratorError`]s: both are surfaced as `Err(String)` here, a
//! ready-to-record `failed` report line, and callers never treat them
//! as fatal.

use bio::io::fasta;

use crate::data::{GeneInfo, ItemKind, QueryItem, Transcriptome};
use crate::error::KmeratorError;

/// Resolves one `--selection` token against the transcriptome/gene-info.
///
/// Versioned identifiers (`ENST….2`) are rejected earlier, by
/// [`crate::context::RunContext::from_args`]; this function assumes the
/// token already passed that check.
pub fn resolve_selection(
    token: &str,
    transcriptome: &Transcriptome,
    gene_info: &GeneInfo,
    k: usize,
) -> Result<Vec<QueryItem>, String> {
    if let Some(item) = resolve_as_transcript(token, transcriptome, gene_info, k)? {
        return Ok(vec![item]);
    }

    let gene_id = if token.starts_with("ENSG") {
        if gene_info.gene(token).is_some() {
            token.to_string()
        } else {
            return Err(format!("{token}: gene not found in gene-info ({token})"));
        }
    } else if let Some(id) = gene_info.gene_for_symbol(token) {
        id.to_string()
    } else if let Some(id) = gene_info.gene_for_alias(token) {
        id.to_string()
    } else {
        return Err(format!("{token}: gene not found in gene-info ({token})"));
    };

    resolve_gene(token, &gene_id, transcriptome, gene_info, k)
}

fn resolve_as_transcript(
    token: &str,
    transcriptome: &Transcriptome,
    gene_info: &GeneInfo,
    k: usize,
) -> Result<Option<QueryItem>, String> {
    if !token.starts_with("ENST") {
        return Ok(None);
    }

    let Some(seq) = transcriptome.get(token) else {
        return Err(format!("{token}: transcript not found in transcriptome ({token})"));
    };
    if seq.len() < k {
        return Err(format!("{token}: sequence too short ({} < {k})", seq.len()));
    }

    Ok(Some(QueryItem {
        given: token.to_string(),
        kind: ItemKind::Transcript,
        ensg: gene_info.gene_for_transcript(token).map(str::to_string),
        enst: token.to_string(),
        symbol: None,
        seq: seq.to_string(),
        f_id: token.to_string(),
    }))
}

fn resolve_gene(
    given: &str,
    gene_id: &str,
    transcriptome: &Transcriptome,
    gene_info: &GeneInfo,
    k: usize,
) -> Result<Vec<QueryItem>, String> {
    let record = gene_info
        .gene(gene_id)
        .ok_or_else(|| format!("{given}: gene not found in gene-info ({gene_id})"))?;

    let mut items = Vec::with_capacity(record.transcripts.len());
    for enst in &record.transcripts {
        let Some(seq) = transcriptome.get(enst) else {
            return Err(format!("{given}: transcript not found in transcriptome ({enst})"));
        };
        if seq.len() < k {
            return Err(format!("{given}: sequence too short ({} < {k})", seq.len()));
        }
        items.push(QueryItem {
            given: given.to_string(),
            kind: ItemKind::Gene,
            ensg: Some(gene_id.to_string()),
            enst: enst.clone(),
            symbol: Some(record.symbol.clone()),
            seq: seq.to_string(),
            f_id: enst.clone(),
        });
    }
    Ok(items)
}

/// Resolves every record of an external FASTA file into unannotated/chimera
/// `QueryItem`s, applying the too-short check to each in turn.
pub fn resolve_fasta_file(
    reader: fasta::Reader<impl std::io::BufRead>,
    chimera: bool,
    k: usize,
) -> Result<Vec<Result<QueryItem, String>>, KmeratorError> {
    let mut results = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| KmeratorError::TranscriptomeParse {
            details: e.to_string(),
        })?;
        let f_id = sanitize_f_id(record.id());
        let seq = String::from_utf8_lossy(record.seq()).to_uppercase();
        results.push(if seq.len() < k {
            Err(format!("{f_id}: sequence too short ({} < {k})", seq.len()))
        } else {
            Ok(QueryItem {
                given: f_id.clone(),
                kind: if chimera {
                    ItemKind::Chimera
                } else {
                    ItemKind::Unannotated
                },
                ensg: None,
                enst: String::new(),
                symbol: None,
                seq,
                f_id,
            })
        });
    }
    Ok(results)
}

/// Replaces characters unsafe for filenames with `_`.
fn sanitize_f_id(header: &str) -> String {
    header
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' { c } else { '_' })
        .collect()
}
