//! Minimal FASTA reader
//!
//! Loads one or more records into [`Sequence`]s for the CLI harness and
//! tests. The record name is the first whitespace-delimited word of the
//! header line.

use super::Sequence;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

/// Read every record of a FASTA file.
pub fn read_fasta(path: &Path) -> Result<Vec<Sequence>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read FASTA file {}", path.display()))?;
    parse_fasta(&data).with_context(|| format!("failed to parse {}", path.display()))
}

/// Parse FASTA-formatted text into sequences.
pub fn parse_fasta(data: &str) -> Result<Vec<Sequence>> {
    let mut records = Vec::new();
    let mut name: Option<String> = None;
    let mut bases: Vec<u8> = Vec::new();

    for line in data.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            if let Some(prev) = name.take() {
                records.push(Sequence::new(prev, &bases)?);
                bases.clear();
            }
            let word = header.split_whitespace().next().unwrap_or("");
            if word.is_empty() {
                bail!("FASTA header without a record name");
            }
            name = Some(word.to_string());
        } else {
            if name.is_none() {
                bail!("FASTA data before the first header line");
            }
            bases.extend(line.bytes().filter(|b| !b.is_ascii_whitespace()));
        }
    }

    if let Some(prev) = name.take() {
        records.push(Sequence::new(prev, &bases)?);
    }

    if records.is_empty() {
        bail!("no FASTA records found");
    }
    Ok(records)
}
