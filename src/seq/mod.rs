//! DNA sequence handling
//!
//! A [`Sequence`] is an immutable, normalized character buffer plus a contig
//! name. Normalization happens once at construction: bases are uppercased,
//! `U` becomes `T`, IUPAC ambiguity codes and the `X` repeat mask pass
//! through, and anything else collapses to `N`. All downstream tables are
//! built over the normalized buffer, so queries must be normalized with the
//! same rules (see [`normalize_pattern`]).

pub mod fasta;

use anyhow::{Result, bail};
use rustc_hash::FxHashMap;

/// Normalize a single base: uppercase, `U`→`T`, unknown→`N`.
///
/// The accepted alphabet is {A,C,G,T}, the IUPAC ambiguity codes
/// {R,Y,S,W,K,M,B,D,H,V,N} and the repeat-mask character `X`.
#[inline]
pub fn normalize_base(b: u8) -> u8 {
    match b.to_ascii_uppercase() {
        b'U' => b'T',
        c @ (b'A' | b'C' | b'G' | b'T') => c,
        c @ (b'R' | b'Y' | b'S' | b'W' | b'K' | b'M') => c,
        c @ (b'B' | b'D' | b'H' | b'V' | b'N') => c,
        b'X' => b'X',
        _ => b'N',
    }
}

/// Watson-Crick complement of a normalized base, extended over the IUPAC
/// ambiguity codes. `N` and the repeat mask `X` are self-complementary.
#[inline]
pub fn complement(b: u8) -> u8 {
    match b {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        // S, W, N, X map to themselves
        c => c,
    }
}

/// Reverse complement of a normalized slice.
pub fn revcomp(bases: &[u8]) -> Vec<u8> {
    bases.iter().rev().map(|&b| complement(b)).collect()
}

/// Normalize a query pattern with the same rules as sequence construction.
///
/// An empty pattern is a reported error, never a silent "no match".
pub fn normalize_pattern(pattern: &[u8]) -> Result<Vec<u8>> {
    if pattern.is_empty() {
        bail!("empty query pattern");
    }
    Ok(pattern.iter().map(|&b| normalize_base(b)).collect())
}

/// An immutable named DNA sequence.
///
/// Length is fixed at construction; the buffer is normalized and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    name: String,
    bases: Vec<u8>,
}

impl Sequence {
    /// Create a sequence from raw input, normalizing every base.
    ///
    /// Empty input is a construction-time fatal error: no index can be
    /// built over a zero-length sequence.
    pub fn new(name: impl Into<String>, raw: &[u8]) -> Result<Self> {
        let name = name.into();
        if raw.is_empty() {
            bail!("sequence '{}' is empty", name);
        }
        let bases = raw.iter().map(|&b| normalize_base(b)).collect();
        Ok(Self { name, bases })
    }

    /// Contig name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of bases.
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// The normalized base buffer.
    pub fn bases(&self) -> &[u8] {
        &self.bases
    }

    /// Per-character frequency of the normalized buffer.
    pub fn statistics(&self) -> FxHashMap<char, u64> {
        character_counts(&self.bases)
    }
}

/// Count character frequencies over a normalized buffer.
pub fn character_counts(bases: &[u8]) -> FxHashMap<char, u64> {
    let mut counts = FxHashMap::default();
    for &b in bases {
        *counts.entry(b as char).or_insert(0) += 1;
    }
    counts
}
