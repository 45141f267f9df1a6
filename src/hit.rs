//! Query hits
//!
//! A hit ties a match position to the contig it was found on and the strand
//! it matched. Subsequence extraction always reads forward from the contig
//! and reverse-complements the slice for reverse-strand hits, so callers see
//! the sequence as it appears on the matched strand.

use crate::seq::revcomp;
use serde::Serialize;
use std::fmt;

/// Orientation of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn symbol(self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One match on a contig. The contig reference and strand are fixed; the
/// position may be adjusted after construction to support seeded re-scans
/// around an initial match.
#[derive(Debug, Clone, Copy)]
pub struct IndexHit<'a> {
    contig: &'a str,
    bases: &'a [u8],
    position: usize,
    strand: Strand,
}

impl<'a> IndexHit<'a> {
    pub fn new(contig: &'a str, bases: &'a [u8], position: usize, strand: Strand) -> Self {
        debug_assert!(position < bases.len());
        Self {
            contig,
            bases,
            position,
            strand,
        }
    }

    pub fn contig(&self) -> &'a str {
        self.contig
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) {
        debug_assert!(position < self.bases.len());
        self.position = position;
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Up to `k` characters starting at the hit position, clamped at the
    /// contig end, as seen on the matched strand.
    pub fn downstream(&self, k: usize) -> Vec<u8> {
        self.window(self.position, self.position + k)
    }

    /// Up to `k` characters preceding the hit position, clamped at the
    /// contig start, as seen on the matched strand.
    pub fn upstream(&self, k: usize) -> Vec<u8> {
        self.window(self.position.saturating_sub(k), self.position)
    }

    /// The contig slice `[start, end)` in forward coordinates, clamped,
    /// reverse-complemented for reverse-strand hits.
    pub fn window(&self, start: usize, end: usize) -> Vec<u8> {
        let end = end.min(self.bases.len());
        let start = start.min(end);
        let slice = &self.bases[start..end];
        match self.strand {
            Strand::Forward => slice.to_vec(),
            Strand::Reverse => revcomp(slice),
        }
    }
}

/// Hit identity is contig, position and strand; the underlying buffer does
/// not participate.
impl PartialEq for IndexHit<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.contig == other.contig
            && self.position == other.position
            && self.strand == other.strand
    }
}

impl Eq for IndexHit<'_> {}

impl fmt::Display for IndexHit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.contig, self.position, self.strand)
    }
}
