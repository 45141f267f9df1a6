//! Table storage backends
//!
//! One logical contract, three encodings of the same tables:
//!
//! - [`DenseTables`] — one machine word per rank, O(1) access, highest
//!   memory.
//! - [`PackedTables`] — one clipped byte per rank for the lcp and child
//!   tables, with on-demand scan recomputation when a value does not fit.
//! - [`MmapTables`] — fixed-record regions of the serialized index file,
//!   accessed through a shared memory map; index size is bounded by the
//!   addressable file, not by RAM.
//!
//! The search algorithm depends only on the [`Tables`] trait. The child
//! pointer predicates live here as provided methods: a slot's pointer kind
//! is decided by neighboring lcp values first and the encoded value second,
//! never by the value alone. The packed backend must answer every query
//! identically to the dense one; only the cost may differ.

pub mod dense;
pub mod mmap;
pub mod packed;

pub use dense::DenseTables;
pub use mmap::MmapTables;
pub use packed::PackedTables;

use anyhow::{Result, bail};

/// Concrete backend identifier, written into the serialized format header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendTag {
    Dense = 0,
    Packed = 1,
    Mmap = 2,
}

impl BackendTag {
    pub fn from_u8(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Dense),
            1 => Ok(Self::Packed),
            2 => Ok(Self::Mmap),
            other => bail!("unknown backend tag {other}"),
        }
    }
}

/// Read access to the four tables of one index.
///
/// Slot indices run over `0..=n` where `n` is the suffix count; slot `n`
/// carries the phantom rank. Out-of-range access is a programming defect
/// and panics.
pub trait Tables {
    /// Number of real suffixes `n`; tables have `n + 1` slots.
    fn suffix_count(&self) -> usize;

    /// The normalized base buffer of length `n`.
    fn text(&self) -> &[u8];

    /// Suffix table entry at rank `i` (`SENTINEL_RANK` at slot `n`).
    fn suftab(&self, i: usize) -> u32;

    /// Lcp table entry at rank `i`.
    fn lcp(&self, i: usize) -> u32;

    /// The resolved child pointer stored in slot `i`, or `None` for the
    /// single vacant slot `n`.
    fn child_slot(&self, i: usize) -> Option<u32>;

    /// `up(i)` is stored (in slot `i-1`) exactly when the lcp drops from
    /// `i-1` to `i`.
    fn has_up(&self, i: usize) -> bool {
        i >= 1 && i <= self.suffix_count() && self.lcp(i) < self.lcp(i - 1)
    }

    /// First ℓ-index of the interval ending at `i - 1`.
    fn child_up(&self, i: usize) -> Option<u32> {
        if !self.has_up(i) {
            return None;
        }
        let v = self.child_slot(i - 1);
        debug_assert!(v.is_some_and(|v| (v as usize) < i), "up pointer must point backward");
        v
    }

    /// Slot `i` carries a sibling (`next`) pointer: forward, equal lcp.
    fn has_next(&self, i: usize) -> bool {
        self.forward_slot(i)
            .is_some_and(|v| self.lcp(v as usize) == self.lcp(i))
    }

    /// Next rank with the same lcp inside the enclosing interval.
    fn child_next(&self, i: usize) -> Option<u32> {
        self.forward_slot(i)
            .filter(|&v| self.lcp(v as usize) == self.lcp(i))
    }

    /// Slot `i` carries a `down` pointer: forward, strictly larger lcp.
    fn has_down(&self, i: usize) -> bool {
        self.forward_slot(i)
            .is_some_and(|v| self.lcp(v as usize) > self.lcp(i))
    }

    /// First ℓ-index of the interval starting at `i`.
    fn child_down(&self, i: usize) -> Option<u32> {
        self.forward_slot(i)
            .filter(|&v| self.lcp(v as usize) > self.lcp(i))
    }

    /// The slot value when it points forward (`next` or `down`); `None`
    /// when the slot is vacant or holds a deferred `up` pointer.
    fn forward_slot(&self, i: usize) -> Option<u32> {
        if i >= self.suffix_count() {
            return None;
        }
        if self.lcp(i + 1) < self.lcp(i) {
            // Slot is claimed by up(i+1).
            return None;
        }
        let v = self.child_slot(i)?;
        debug_assert!((v as usize) > i, "forward pointer must point forward");
        Some(v)
    }
}

/// Runtime-selected backend. The trait is the seam; this enum is only the
/// dispatch chosen at construction or deserialization time.
pub enum TableStore {
    Dense(DenseTables),
    Packed(PackedTables),
    Mmap(MmapTables),
}

impl TableStore {
    pub fn tag(&self) -> BackendTag {
        match self {
            Self::Dense(_) => BackendTag::Dense,
            Self::Packed(_) => BackendTag::Packed,
            Self::Mmap(_) => BackendTag::Mmap,
        }
    }
}

impl Tables for TableStore {
    fn suffix_count(&self) -> usize {
        match self {
            Self::Dense(t) => t.suffix_count(),
            Self::Packed(t) => t.suffix_count(),
            Self::Mmap(t) => t.suffix_count(),
        }
    }

    fn text(&self) -> &[u8] {
        match self {
            Self::Dense(t) => t.text(),
            Self::Packed(t) => t.text(),
            Self::Mmap(t) => t.text(),
        }
    }

    fn suftab(&self, i: usize) -> u32 {
        match self {
            Self::Dense(t) => t.suftab(i),
            Self::Packed(t) => t.suftab(i),
            Self::Mmap(t) => t.suftab(i),
        }
    }

    fn lcp(&self, i: usize) -> u32 {
        match self {
            Self::Dense(t) => t.lcp(i),
            Self::Packed(t) => t.lcp(i),
            Self::Mmap(t) => t.lcp(i),
        }
    }

    fn child_slot(&self, i: usize) -> Option<u32> {
        match self {
            Self::Dense(t) => t.child_slot(i),
            Self::Packed(t) => t.child_slot(i),
            Self::Mmap(t) => t.child_slot(i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::esa::child::build_child_table;
    use crate::esa::lcp::build_lcp;
    use crate::esa::sais::build_suffix_table;
    use crate::esa::sais::tests::random_dna;

    fn dense_for(bases: &[u8]) -> DenseTables {
        let suftab = build_suffix_table(bases);
        let lcp = build_lcp(bases, &suftab);
        let child = build_child_table(&lcp);
        DenseTables::new(bases.to_vec(), suftab, lcp, child)
    }

    /// Brute-force predicate expectations straight from the definitions,
    /// independent of the encoded table.
    fn def_next(lcp: &[u32], i: usize) -> Option<u32> {
        for q in i + 1..lcp.len() {
            if lcp[q] == lcp[i] {
                return Some(q as u32);
            }
            if lcp[q] < lcp[i] {
                return None;
            }
        }
        None
    }

    fn def_up(lcp: &[u32], i: usize) -> Option<u32> {
        let mut best = None;
        let mut min = u32::MAX;
        for q in (0..i).rev() {
            if lcp[q] <= lcp[i] {
                break;
            }
            if lcp[q] <= min {
                min = lcp[q];
                best = Some(q as u32);
            }
        }
        best
    }

    fn def_down(lcp: &[u32], i: usize) -> Option<u32> {
        let mut best = None;
        let mut min = u32::MAX;
        for q in i + 1..lcp.len() {
            if lcp[q] <= lcp[i] {
                break;
            }
            if lcp[q] < min {
                min = lcp[q];
                best = Some(q as u32);
            }
        }
        best
    }

    /// Every predicate, every slot, against the definitions. `next` is
    /// always retrievable; `up`/`down` only when the priority rule leaves
    /// them a slot, which is exactly when the search needs them.
    fn check_predicates(bases: &[u8]) {
        let t = dense_for(bases);
        let n = t.suffix_count();
        let lcp: Vec<u32> = (0..=n).map(|i| t.lcp(i)).collect();

        for i in 0..=n {
            let next = def_next(&lcp, i);
            assert_eq!(t.has_next(i), next.is_some(), "has_next({i}) on {bases:?}");
            assert_eq!(t.child_next(i), next, "child_next({i}) on {bases:?}");

            let up = def_up(&lcp, i);
            if t.has_up(i) {
                assert_eq!(t.child_up(i), up, "child_up({i}) on {bases:?}");
            } else {
                // up(i) is storable only when lcp drops into i.
                assert!(i == 0 || lcp[i] >= lcp[i - 1]);
            }

            if t.has_down(i) {
                assert_eq!(t.child_down(i), def_down(&lcp, i), "child_down({i})");
            } else if def_down(&lcp, i).is_some() {
                // down(i) was displaced; only a sibling chain may do that.
                assert!(next.is_some(), "down({i}) lost without a next pointer");
            }
        }
    }

    #[test]
    fn predicates_match_definitions_exhaustively() {
        for text in [
            &b"A"[..],
            b"AT",
            b"AAAA",
            b"ATGCN",
            b"ATGCNATGCN",
            b"ACAAACATAT",
            b"ATATATATAT",
            b"GGGGGGG",
            b"ACGTACGTACGT",
        ] {
            check_predicates(text);
        }
        for len in 1..=40 {
            check_predicates(&random_dna(len, 9000 + len as u32));
        }
    }

    #[test]
    fn slot_kinds_are_mutually_exclusive() {
        for len in [5usize, 17, 33, 64] {
            let bases = random_dna(len, len as u32);
            let t = dense_for(&bases);
            for i in 0..=t.suffix_count() {
                assert!(
                    !(t.has_next(i) && t.has_down(i)),
                    "slot {i} reports both next and down"
                );
                // has_up(i) reads slot i-1, which must then carry nothing else.
                if t.has_up(i) {
                    assert!(
                        !t.has_next(i - 1) && !t.has_down(i - 1),
                        "slot {} holds up({i}) but also a forward pointer",
                        i - 1
                    );
                }
            }
        }
    }

    #[test]
    fn backend_tag_round_trip() {
        for tag in [BackendTag::Dense, BackendTag::Packed, BackendTag::Mmap] {
            assert_eq!(BackendTag::from_u8(tag as u8).unwrap(), tag);
        }
        assert!(BackendTag::from_u8(9).is_err());
    }
}
