//! Byte-packed backend with on-demand recomputation
//!
//! The lcp and child tables are stored as one byte per rank: the lcp value
//! itself, and the child pointer as its distance from the slot. Values that
//! do not fit are clipped to [`ESCAPE`] and recomputed on access by a
//! bounded scan — a pure memory/time trade. Results must be identical to
//! the dense backend; any divergence is a correctness bug.

use super::Tables;
use crate::esa::child::VACANT;
use crate::esa::lcp::common_prefix;

/// Byte marking a value that must be recomputed.
const ESCAPE: u8 = 0xFF;

pub struct PackedTables {
    text: Vec<u8>,
    suftab: Vec<u32>,
    lcp_bytes: Vec<u8>,
    child_bytes: Vec<u8>,
}

impl PackedTables {
    /// Pack full-width tables into the byte encoding.
    pub fn pack(text: Vec<u8>, suftab: Vec<u32>, lcp: &[u32], child: &[u32]) -> Self {
        debug_assert_eq!(suftab.len(), text.len() + 1);
        debug_assert_eq!(lcp.len(), text.len() + 1);
        debug_assert_eq!(child.len(), text.len() + 1);

        let lcp_bytes = lcp
            .iter()
            .map(|&v| if v < ESCAPE as u32 { v as u8 } else { ESCAPE })
            .collect();

        let child_bytes = child
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                if v == VACANT {
                    // Only the final slot; never decoded.
                    return ESCAPE;
                }
                let delta = (v as usize).abs_diff(i);
                if delta < ESCAPE as usize {
                    delta as u8
                } else {
                    ESCAPE
                }
            })
            .collect();

        Self {
            text,
            suftab,
            lcp_bytes,
            child_bytes,
        }
    }

    /// Fallback for a clipped lcp value: directly compare the two suffixes.
    fn recompute_lcp(&self, i: usize) -> u32 {
        if i == 0 || i == self.suffix_count() {
            return 0;
        }
        common_prefix(&self.text, self.suftab[i - 1], self.suftab[i])
    }

    /// Fallback for a clipped up(j) pointer: walk left while the lcp stays
    /// above lcp[j], keeping the leftmost position of the running minimum.
    fn recompute_up(&self, j: usize) -> u32 {
        let bound = self.lcp(j);
        let mut best = None;
        let mut min = u32::MAX;
        for q in (0..j).rev() {
            let l = self.lcp(q);
            if l <= bound {
                break;
            }
            if l <= min {
                min = l;
                best = Some(q as u32);
            }
        }
        best.expect("up pointer recomputation found no candidate")
    }

    /// Fallback for a clipped forward pointer: the sibling rank with equal
    /// lcp if one exists before the lcp drops, otherwise the first ℓ-index
    /// of the interval starting at `i` (the leftmost strict minimum).
    fn recompute_forward(&self, i: usize) -> u32 {
        let bound = self.lcp(i);
        let mut best = None;
        let mut min = u32::MAX;
        for q in i + 1..=self.suffix_count() {
            let l = self.lcp(q);
            if l == bound {
                return q as u32;
            }
            if l < bound {
                break;
            }
            if l < min {
                min = l;
                best = Some(q as u32);
            }
        }
        best.expect("forward pointer recomputation found no candidate")
    }
}

impl Tables for PackedTables {
    fn suffix_count(&self) -> usize {
        self.text.len()
    }

    fn text(&self) -> &[u8] {
        &self.text
    }

    #[inline]
    fn suftab(&self, i: usize) -> u32 {
        self.suftab[i]
    }

    fn lcp(&self, i: usize) -> u32 {
        let b = self.lcp_bytes[i];
        if b != ESCAPE {
            b as u32
        } else {
            self.recompute_lcp(i)
        }
    }

    fn child_slot(&self, i: usize) -> Option<u32> {
        let b = self.child_bytes[i];
        let n = self.suffix_count();
        if i == n {
            return None;
        }
        // The pointer kind decides the direction: a drop in lcp at i+1
        // means the slot was claimed by up(i+1) and points backward.
        let backward = self.lcp(i + 1) < self.lcp(i);
        let value = if b != ESCAPE {
            if backward {
                (i - b as usize) as u32
            } else {
                (i + b as usize) as u32
            }
        } else if backward {
            self.recompute_up(i + 1)
        } else {
            self.recompute_forward(i)
        };
        Some(value)
    }
}
