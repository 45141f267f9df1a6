//! Dense backend: one machine word per rank
//!
//! The straightforward encoding, roughly 13 bytes per input symbol across
//! the three u32 tables plus the sequence itself. All accesses are plain
//! array reads.

use super::Tables;
use crate::esa::child::VACANT;

pub struct DenseTables {
    text: Vec<u8>,
    suftab: Vec<u32>,
    lcp: Vec<u32>,
    child: Vec<u32>,
}

impl DenseTables {
    pub fn new(text: Vec<u8>, suftab: Vec<u32>, lcp: Vec<u32>, child: Vec<u32>) -> Self {
        debug_assert_eq!(suftab.len(), text.len() + 1);
        debug_assert_eq!(lcp.len(), text.len() + 1);
        debug_assert_eq!(child.len(), text.len() + 1);
        Self {
            text,
            suftab,
            lcp,
            child,
        }
    }
}

impl Tables for DenseTables {
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

    #[inline]
    fn lcp(&self, i: usize) -> u32 {
        self.lcp[i]
    }

    #[inline]
    fn child_slot(&self, i: usize) -> Option<u32> {
        let v = self.child[i];
        (v != VACANT).then_some(v)
    }
}
