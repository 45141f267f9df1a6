//! Memory-mapped backend
//!
//! Tables live in fixed-width little-endian records inside the serialized
//! index file and are read through a shared memory map. Nothing beyond the
//! operating system's page cache is kept in memory, so indexes larger than
//! RAM stay queryable at the cost of page-fault latency on access. The
//! maximum sequence length is bounded by the addressable file size.

use super::Tables;
use crate::esa::child::VACANT;
use memmap2::Mmap;
use std::sync::Arc;

/// Byte offsets of one index unit's table regions within a mapped file.
/// Computed by the store when the format header is parsed; offsets are
/// absolute so several units can share one map.
#[derive(Debug, Clone, Copy)]
pub struct TableLayout {
    pub n: usize,
    pub text: usize,
    pub suftab: usize,
    pub lcp: usize,
    pub child: usize,
}

pub struct MmapTables {
    map: Arc<Mmap>,
    layout: TableLayout,
}

impl MmapTables {
    pub fn new(map: Arc<Mmap>, layout: TableLayout) -> Self {
        Self { map, layout }
    }

    #[inline]
    fn u32_at(&self, offset: usize) -> u32 {
        u32::from_le_bytes(
            self.map[offset..offset + 4]
                .try_into()
                .expect("mapped table region is truncated"),
        )
    }
}

impl Tables for MmapTables {
    fn suffix_count(&self) -> usize {
        self.layout.n
    }

    fn text(&self) -> &[u8] {
        &self.map[self.layout.text..self.layout.text + self.layout.n]
    }

    #[inline]
    fn suftab(&self, i: usize) -> u32 {
        debug_assert!(i <= self.layout.n);
        self.u32_at(self.layout.suftab + 4 * i)
    }

    #[inline]
    fn lcp(&self, i: usize) -> u32 {
        debug_assert!(i <= self.layout.n);
        self.u32_at(self.layout.lcp + 4 * i)
    }

    #[inline]
    fn child_slot(&self, i: usize) -> Option<u32> {
        debug_assert!(i <= self.layout.n);
        let v = self.u32_at(self.layout.child + 4 * i);
        (v != VACANT).then_some(v)
    }
}
