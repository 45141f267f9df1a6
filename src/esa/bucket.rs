//! Bucket table: d-prefix shortcut into the suffix table
//!
//! Maps the first `d` characters of a suffix (default `d = 8`, at most 8 so
//! the prefix packs into a `u64` key) to the smallest rank sharing that
//! prefix. Built in a single reverse pass over the suffix table: later
//! (smaller-rank) insertions overwrite earlier ones, so the surviving value
//! is the interval start. The table is sparse — an absent key means the
//! prefix never occurs.

use rustc_hash::FxHashMap;

/// Prefix length used when none is configured.
pub const DEFAULT_DEPTH: u32 = 8;

/// Upper bound on the prefix length: a key is one `u64`.
pub const MAX_DEPTH: u32 = 8;

pub struct BucketTable {
    depth: u32,
    map: FxHashMap<u64, u32>,
}

impl BucketTable {
    /// Build from the text and its suffix table. `depth` is clamped to
    /// `1..=MAX_DEPTH`.
    pub fn build(text: &[u8], suftab: &[u32], depth: u32) -> Self {
        let depth = depth.clamp(1, MAX_DEPTH);
        let n = text.len();
        let mut map = FxHashMap::default();
        for rank in (0..n).rev() {
            let pos = suftab[rank] as usize;
            let take = (depth as usize).min(n - pos);
            map.insert(prefix_key(&text[pos..pos + take]), rank as u32);
        }
        Self { depth, map }
    }

    /// Reassemble a table from serialized entries.
    pub fn from_entries(depth: u32, entries: impl IntoIterator<Item = (u64, u32)>) -> Self {
        Self {
            depth,
            map: entries.into_iter().collect(),
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Starting rank of the interval of suffixes sharing `prefix`, which
    /// must be exactly `depth` characters of a normalized pattern.
    pub fn lookup(&self, prefix: &[u8]) -> Option<u32> {
        debug_assert_eq!(prefix.len(), self.depth as usize);
        self.map.get(&prefix_key(prefix)).copied()
    }

    /// Entries in key order, for deterministic serialization.
    pub fn entries_sorted(&self) -> Vec<(u64, u32)> {
        let mut entries: Vec<(u64, u32)> = self.map.iter().map(|(&k, &v)| (k, v)).collect();
        entries.sort_unstable_by_key(|&(k, _)| k);
        entries
    }
}

/// Pack up to 8 prefix bytes into a key, zero-padded. Real bases are ASCII
/// letters, so padding never collides with a longer prefix.
#[inline]
fn prefix_key(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= MAX_DEPTH as usize);
    let mut key = [0u8; 8];
    key[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(key)
}
