//! Pattern search: lcp-interval descent
//!
//! Locates the contiguous suffix-table interval whose suffixes start with
//! the pattern. Descent starts from the bucket-table shortcut when the
//! pattern covers the bucket depth, otherwise from the root interval, and
//! walks child intervals through the up/down/next pointers. Backend
//! agnostic: everything goes through the [`Tables`] trait.

use super::backend::Tables;
use super::bucket::BucketTable;
use super::sais::SENTINEL_RANK;

/// Inclusive rank interval `[lo, hi]` of suffixes prefixed by `pattern`,
/// or `None` if the pattern does not occur. The pattern must be normalized
/// and non-empty.
pub fn find_interval<T: Tables>(
    t: &T,
    bucket: &BucketTable,
    pattern: &[u8],
) -> Option<(usize, usize)> {
    debug_assert!(!pattern.is_empty());
    let n = t.suffix_count();
    let m = pattern.len();
    let d = bucket.depth() as usize;

    let (mut lo, mut hi, mut matched);
    if m >= d {
        // Bucket shortcut: the d-prefix interval, or a definitive miss.
        lo = bucket.lookup(&pattern[..d])? as usize;
        hi = lo;
        while hi + 1 <= n && t.lcp(hi + 1) as usize >= d {
            hi += 1;
        }
        matched = d;
    } else {
        lo = 0;
        hi = n;
        matched = 0;
    }

    loop {
        if lo == hi {
            // Singleton: compare the remaining pattern directly.
            let pos = t.suftab(lo);
            if pos == SENTINEL_RANK {
                return None;
            }
            let pos = pos as usize;
            if pos + m <= n && t.text()[pos + matched..pos + m] == pattern[matched..] {
                return Some((lo, hi));
            }
            return None;
        }

        let ell = interval_lcp(t, lo, hi) as usize;
        let upto = ell.min(m);
        if upto > matched {
            // One representative suffix carries the interval's shared
            // prefix; lo < hi guarantees it is a real suffix.
            let pos = t.suftab(lo) as usize;
            if t.text()[pos + matched..pos + upto] != pattern[matched..upto] {
                return None;
            }
            matched = upto;
        }
        if matched == m {
            return Some((lo, hi));
        }

        // matched == ell < m: descend into the child that branches on the
        // next pattern character.
        (lo, hi) = child_by_char(t, lo, hi, matched, pattern[matched])?;
    }
}

/// All match positions for `pattern`, in suffix-table order.
pub fn find_positions<T: Tables>(t: &T, bucket: &BucketTable, pattern: &[u8]) -> Vec<u32> {
    match find_interval(t, bucket, pattern) {
        Some((lo, hi)) => (lo..=hi)
            .map(|i| {
                let pos = t.suftab(i);
                debug_assert_ne!(pos, SENTINEL_RANK, "matched interval contains the phantom");
                pos
            })
            .collect(),
        None => Vec::new(),
    }
}

/// Number of matches for `pattern`.
pub fn count_matches<T: Tables>(t: &T, bucket: &BucketTable, pattern: &[u8]) -> usize {
    match find_interval(t, bucket, pattern) {
        Some((lo, hi)) => hi - lo + 1,
        None => 0,
    }
}

/// The lcp value of a non-singleton interval: `lcp[up(hi+1)]` when that
/// pointer lands inside the interval, else `lcp[down(lo)]`; 0 at the
/// virtual root.
fn interval_lcp<T: Tables>(t: &T, lo: usize, hi: usize) -> u32 {
    let n = t.suffix_count();
    if lo == 0 && hi == n {
        return 0;
    }
    if hi < n
        && let Some(up) = t.child_up(hi + 1)
    {
        let up = up as usize;
        if lo < up && up <= hi {
            return t.lcp(up);
        }
    }
    let down = t
        .child_down(lo)
        .expect("non-singleton interval without a first ℓ-index");
    t.lcp(down as usize)
}

/// Child interval of `[lo, hi]` whose branching character at `depth`
/// equals `c`, found by walking the sibling chain.
fn child_by_char<T: Tables>(
    t: &T,
    lo: usize,
    hi: usize,
    depth: usize,
    c: u8,
) -> Option<(usize, usize)> {
    let n = t.suffix_count();

    let first = if lo == 0 && hi == n {
        // The root's ℓ-indices all carry lcp 0 and hang off slot 0 as a
        // sibling chain (lcp[n] = 0 guarantees at least one).
        t.child_next(0).expect("root has no sibling chain") as usize
    } else {
        match t.child_up(hi + 1) {
            Some(up) if lo < (up as usize) && (up as usize) <= hi => up as usize,
            _ => {
                t.child_down(lo)
                    .expect("non-singleton interval without a first ℓ-index") as usize
            }
        }
    };

    let mut left = lo;
    let mut boundary = Some(first);
    while let Some(b) = boundary {
        if branches_on(t, left, depth, c) {
            return Some((left, b - 1));
        }
        left = b;
        boundary = t.child_next(b).map(|v| v as usize);
    }
    if branches_on(t, left, depth, c) {
        return Some((left, hi));
    }
    None
}

/// Whether the child interval starting at rank `left` branches on `c` at
/// `depth`. The phantom rank and suffixes that end before `depth` never
/// branch.
#[inline]
fn branches_on<T: Tables>(t: &T, left: usize, depth: usize, c: u8) -> bool {
    let pos = t.suftab(left);
    if pos == SENTINEL_RANK {
        return false;
    }
    let at = pos as usize + depth;
    at < t.suffix_count() && t.text()[at] == c
}
