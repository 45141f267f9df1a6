//! LCP table construction
//!
//! `lcp[i]` is the length of the longest common prefix of the suffixes
//! ranked `i-1` and `i`; `lcp[0]` and `lcp[n]` are 0 (slot `n` faces the
//! phantom rank). Two interchangeable strategies are provided: Kasai's
//! linear-time algorithm ([`build_lcp`], the production path) and direct
//! adjacent comparison ([`build_lcp_naive`]). They must produce identical
//! tables; the choice is a performance decision only.

use super::sais::SENTINEL_RANK;

/// Kasai's algorithm: walk positions in text order, using the inverse rank
/// to reuse all but one comparison from the previous position. O(n).
pub fn build_lcp(bases: &[u8], suftab: &[u32]) -> Vec<u32> {
    let n = bases.len();
    debug_assert_eq!(suftab.len(), n + 1);

    let mut rank = vec![0u32; n];
    for (i, &pos) in suftab[..n].iter().enumerate() {
        rank[pos as usize] = i as u32;
    }

    let mut lcp = vec![0u32; n + 1];
    let mut h = 0usize;
    for pos in 0..n {
        let i = rank[pos] as usize;
        if i == 0 {
            h = 0;
            continue;
        }
        let prev = suftab[i - 1] as usize;
        while pos + h < n && prev + h < n && bases[pos + h] == bases[prev + h] {
            h += 1;
        }
        lcp[i] = h as u32;
        h = h.saturating_sub(1);
    }
    lcp
}

/// Direct adjacent-suffix comparison. Amortized cheap on biological
/// sequences, worst-case quadratic; kept as the second strategy and as the
/// oracle for [`build_lcp`].
pub fn build_lcp_naive(bases: &[u8], suftab: &[u32]) -> Vec<u32> {
    let n = bases.len();
    debug_assert_eq!(suftab.len(), n + 1);

    let mut lcp = vec![0u32; n + 1];
    for i in 1..n {
        lcp[i] = common_prefix(bases, suftab[i - 1], suftab[i]);
    }
    lcp
}

/// Shared-prefix length of the suffixes starting at `a` and `b`.
pub fn common_prefix(bases: &[u8], a: u32, b: u32) -> u32 {
    if a == SENTINEL_RANK || b == SENTINEL_RANK {
        return 0;
    }
    let (a, b) = (a as usize, b as usize);
    bases[a..]
        .iter()
        .zip(&bases[b..])
        .take_while(|(x, y)| x == y)
        .count() as u32
}
