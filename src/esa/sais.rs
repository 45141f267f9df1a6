//! Suffix sorting via SA-IS (induced sorting)
//!
//! Linear-time suffix array construction (Nong, Zhang, Chan 2009): classify
//! suffixes as L/S, induce an order for the LMS suffixes, name their
//! substrings, recurse on the reduced problem if the names are not unique,
//! then induce the final order from the sorted LMS suffixes.
//!
//! The public entry point works on a normalized base buffer and returns the
//! suffix table described in the crate docs: slots `0..n` hold a permutation
//! of `0..n` sorted by suffix, slot `n` holds the phantom [`SENTINEL_RANK`].

/// Phantom value stored at slot `n` of every suffix table. Treated as
/// lexicographically greater than every real suffix; never matched.
pub const SENTINEL_RANK: u32 = u32::MAX;

/// Build the suffix table for a non-empty base buffer.
///
/// An implicit sentinel smaller than every base terminates the text during
/// sorting; its rank is dropped from the result and the table is closed
/// with [`SENTINEL_RANK`] at slot `n`.
pub fn build_suffix_table(bases: &[u8]) -> Vec<u32> {
    debug_assert!(!bases.is_empty());
    // Bases are ASCII letters, so 0 is strictly smaller than all of them.
    let mut text: Vec<usize> = bases.iter().map(|&b| b as usize).collect();
    text.push(0);

    let sa = sais(&text, 256);

    let mut suftab: Vec<u32> = Vec::with_capacity(bases.len() + 1);
    suftab.extend(
        sa.into_iter()
            .filter(|&pos| pos < bases.len())
            .map(|pos| pos as u32),
    );
    suftab.push(SENTINEL_RANK);
    suftab
}

/// Core SA-IS over an integer alphabet. The last character must be a unique
/// minimum (the sentinel); recursion preserves this property because the
/// sentinel's LMS substring always receives the unique name 0.
fn sais(text: &[usize], sigma: usize) -> Vec<usize> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![0];
    }
    if n == 2 {
        return if text[0] <= text[1] { vec![0, 1] } else { vec![1, 0] };
    }

    // S-type: suffix smaller than its successor. The sentinel is S-type.
    let mut is_s = vec![false; n];
    is_s[n - 1] = true;
    for i in (0..n - 1).rev() {
        is_s[i] = text[i] < text[i + 1] || (text[i] == text[i + 1] && is_s[i + 1]);
    }

    let lms: Vec<usize> = (1..n).filter(|&i| is_lms(&is_s, i)).collect();
    debug_assert!(!lms.is_empty());

    let mut sizes = vec![0usize; sigma];
    for &c in text {
        sizes[c] += 1;
    }

    // First induction: LMS suffixes in text order yield the LMS order.
    let sa = induce(text, &is_s, &sizes, &lms);

    // Name LMS substrings by their rank in the induced order.
    let mut names = vec![0usize; n];
    let mut name = 0usize;
    let mut prev: Option<usize> = None;
    for &pos in &sa {
        if !is_lms(&is_s, pos) {
            continue;
        }
        if let Some(p) = prev
            && !lms_equal(text, &is_s, p, pos)
        {
            name += 1;
        }
        names[pos] = name;
        prev = Some(pos);
    }
    let unique = name + 1;

    let reduced: Vec<usize> = lms.iter().map(|&pos| names[pos]).collect();

    let sorted_lms: Vec<usize> = if unique < lms.len() {
        sais(&reduced, unique)
            .into_iter()
            .map(|i| lms[i])
            .collect()
    } else {
        // Names are unique, so they already define the order.
        let mut order = vec![0usize; lms.len()];
        for (i, &pos) in lms.iter().enumerate() {
            order[reduced[i]] = pos;
        }
        order
    };

    induce(text, &is_s, &sizes, &sorted_lms)
}

/// One full induced-sorting round: place the given LMS suffixes at their
/// bucket tails, induce L-types left to right, then S-types right to left.
fn induce(text: &[usize], is_s: &[bool], sizes: &[usize], lms_in_order: &[usize]) -> Vec<usize> {
    let n = text.len();
    let mut sa = vec![usize::MAX; n];

    let mut tails = bucket_tails(sizes);
    for &pos in lms_in_order.iter().rev() {
        let c = text[pos];
        tails[c] -= 1;
        sa[tails[c]] = pos;
    }

    let mut heads = bucket_heads(sizes);
    for i in 0..n {
        if sa[i] == usize::MAX || sa[i] == 0 {
            continue;
        }
        let j = sa[i] - 1;
        if !is_s[j] {
            let c = text[j];
            sa[heads[c]] = j;
            heads[c] += 1;
        }
    }

    let mut tails = bucket_tails(sizes);
    for i in (0..n).rev() {
        if sa[i] == usize::MAX || sa[i] == 0 {
            continue;
        }
        let j = sa[i] - 1;
        if is_s[j] {
            let c = text[j];
            tails[c] -= 1;
            sa[tails[c]] = j;
        }
    }

    sa
}

#[inline]
fn is_lms(is_s: &[bool], i: usize) -> bool {
    i > 0 && is_s[i] && !is_s[i - 1]
}

fn bucket_heads(sizes: &[usize]) -> Vec<usize> {
    let mut heads = Vec::with_capacity(sizes.len());
    let mut sum = 0;
    for &size in sizes {
        heads.push(sum);
        sum += size;
    }
    heads
}

fn bucket_tails(sizes: &[usize]) -> Vec<usize> {
    let mut tails = Vec::with_capacity(sizes.len());
    let mut sum = 0;
    for &size in sizes {
        sum += size;
        tails.push(sum);
    }
    tails
}

/// Compare two LMS substrings (from their start up to and including the
/// next LMS position) for equality of characters and types.
fn lms_equal(text: &[usize], is_s: &[bool], a: usize, b: usize) -> bool {
    if a == b {
        return true;
    }
    let n = text.len();
    let mut k = 0;
    loop {
        let pa = a + k;
        let pb = b + k;
        if pa >= n || pb >= n {
            return pa >= n && pb >= n;
        }
        if text[pa] != text[pb] || is_s[pa] != is_s[pb] {
            return false;
        }
        if k > 0 {
            let la = is_lms(is_s, pa);
            let lb = is_lms(is_s, pb);
            if la && lb {
                return true;
            }
            if la != lb {
                return false;
            }
        }
        k += 1;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Quadratic oracle: sort suffix start positions by direct comparison.
    pub(crate) fn naive_suffix_table(bases: &[u8]) -> Vec<u32> {
        let mut sa: Vec<u32> = (0..bases.len() as u32).collect();
        sa.sort_by(|&a, &b| bases[a as usize..].cmp(&bases[b as usize..]));
        sa.push(SENTINEL_RANK);
        sa
    }

    pub(crate) fn random_dna(len: usize, seed: u32) -> Vec<u8> {
        const BASES: [u8; 5] = [b'A', b'C', b'G', b'T', b'N'];
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                BASES[(x >> 16) as usize % BASES.len()]
            })
            .collect()
    }

    #[test]
    fn single_base() {
        assert_eq!(build_suffix_table(b"A"), vec![0, SENTINEL_RANK]);
    }

    #[test]
    fn known_order() {
        // Suffixes of GATC sorted: ATC, C, GATC, TC
        assert_eq!(build_suffix_table(b"GATC"), vec![1, 3, 0, 2, SENTINEL_RANK]);
    }

    #[test]
    fn repeated_bases() {
        // Shorter runs of A sort first.
        assert_eq!(
            build_suffix_table(b"AAAA"),
            vec![3, 2, 1, 0, SENTINEL_RANK]
        );
    }

    #[test]
    fn matches_naive_on_random_dna() {
        for len in 1..=64 {
            let bases = random_dna(len, 7 + len as u32);
            assert_eq!(
                build_suffix_table(&bases),
                naive_suffix_table(&bases),
                "mismatch on len={len}"
            );
        }
    }

    #[test]
    fn matches_naive_on_repetitive_dna() {
        for text in [
            &b"ATATATATATAT"[..],
            b"AAAAAAAAAACAAAAAAAAAA",
            b"ACGTACGTACGTACGT",
            b"ATGCNATGCN",
            b"NNNNNNNN",
        ] {
            assert_eq!(build_suffix_table(text), naive_suffix_table(text));
        }
    }

    #[test]
    fn permutation_invariant() {
        let bases = random_dna(500, 42);
        let suftab = build_suffix_table(&bases);
        assert_eq!(suftab.len(), bases.len() + 1);
        assert_eq!(suftab[bases.len()], SENTINEL_RANK);
        let mut positions: Vec<u32> = suftab[..bases.len()].to_vec();
        positions.sort_unstable();
        let expected: Vec<u32> = (0..bases.len() as u32).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn sortedness_invariant() {
        let bases = random_dna(500, 99);
        let suftab = build_suffix_table(&bases);
        for w in suftab[..bases.len()].windows(2) {
            assert!(bases[w[0] as usize..] <= bases[w[1] as usize..]);
        }
    }
}
