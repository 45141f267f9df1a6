//! End-to-end scenarios: backend equivalence, both-strand search,
//! multi-sequence composition and persistence round trips.

use esax::esa::backend::BackendTag;
use esax::esa::{BackendChoice, EsaIndex, IndexOptions};
use esax::hit::Strand;
use esax::multi::{AnyIndex, MultiSeqIndex, open_index};
use esax::seq::fasta::parse_fasta;
use esax::seq::{Sequence, revcomp};
use std::path::Path;
use tempfile::tempdir;

fn options(backend: BackendChoice, depth: u32) -> IndexOptions {
    IndexOptions {
        backend,
        bucket_depth: depth,
    }
}

fn all_backends(dir: &Path, label: &str, depth: u32) -> Vec<IndexOptions> {
    vec![
        options(BackendChoice::Dense, depth),
        options(BackendChoice::Packed, depth),
        options(
            BackendChoice::Mmap(dir.join(format!("{label}.esa"))),
            depth,
        ),
    ]
}

fn random_dna(len: usize, seed: u64) -> Vec<u8> {
    const BASES: [u8; 5] = *b"ACGTN";
    let mut state = seed.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            BASES[(state >> 33) as usize % 5]
        })
        .collect()
}

/// Brute-force both-strand oracle.
fn naive_hits(bases: &[u8], pattern: &[u8]) -> Vec<(usize, Strand)> {
    let mut hits = Vec::new();
    if pattern.len() <= bases.len() {
        for (i, w) in bases.windows(pattern.len()).enumerate() {
            if w == pattern {
                hits.push((i, Strand::Forward));
            }
        }
        let rc = revcomp(pattern);
        for (i, w) in bases.windows(rc.len()).enumerate() {
            if w == rc {
                hits.push((i, Strand::Reverse));
            }
        }
    }
    hits.sort_by_key(|&(p, s)| (p, s == Strand::Reverse));
    hits
}

#[test]
fn lowercase_sequence_and_query_match_forward() {
    let temp = tempdir().unwrap();
    let seq = Sequence::new("s", b"atgcn").unwrap();
    for (i, opts) in all_backends(temp.path(), "atgcn", 5).into_iter().enumerate() {
        let index = EsaIndex::build(&seq, &opts).unwrap();
        assert_eq!(
            index.find_match_positions(b"atgcn").unwrap(),
            vec![0],
            "backend {i}"
        );
    }
}

#[test]
fn hit_count_equals_hit_list_length() {
    let temp = tempdir().unwrap();
    let seq = Sequence::new("s", b"atgcnatgcn").unwrap();
    for opts in all_backends(temp.path(), "count", 8) {
        let index = EsaIndex::build(&seq, &opts).unwrap();
        let hits = index.find_hit_positions(b"atgcn").unwrap();
        assert_eq!(index.find_hit_count(b"atgcn").unwrap(), hits.len());
    }
}

#[test]
fn forward_positions_are_set_equal() {
    let temp = tempdir().unwrap();
    let seq = Sequence::new("s", b"ATGCNATGCN").unwrap();
    for opts in all_backends(temp.path(), "set", 8) {
        let index = EsaIndex::build(&seq, &opts).unwrap();
        let mut positions = index.find_match_positions(b"ATGCN").unwrap();
        positions.sort_unstable();
        assert_eq!(positions, vec![0, 5]);
    }
}

#[test]
fn multi_sequence_attribution_and_statistics() {
    let sequences = vec![
        Sequence::new("A", b"ATGC").unwrap(),
        Sequence::new("B", b"GGGG").unwrap(),
    ];
    let index = MultiSeqIndex::build("toy", &sequences, &IndexOptions::default()).unwrap();

    let hits = index.find_hit_positions(b"ATGC").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].contig(), "A");
    assert_eq!(hits[0].position(), 0);

    let stats = index.statistics();
    assert_eq!(stats[&'G'], 5);
    assert_eq!(stats.values().sum::<u64>(), 8);
    assert_eq!(index.len(), 8);
}

#[test]
fn empty_pattern_errors_on_every_backend() {
    let temp = tempdir().unwrap();
    let seq = Sequence::new("s", b"ATGCATGC").unwrap();
    for opts in all_backends(temp.path(), "empty", 8) {
        let index = EsaIndex::build(&seq, &opts).unwrap();
        assert!(index.find_hit_positions(b"").is_err());
        assert!(index.find_hit_count(b"").is_err());
        assert!(index.find_match_positions(b"").is_err());
    }
}

#[test]
fn backends_agree_with_each_other_and_the_oracle() {
    let temp = tempdir().unwrap();
    let bases = random_dna(5000, 11);
    let seq = Sequence::new("s", &bases).unwrap();

    let indexes: Vec<EsaIndex> = all_backends(temp.path(), "oracle", 8)
        .into_iter()
        .map(|opts| EsaIndex::build(&seq, &opts).unwrap())
        .collect();

    let mut patterns: Vec<Vec<u8>> = (0..40)
        .map(|i| bases[i * 100..i * 100 + 3 + i % 18].to_vec())
        .collect();
    patterns.push(b"ACGTACGTACGTACGT".to_vec()); // likely absent
    patterns.push(random_dna(12, 99));

    for pattern in &patterns {
        let expected = naive_hits(seq.bases(), pattern);
        for index in &indexes {
            let got: Vec<(usize, Strand)> = index
                .find_hit_positions(pattern)
                .unwrap()
                .iter()
                .map(|h| (h.position(), h.strand()))
                .collect();
            assert_eq!(
                got,
                expected,
                "backend {:?}, pattern {:?}",
                index.backend(),
                std::str::from_utf8(pattern)
            );
            assert_eq!(index.find_hit_count(pattern).unwrap(), expected.len());
        }
    }
}

#[test]
fn persistence_round_trips_preserve_all_queries() {
    let temp = tempdir().unwrap();
    let bases = random_dna(800, 3);
    let seq = Sequence::new("chr9", &bases).unwrap();

    for (label, opts) in [
        ("rt_dense", options(BackendChoice::Dense, 6)),
        ("rt_packed", options(BackendChoice::Packed, 6)),
        (
            "rt_mmap",
            options(BackendChoice::Mmap(temp.path().join("rt_mmap_src.esa")), 6),
        ),
    ] {
        let index = EsaIndex::build(&seq, &opts).unwrap();
        let path = temp.path().join(format!("{label}.esa"));
        index.save(&path).unwrap();

        let reloaded = EsaIndex::load(&path).unwrap();
        assert_eq!(reloaded.name(), "chr9");
        assert_eq!(reloaded.backend(), index.backend());
        for pattern in [&bases[10..18], &bases[100..104], &b"ACGTACGT"[..]] {
            assert_eq!(
                reloaded.find_hit_positions(pattern).unwrap(),
                index.find_hit_positions(pattern).unwrap(),
                "{label}"
            );
        }
    }
}

#[test]
fn fasta_to_queries_end_to_end() {
    let sequences = parse_fasta(
        ">chrA primary\nATGCNATGCN\nATGC\n>chrB\ngggg\nattc\n",
    )
    .unwrap();
    assert_eq!(sequences.len(), 2);

    let temp = tempdir().unwrap();
    let index = MultiSeqIndex::build("sample", &sequences, &IndexOptions::default()).unwrap();
    let path = temp.path().join("sample.esa");
    index.save(&path).unwrap();

    let opened = open_index(&path).unwrap();
    assert!(matches!(opened, AnyIndex::Multi(_)));
    assert_eq!(opened.name(), "sample");

    // GAAT occurs reverse-complemented (ATTC) on chrB only.
    let hits = opened.find_hit_positions(b"GAAT").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].contig(), "chrB");
    assert_eq!(hits[0].strand(), Strand::Reverse);
    assert_eq!(hits[0].position(), 4);
}

#[test]
fn mmap_file_is_created_and_tagged() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("tagged.esa");
    let seq = Sequence::new("s", b"ATGCATGCATGC").unwrap();
    let index = EsaIndex::build(
        &seq,
        &options(BackendChoice::Mmap(path.clone()), 4),
    )
    .unwrap();
    assert!(path.exists());
    assert_eq!(index.backend(), BackendTag::Mmap);

    // Reopening goes through the same header dispatch.
    let reloaded = EsaIndex::load(&path).unwrap();
    assert_eq!(reloaded.backend(), BackendTag::Mmap);
    assert_eq!(
        reloaded.find_match_positions(b"ATGC").unwrap(),
        index.find_match_positions(b"ATGC").unwrap()
    );
}
