//! Enhanced suffix array engine
//!
//! An [`EsaIndex`] is one immutable index over one contig: the suffix table,
//! lcp table, child table and bucket table, built once by [`EsaIndex::build`]
//! and query-only afterwards. Queries search both the forward pattern and
//! its reverse complement and tag each hit with its strand. Because nothing
//! is mutated after construction, an index can be queried from many threads
//! without synchronization.

pub mod backend;
pub mod bucket;
pub mod child;
pub mod lcp;
pub mod sais;
pub mod search;
pub mod store;

use crate::hit::{IndexHit, Strand};
use crate::seq::{Sequence, character_counts, normalize_pattern, revcomp};
use anyhow::{Result, bail};
use backend::{BackendTag, DenseTables, PackedTables, TableStore, Tables};
use bucket::BucketTable;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use store::{LoadedIndex, LoadedUnit, UnitRef};

/// Storage backend selected at construction. The memory-mapped variant
/// writes the index file immediately and serves queries through the map.
#[derive(Debug, Clone)]
pub enum BackendChoice {
    Dense,
    Packed,
    Mmap(PathBuf),
}

#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub backend: BackendChoice,
    pub bucket_depth: u32,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            backend: BackendChoice::Dense,
            bucket_depth: bucket::DEFAULT_DEPTH,
        }
    }
}

/// One enhanced suffix array over a single contig.
pub struct EsaIndex {
    name: String,
    depth: u32,
    tables: TableStore,
    bucket: BucketTable,
}

impl EsaIndex {
    /// Build all tables for one sequence. Construction is batch and
    /// single-threaded; the result is immutable.
    pub fn build(sequence: &Sequence, options: &IndexOptions) -> Result<Self> {
        let bases = sequence.bases().to_vec();
        let suftab = sais::build_suffix_table(&bases);
        let lcp = lcp::build_lcp(&bases, &suftab);
        let child = child::build_child_table(&lcp);
        let bucket = BucketTable::build(&bases, &suftab, options.bucket_depth);

        let tables = match &options.backend {
            BackendChoice::Dense => {
                TableStore::Dense(DenseTables::new(bases, suftab, lcp, child))
            }
            BackendChoice::Packed => {
                TableStore::Packed(PackedTables::pack(bases, suftab, &lcp, &child))
            }
            BackendChoice::Mmap(path) => {
                // Serialize the freshly built tables, then reopen them
                // through the map so queries never hold them in memory.
                let dense = TableStore::Dense(DenseTables::new(bases, suftab, lcp, child));
                store::save_unit(
                    path,
                    &UnitRef {
                        name: sequence.name(),
                        tag: BackendTag::Mmap,
                        depth: bucket.depth(),
                        tables: &dense,
                        bucket: &bucket,
                    },
                )?;
                return Self::load(path);
            }
        };

        Ok(Self {
            name: sequence.name().to_owned(),
            depth: bucket.depth(),
            tables,
            bucket,
        })
    }

    pub(crate) fn from_unit(unit: LoadedUnit) -> Self {
        Self {
            name: unit.name,
            depth: unit.depth,
            tables: unit.tables,
            bucket: unit.bucket,
        }
    }

    pub(crate) fn as_unit_ref(&self, tag: BackendTag) -> UnitRef<'_> {
        UnitRef {
            name: &self.name,
            tag,
            depth: self.depth,
            tables: &self.tables,
            bucket: &self.bucket,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of indexed bases.
    pub fn len(&self) -> usize {
        self.tables.suffix_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The normalized contig buffer.
    pub fn bases(&self) -> &[u8] {
        self.tables.text()
    }

    pub fn backend(&self) -> BackendTag {
        self.tables.tag()
    }

    pub fn bucket_depth(&self) -> u32 {
        self.depth
    }

    /// Forward-strand match positions, in contig coordinates.
    pub fn find_match_positions(&self, pattern: &[u8]) -> Result<Vec<u32>> {
        let pattern = normalize_pattern(pattern)?;
        Ok(search::find_positions(&self.tables, &self.bucket, &pattern))
    }

    /// Both-strand hit search. Reverse-strand hits carry the forward
    /// coordinate of the site where the reverse complement matches.
    pub fn find_hit_positions(&self, pattern: &[u8]) -> Result<Vec<IndexHit<'_>>> {
        let forward = normalize_pattern(pattern)?;
        let reverse = revcomp(&forward);
        let text = self.tables.text();

        let mut hits: Vec<IndexHit> =
            search::find_positions(&self.tables, &self.bucket, &forward)
                .into_iter()
                .map(|p| IndexHit::new(&self.name, text, p as usize, Strand::Forward))
                .collect();
        hits.extend(
            search::find_positions(&self.tables, &self.bucket, &reverse)
                .into_iter()
                .map(|p| IndexHit::new(&self.name, text, p as usize, Strand::Reverse)),
        );
        hits.sort_by_key(|h| (h.position(), h.strand() == Strand::Reverse));
        Ok(hits)
    }

    /// Both-strand hit count: the sum of forward and reverse matches.
    pub fn find_hit_count(&self, pattern: &[u8]) -> Result<usize> {
        let forward = normalize_pattern(pattern)?;
        let reverse = revcomp(&forward);
        Ok(search::count_matches(&self.tables, &self.bucket, &forward)
            + search::count_matches(&self.tables, &self.bucket, &reverse))
    }

    /// Per-character frequency of the indexed sequence.
    pub fn statistics(&self) -> FxHashMap<char, u64> {
        character_counts(self.tables.text())
    }

    /// Persist the whole index as one unit, tagged with its current
    /// backend.
    pub fn save(&self, path: &Path) -> Result<()> {
        store::save_unit(path, &self.as_unit_ref(self.tables.tag()))
    }

    /// Load a single-unit index file; the format header selects the
    /// backend to reconstruct.
    pub fn load(path: &Path) -> Result<Self> {
        match store::load(path)? {
            LoadedIndex::Unit(unit) => Ok(Self::from_unit(unit)),
            LoadedIndex::Multi { name, .. } => bail!(
                "{} holds the multi-sequence index '{name}'; open it as one",
                path.display()
            ),
        }
    }
}
