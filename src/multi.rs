//! Multi-sequence composition
//!
//! A [`MultiSeqIndex`] holds one [`EsaIndex`] per contig and presents them
//! as a single logical index: hit lists concatenate, counts and statistics
//! sum, and the aggregate length is the sum across contigs. Query cost is
//! linear in the number of contigs. Contigs are only added during
//! construction; afterwards the composite is as immutable as its parts.

use crate::esa::backend::BackendTag;
use crate::esa::store::{self, LoadedIndex, UnitRef};
use crate::esa::{BackendChoice, EsaIndex, IndexOptions};
use crate::hit::IndexHit;
use crate::seq::Sequence;
use crate::utils::progress::{ProgressBar, ProgressStyle};
use anyhow::{Result, bail};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::path::Path;

pub struct MultiSeqIndex {
    name: String,
    contigs: Vec<EsaIndex>,
}

impl MultiSeqIndex {
    /// Build one index per contig, in parallel. Contig names must be
    /// unique; an empty input set is a construction error.
    pub fn build(name: &str, sequences: &[Sequence], options: &IndexOptions) -> Result<Self> {
        if sequences.is_empty() {
            bail!("multi-sequence index '{name}' has no contigs");
        }
        for (i, seq) in sequences.iter().enumerate() {
            if sequences[..i].iter().any(|s| s.name() == seq.name()) {
                bail!("duplicate contig name '{}'", seq.name());
            }
        }

        if let BackendChoice::Mmap(path) = &options.backend {
            // Build in memory once, persist every unit with the mapped
            // tag, then reopen the container through the map.
            let built = Self {
                name: name.to_owned(),
                contigs: build_contigs(
                    sequences,
                    &IndexOptions {
                        backend: BackendChoice::Dense,
                        bucket_depth: options.bucket_depth,
                    },
                )?,
            };
            built.save_tagged(path, Some(BackendTag::Mmap))?;
            return Self::load(path);
        }

        Ok(Self {
            name: name.to_owned(),
            contigs: build_contigs(sequences, options)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contigs(&self) -> &[EsaIndex] {
        &self.contigs
    }

    pub fn contig(&self, name: &str) -> Option<&EsaIndex> {
        self.contigs.iter().find(|c| c.name() == name)
    }

    /// Total indexed bases across all contigs.
    pub fn len(&self) -> usize {
        self.contigs.iter().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Both-strand hits across every contig, concatenated in contig order.
    pub fn find_hit_positions(&self, pattern: &[u8]) -> Result<Vec<IndexHit<'_>>> {
        let mut hits = Vec::new();
        for contig in &self.contigs {
            hits.extend(contig.find_hit_positions(pattern)?);
        }
        Ok(hits)
    }

    /// Both-strand hit count summed over every contig.
    pub fn find_hit_count(&self, pattern: &[u8]) -> Result<usize> {
        let mut count = 0;
        for contig in &self.contigs {
            count += contig.find_hit_count(pattern)?;
        }
        Ok(count)
    }

    /// Per-character frequencies summed across contigs.
    pub fn statistics(&self) -> FxHashMap<char, u64> {
        let mut totals = FxHashMap::default();
        for contig in &self.contigs {
            for (c, count) in contig.statistics() {
                *totals.entry(c).or_insert(0) += count;
            }
        }
        totals
    }

    /// Persist all contigs into one container file, each unit tagged with
    /// its current backend.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.save_tagged(path, None)
    }

    fn save_tagged(&self, path: &Path, tag: Option<BackendTag>) -> Result<()> {
        let units: Vec<UnitRef> = self
            .contigs
            .iter()
            .map(|c| c.as_unit_ref(tag.unwrap_or(c.backend())))
            .collect();
        store::save_multi(path, &self.name, &units)
    }

    /// Load a container file; each unit's header selects its backend.
    pub fn load(path: &Path) -> Result<Self> {
        match store::load(path)? {
            LoadedIndex::Multi { name, units } => Ok(Self {
                name,
                contigs: units.into_iter().map(EsaIndex::from_unit).collect(),
            }),
            LoadedIndex::Unit(unit) => bail!(
                "{} holds the single-sequence index '{}'",
                path.display(),
                unit.name
            ),
        }
    }
}

/// An index file of either kind, dispatched on its format header.
pub enum AnyIndex {
    Single(EsaIndex),
    Multi(MultiSeqIndex),
}

impl AnyIndex {
    pub fn name(&self) -> &str {
        match self {
            Self::Single(i) => i.name(),
            Self::Multi(m) => m.name(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(i) => i.len(),
            Self::Multi(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contigs(&self) -> Vec<&EsaIndex> {
        match self {
            Self::Single(i) => vec![i],
            Self::Multi(m) => m.contigs().iter().collect(),
        }
    }

    pub fn find_hit_positions(&self, pattern: &[u8]) -> Result<Vec<IndexHit<'_>>> {
        match self {
            Self::Single(i) => i.find_hit_positions(pattern),
            Self::Multi(m) => m.find_hit_positions(pattern),
        }
    }

    pub fn find_hit_count(&self, pattern: &[u8]) -> Result<usize> {
        match self {
            Self::Single(i) => i.find_hit_count(pattern),
            Self::Multi(m) => m.find_hit_count(pattern),
        }
    }

    pub fn statistics(&self) -> FxHashMap<char, u64> {
        match self {
            Self::Single(i) => i.statistics(),
            Self::Multi(m) => m.statistics(),
        }
    }
}

/// Open an index file without knowing in advance whether it holds one
/// contig or a container.
pub fn open_index(path: &Path) -> Result<AnyIndex> {
    match store::load(path)? {
        LoadedIndex::Unit(unit) => Ok(AnyIndex::Single(EsaIndex::from_unit(unit))),
        LoadedIndex::Multi { name, units } => Ok(AnyIndex::Multi(MultiSeqIndex {
            name,
            contigs: units.into_iter().map(EsaIndex::from_unit).collect(),
        })),
    }
}

fn build_contigs(sequences: &[Sequence], options: &IndexOptions) -> Result<Vec<EsaIndex>> {
    let pb = ProgressBar::new(sequences.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} contigs {msg}")
            .unwrap()
            .progress_chars("█▓▒░  "),
    );

    let contigs = sequences
        .par_iter()
        .map(|seq| {
            let index = EsaIndex::build(seq, options);
            pb.inc(1);
            index
        })
        .collect::<Result<Vec<_>>>()?;
    pb.finish_and_clear();
    Ok(contigs)
}
