//! # esax - Enhanced Suffix Array index for DNA
//!
//! esax builds an enhanced suffix array (suffix table, lcp table, child
//! table and bucket table) over DNA sequences and answers exact-match
//! substring queries on both strands, the workhorse query behind screening
//! candidate primers for unwanted secondary binding sites.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`seq`] - Sequence normalization, reverse complement, FASTA parsing
//! - [`esa`] - Table construction, storage backends, search, persistence
//! - [`hit`] - Strand-aware match positions and subsequence extraction
//! - [`multi`] - Composition of per-contig indexes into one logical index
//! - [`utils`] - Progress reporting
//!
//! ## Quick Start
//!
//! ```ignore
//! use esax::esa::{EsaIndex, IndexOptions};
//! use esax::seq::Sequence;
//!
//! let seq = Sequence::new("chr1", b"ATGCNATGCN")?;
//! let index = EsaIndex::build(&seq, &IndexOptions::default())?;
//!
//! for hit in index.find_hit_positions(b"ATGCN")? {
//!     println!("{}:{} ({})", hit.contig(), hit.position(), hit.strand());
//! }
//! ```
//!
//! ## Backends
//!
//! Three storage backends answer every query identically and differ only
//! in cost: dense word-per-rank tables, byte-packed tables that recompute
//! clipped values on demand, and memory-mapped tables served straight from
//! the index file. An index is persisted as a single unit whose format
//! header records the backend to reconstruct at load time.

pub mod esa;
pub mod hit;
pub mod multi;
pub mod seq;
pub mod utils;
