use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use esax::esa::backend::BackendTag;
use esax::esa::{BackendChoice, EsaIndex, IndexOptions};
use esax::multi::{MultiSeqIndex, open_index};
use esax::seq::fasta::read_fasta;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "esax")]
#[command(about = "Enhanced suffix array indexing and both-strand search for DNA")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from a FASTA file
    Index {
        /// FASTA file with one or more sequence records
        fasta: PathBuf,

        /// Output index file
        #[arg(short, long)]
        output: PathBuf,

        /// Storage backend
        #[arg(long, value_enum, default_value_t = BackendArg::Dense)]
        backend: BackendArg,

        /// Bucket table prefix depth (1-8)
        #[arg(long, default_value_t = 8)]
        depth: u32,
    },
    /// Search an index for a pattern on both strands
    Query {
        /// Index file
        index: PathBuf,

        /// Query pattern (IUPAC letters, case-insensitive)
        pattern: String,

        /// Print only the hit count
        #[arg(long)]
        count: bool,

        /// Repeat the query and report per-query timing
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },
    /// Show index statistics
    Stats {
        /// Index file
        index: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Dense,
    Packed,
    Mmap,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            fasta,
            output,
            backend,
            depth,
        } => build_index(&fasta, &output, backend, depth),
        Commands::Query {
            index,
            pattern,
            count,
            repeat,
        } => run_query(&index, &pattern, count, repeat.max(1)),
        Commands::Stats { index, json } => show_stats(&index, json),
    }
}

fn build_index(fasta: &Path, output: &Path, backend: BackendArg, depth: u32) -> Result<()> {
    let sequences = read_fasta(fasta)?;
    let options = IndexOptions {
        backend: match backend {
            BackendArg::Dense => BackendChoice::Dense,
            BackendArg::Packed => BackendChoice::Packed,
            BackendArg::Mmap => BackendChoice::Mmap(output.to_path_buf()),
        },
        bucket_depth: depth,
    };
    // The mapped backend writes the index file as part of construction.
    let already_saved = matches!(backend, BackendArg::Mmap);

    let start = Instant::now();
    if sequences.len() == 1 {
        let index = EsaIndex::build(&sequences[0], &options)?;
        if !already_saved {
            index.save(output)?;
        }
        println!(
            "Indexed {} ({} bases) in {:.2?} -> {}",
            index.name(),
            index.len(),
            start.elapsed(),
            output.display()
        );
    } else {
        let name = fasta
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("index");
        let index = MultiSeqIndex::build(name, &sequences, &options)?;
        if !already_saved {
            index.save(output)?;
        }
        println!(
            "Indexed {} contigs ({} bases) in {:.2?} -> {}",
            index.contigs().len(),
            index.len(),
            start.elapsed(),
            output.display()
        );
    }
    Ok(())
}

fn run_query(index_path: &Path, pattern: &str, count_only: bool, repeat: u32) -> Result<()> {
    let index = open_index(index_path)?;
    let pattern = pattern.as_bytes();

    let start = Instant::now();
    if count_only {
        let mut count = 0;
        for _ in 0..repeat {
            count = index.find_hit_count(pattern)?;
        }
        println!("{count}");
    } else {
        let mut hits = index.find_hit_positions(pattern)?;
        for _ in 1..repeat {
            hits = index.find_hit_positions(pattern)?;
        }
        for hit in &hits {
            println!("{}\t{}\t{}", hit.contig(), hit.position(), hit.strand());
        }
        println!("{} hits", hits.len());
    }

    if repeat > 1 {
        let elapsed = start.elapsed();
        println!(
            "{repeat} queries in {elapsed:.2?} ({:.1} us/query)",
            elapsed.as_secs_f64() * 1e6 / repeat as f64
        );
    }
    Ok(())
}

fn show_stats(index_path: &Path, json: bool) -> Result<()> {
    let index = open_index(index_path)?;
    // Deterministic character order for both output forms.
    let counts: BTreeMap<char, u64> = index.statistics().into_iter().collect();

    if json {
        let contigs: Vec<serde_json::Value> = index
            .contigs()
            .iter()
            .map(|c| {
                serde_json::json!({
                    "name": c.name(),
                    "length": c.len(),
                    "backend": backend_name(c.backend()),
                    "bucket_depth": c.bucket_depth(),
                })
            })
            .collect();
        let out = serde_json::json!({
            "name": index.name(),
            "length": index.len(),
            "contigs": contigs,
            "counts": counts.iter().map(|(c, n)| (c.to_string(), n)).collect::<BTreeMap<_, _>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out).context("stats serialization")?);
        return Ok(());
    }

    println!("{}: {} bases", index.name(), index.len());
    for contig in index.contigs() {
        println!(
            "  {}: {} bases, {} backend, bucket depth {}",
            contig.name(),
            contig.len(),
            backend_name(contig.backend()),
            contig.bucket_depth()
        );
    }
    for (c, n) in &counts {
        println!("  {c}: {n}");
    }
    Ok(())
}

fn backend_name(tag: BackendTag) -> &'static str {
    match tag {
        BackendTag::Dense => "dense",
        BackendTag::Packed => "packed",
        BackendTag::Mmap => "mmap",
    }
}
