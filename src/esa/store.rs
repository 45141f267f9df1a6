//! On-disk index format
//!
//! One file holds either a single index unit (magic `ESAX`) or a container
//! of length-prefixed units (magic `ESAM`). The format header decides how
//! the file is interpreted; the file name carries no meaning. All integers
//! are little-endian, and the four tables are written at full u32 width
//! regardless of the in-memory backend, so a memory-mapped reader can
//! address them in place.
//!
//! Unit layout:
//!
//! ```text
//! magic u32 | version u32 | backend tag u8 | bucket depth u32
//! name len u32 | name bytes
//! n u64 | text (n bytes)
//! suftab, lcp, child: (n + 1) x u32 each
//! bucket entry count u64 | entries: (key u64, rank u32) sorted by key
//! ```

use super::backend::mmap::TableLayout;
use super::backend::{BackendTag, DenseTables, MmapTables, PackedTables, TableStore, Tables};
use super::bucket::BucketTable;
use super::child::VACANT;
use anyhow::{Context, Result, bail};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

const UNIT_MAGIC: u32 = u32::from_le_bytes(*b"ESAX");
const MULTI_MAGIC: u32 = u32::from_le_bytes(*b"ESAM");
const FORMAT_VERSION: u32 = 1;

/// Borrowed view of one index unit for serialization. The tag names the
/// backend a reader should construct, which may differ from the backend
/// the tables currently live in (a dense build written for mapped access).
pub struct UnitRef<'a> {
    pub name: &'a str,
    pub tag: BackendTag,
    pub depth: u32,
    pub tables: &'a TableStore,
    pub bucket: &'a BucketTable,
}

/// One deserialized unit, backend already constructed per its tag.
pub struct LoadedUnit {
    pub name: String,
    pub depth: u32,
    pub tables: TableStore,
    pub bucket: BucketTable,
}

/// A parsed index file, dispatched on the format header.
pub enum LoadedIndex {
    Unit(LoadedUnit),
    Multi { name: String, units: Vec<LoadedUnit> },
}

/// Write a single-unit index file.
pub fn save_unit(path: &Path, unit: &UnitRef) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create index file {}", path.display()))?;
    let mut w = BufWriter::with_capacity(65536, file);
    write_unit(&mut w, unit)?;
    w.flush()?;
    Ok(())
}

/// Write a multi-unit container file.
pub fn save_multi(path: &Path, name: &str, units: &[UnitRef]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create index file {}", path.display()))?;
    let mut w = BufWriter::with_capacity(65536, file);
    w.write_all(&MULTI_MAGIC.to_le_bytes())?;
    w.write_all(&FORMAT_VERSION.to_le_bytes())?;
    let name_bytes = name.as_bytes();
    w.write_all(&(name_bytes.len() as u32).to_le_bytes())?;
    w.write_all(name_bytes)?;
    w.write_all(&(units.len() as u32).to_le_bytes())?;
    for unit in units {
        // Length-prefixed blobs so a reader can skip units it does not
        // need without parsing them.
        let mut blob = Vec::new();
        write_unit(&mut blob, unit)?;
        w.write_all(&(blob.len() as u64).to_le_bytes())?;
        w.write_all(&blob)?;
    }
    w.flush()?;
    Ok(())
}

/// Open an index file and construct its backend(s). The whole file is
/// memory-mapped up front; dense and packed units copy their tables out of
/// the map, mapped units keep a shared handle to it.
pub fn load(path: &Path) -> Result<LoadedIndex> {
    let file = File::open(path)
        .with_context(|| format!("failed to open index file {}", path.display()))?;
    let map = Arc::new(unsafe { Mmap::map(&file)? });

    match read_u32(&map, 0)? {
        UNIT_MAGIC => {
            let (unit, _) = load_unit(&map, 0)?;
            Ok(LoadedIndex::Unit(unit))
        }
        MULTI_MAGIC => {
            let version = read_u32(&map, 4)?;
            if version != FORMAT_VERSION {
                bail!("unsupported index format version {version}");
            }
            let name_len = read_u32(&map, 8)? as usize;
            let name = read_str(&map, 12, name_len)?;
            let count = read_u32(&map, 12 + name_len)? as usize;
            let mut off = 16 + name_len;
            let mut units = Vec::with_capacity(count);
            for _ in 0..count {
                let blob_len = read_u64(&map, off)? as usize;
                let (unit, end) = load_unit(&map, off + 8)?;
                if end != off + 8 + blob_len {
                    bail!("container entry length does not match its unit");
                }
                units.push(unit);
                off = end;
            }
            Ok(LoadedIndex::Multi { name, units })
        }
        _ => bail!("{}: not an index file (bad magic)", path.display()),
    }
}

fn write_unit<W: Write>(w: &mut W, unit: &UnitRef) -> Result<()> {
    let t = unit.tables;
    let n = t.suffix_count();

    w.write_all(&UNIT_MAGIC.to_le_bytes())?;
    w.write_all(&FORMAT_VERSION.to_le_bytes())?;
    w.write_all(&[unit.tag as u8])?;
    w.write_all(&unit.depth.to_le_bytes())?;
    let name_bytes = unit.name.as_bytes();
    w.write_all(&(name_bytes.len() as u32).to_le_bytes())?;
    w.write_all(name_bytes)?;
    w.write_all(&(n as u64).to_le_bytes())?;
    w.write_all(t.text())?;

    write_table(w, n, |i| t.suftab(i))?;
    write_table(w, n, |i| t.lcp(i))?;
    write_table(w, n, |i| t.child_slot(i).unwrap_or(VACANT))?;

    let entries = unit.bucket.entries_sorted();
    w.write_all(&(entries.len() as u64).to_le_bytes())?;
    for (key, rank) in entries {
        w.write_all(&key.to_le_bytes())?;
        w.write_all(&rank.to_le_bytes())?;
    }
    Ok(())
}

/// Write one u32 table, buffered to keep system call overhead down.
fn write_table<W: Write>(w: &mut W, n: usize, value: impl Fn(usize) -> u32) -> Result<()> {
    let mut buffer = Vec::with_capacity(8 * 1024);
    for i in 0..=n {
        buffer.extend_from_slice(&value(i).to_le_bytes());
        if buffer.len() >= 8 * 1024 {
            w.write_all(&buffer)?;
            buffer.clear();
        }
    }
    if !buffer.is_empty() {
        w.write_all(&buffer)?;
    }
    Ok(())
}

/// Parse one unit starting at `base` and construct its backend. Returns
/// the unit and the offset one past its last byte.
fn load_unit(map: &Arc<Mmap>, base: usize) -> Result<(LoadedUnit, usize)> {
    let data = &map[..];

    if read_u32(data, base)? != UNIT_MAGIC {
        bail!("bad unit magic");
    }
    let version = read_u32(data, base + 4)?;
    if version != FORMAT_VERSION {
        bail!("unsupported index format version {version}");
    }
    let tag = BackendTag::from_u8(*data.get(base + 8).context("index data is truncated")?)?;
    let depth = read_u32(data, base + 9)?;
    let name_len = read_u32(data, base + 13)? as usize;
    let mut off = base + 17;
    let name = read_str(data, off, name_len)?;
    off += name_len;
    let n = read_u64(data, off)? as usize;
    off += 8;

    let layout = TableLayout {
        n,
        text: off,
        suftab: off + n,
        lcp: off + n + 4 * (n + 1),
        child: off + n + 8 * (n + 1),
    };
    off += n + 12 * (n + 1);

    let entry_count = read_u64(data, off)? as usize;
    off += 8;
    let mut entries = Vec::with_capacity(entry_count);
    for _ in 0..entry_count {
        entries.push((read_u64(data, off)?, read_u32(data, off + 8)?));
        off += 12;
    }
    let bucket = BucketTable::from_entries(depth, entries);

    let tables = match tag {
        BackendTag::Dense => TableStore::Dense(DenseTables::new(
            data[layout.text..layout.text + n].to_vec(),
            decode_u32s(data, layout.suftab, n + 1),
            decode_u32s(data, layout.lcp, n + 1),
            decode_u32s(data, layout.child, n + 1),
        )),
        BackendTag::Packed => {
            let lcp = decode_u32s(data, layout.lcp, n + 1);
            let child = decode_u32s(data, layout.child, n + 1);
            TableStore::Packed(PackedTables::pack(
                data[layout.text..layout.text + n].to_vec(),
                decode_u32s(data, layout.suftab, n + 1),
                &lcp,
                &child,
            ))
        }
        BackendTag::Mmap => TableStore::Mmap(MmapTables::new(Arc::clone(map), layout)),
    };

    Ok((
        LoadedUnit {
            name,
            depth,
            tables,
            bucket,
        },
        off,
    ))
}

fn read_u32(data: &[u8], off: usize) -> Result<u32> {
    let bytes = data.get(off..off + 4).context("index data is truncated")?;
    Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
}

fn read_u64(data: &[u8], off: usize) -> Result<u64> {
    let bytes = data.get(off..off + 8).context("index data is truncated")?;
    Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
}

fn read_str(data: &[u8], off: usize, len: usize) -> Result<String> {
    let bytes = data.get(off..off + len).context("index data is truncated")?;
    Ok(std::str::from_utf8(bytes)
        .context("index name is not valid UTF-8")?
        .to_owned())
}

/// Bounds were validated by the reads past this region; slicing here is a
/// plain copy.
fn decode_u32s(data: &[u8], off: usize, count: usize) -> Vec<u32> {
    data[off..off + 4 * count]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
        .collect()
}
