use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;

use crate::libs::error::HspError;
use crate::libs::fetch::SeqFetcher;
use crate::libs::hsp::Strand;
use crate::libs::translate::revcomp;

const TWOBIT_MAGIC: u32 = 0x1A412743;
const TWOBIT_MAGIC_SWAPPED: u32 = 0x4327411A;

const BASES: [u8; 4] = [b'T', b'C', b'A', b'G'];

/// Half-open masked interval
type Block = Range<usize>;

/// Per-sequence header, read on first access
#[derive(Debug, Clone)]
struct Record {
    dna_size: usize,
    n_blocks: Vec<Block>,
    mask_blocks: Vec<Block>,
    packed_start: u64,
}

/// Blocks of a sorted list touching `start..end`
fn overlapping(blocks: &[Block], start: usize, end: usize) -> impl Iterator<Item = &Block> {
    blocks
        .iter()
        .skip_while(move |b| b.end <= start)
        .take_while(move |b| b.start < end)
}

fn io_err(e: std::io::Error) -> HspError {
    HspError::Store(e.to_string())
}

/// Random access to a UCSC `.2bit` file.
///
/// Versions 0 (32-bit offsets) and 1 (64-bit offsets) are read, in either
/// byte order. N blocks come back as `N`, soft-masked blocks in lowercase.
#[derive(Debug)]
pub struct TwoBitFile<R> {
    reader: R,
    offsets: HashMap<String, u64>,
    records: HashMap<String, Record>,
    is_swapped: bool,
    pub version: u32,
}

impl TwoBitFile<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> TwoBitFile<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        let is_swapped = match u32::from_ne_bytes(buf) {
            TWOBIT_MAGIC => false,
            TWOBIT_MAGIC_SWAPPED => true,
            magic => return Err(anyhow!("Not a valid 2bit file (magic: {:x})", magic)),
        };

        let version = read_u32(&mut reader, is_swapped)?;
        if version > 1 {
            return Err(anyhow!("Unsupported 2bit version: {}", version));
        }
        let seq_count = read_u32(&mut reader, is_swapped)?;
        let _reserved = read_u32(&mut reader, is_swapped)?;

        let mut offsets = HashMap::with_capacity(seq_count as usize);
        for _ in 0..seq_count {
            let mut len_buf = [0u8; 1];
            reader.read_exact(&mut len_buf)?;
            let mut name_buf = vec![0u8; len_buf[0] as usize];
            reader.read_exact(&mut name_buf)?;
            let name = String::from_utf8(name_buf)?;

            let offset = if version == 0 {
                read_u32(&mut reader, is_swapped)? as u64
            } else {
                read_u64(&mut reader, is_swapped)?
            };
            offsets.insert(name, offset);
        }

        Ok(Self {
            reader,
            offsets,
            records: HashMap::new(),
            is_swapped,
            version,
        })
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.offsets.contains_key(name)
    }

    /// Sorted sequence names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.offsets.keys().cloned().collect();
        names.sort();
        names
    }

    fn read_blocks(&mut self) -> std::io::Result<Vec<Block>> {
        let count = read_u32(&mut self.reader, self.is_swapped)? as usize;
        let starts = read_u32_vec(&mut self.reader, count, self.is_swapped)?;
        let sizes = read_u32_vec(&mut self.reader, count, self.is_swapped)?;

        Ok(starts
            .into_iter()
            .zip(sizes)
            .map(|(start, size)| start as usize..(start + size) as usize)
            .collect())
    }

    fn record(&mut self, name: &str) -> Result<Option<Record>, HspError> {
        if let Some(rec) = self.records.get(name) {
            return Ok(Some(rec.clone()));
        }
        let offset = match self.offsets.get(name) {
            Some(&offset) => offset,
            None => return Ok(None),
        };

        self.reader.seek(SeekFrom::Start(offset)).map_err(io_err)?;
        let dna_size = read_u32(&mut self.reader, self.is_swapped).map_err(io_err)? as usize;
        let n_blocks = self.read_blocks().map_err(io_err)?;
        let mask_blocks = self.read_blocks().map_err(io_err)?;
        let _reserved = read_u32(&mut self.reader, self.is_swapped).map_err(io_err)?;
        let packed_start = self.reader.stream_position().map_err(io_err)?;

        let rec = Record {
            dna_size,
            n_blocks,
            mask_blocks,
            packed_start,
        };
        self.records.insert(name.to_string(), rec.clone());
        Ok(Some(rec))
    }

    /// Sequence length, `None` for an unknown name
    pub fn seq_len(&mut self, name: &str) -> Result<Option<usize>, HspError> {
        Ok(self.record(name)?.map(|rec| rec.dna_size))
    }

    /// Bases `start..end` (0-based, half-open) of `name`.
    pub fn read_range(&mut self, name: &str, start: usize, end: usize) -> Result<Vec<u8>, HspError> {
        let not_found = || HspError::RegionNotFound {
            chr: name.to_string(),
            start,
            end,
        };
        let rec = self.record(name)?.ok_or_else(not_found)?;
        if start >= end || end > rec.dna_size {
            return Err(not_found());
        }

        let first_byte = start / 4;
        let last_byte = (end - 1) / 4;
        self.reader
            .seek(SeekFrom::Start(rec.packed_start + first_byte as u64))
            .map_err(io_err)?;
        let mut packed = vec![0u8; last_byte - first_byte + 1];
        self.reader.read_exact(&mut packed).map_err(io_err)?;

        let mut seq: Vec<u8> = (start..end)
            .map(|i| {
                let byte = packed[i / 4 - first_byte];
                BASES[((byte >> (6 - 2 * (i % 4))) & 3) as usize]
            })
            .collect();

        for block in overlapping(&rec.n_blocks, start, end) {
            let (s, e) = (start.max(block.start) - start, end.min(block.end) - start);
            seq[s..e].fill(b'N');
        }
        for block in overlapping(&rec.mask_blocks, start, end) {
            let (s, e) = (start.max(block.start) - start, end.min(block.end) - start);
            seq[s..e].make_ascii_lowercase();
        }

        Ok(seq)
    }
}

impl<R: Read + Seek> SeqFetcher for TwoBitFile<R> {
    fn fetch_sequence(
        &mut self,
        chr: &str,
        start: usize,
        end: usize,
        strand: Strand,
    ) -> Result<Vec<u8>, HspError> {
        if start > end {
            return Err(HspError::RegionNotFound {
                chr: chr.to_string(),
                start,
                end,
            });
        }
        let seq = self.read_range(chr, start, end + 1).map_err(|e| match e {
            HspError::RegionNotFound { .. } => HspError::RegionNotFound {
                chr: chr.to_string(),
                start,
                end,
            },
            e => e,
        })?;

        Ok(match strand {
            Strand::Forward => seq,
            Strand::Reverse => revcomp(&seq),
        })
    }
}

fn read_u32<R: Read>(reader: &mut R, is_swapped: bool) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    let val = u32::from_ne_bytes(buf);
    Ok(if is_swapped { val.swap_bytes() } else { val })
}

fn read_u64<R: Read>(reader: &mut R, is_swapped: bool) -> std::io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    let val = u64::from_ne_bytes(buf);
    Ok(if is_swapped { val.swap_bytes() } else { val })
}

fn read_u32_vec<R: Read>(reader: &mut R, count: usize, is_swapped: bool) -> std::io::Result<Vec<u32>> {
    (0..count).map(|_| read_u32(reader, is_swapped)).collect()
}
