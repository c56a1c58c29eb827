use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

use crate::libs::error::HspError;
use crate::libs::hsp::Strand;
use crate::libs::translate::revcomp;
use crate::libs::twobit::TwoBitFile;

/// Random access to genomic sequence.
pub trait SeqFetcher {
    /// Bases of `chr` from `start` to `end`, 0-based and inclusive.
    ///
    /// The reverse strand returns the reverse complement of the same range.
    fn fetch_sequence(
        &mut self,
        chr: &str,
        start: usize,
        end: usize,
        strand: Strand,
    ) -> Result<Vec<u8>, HspError>;
}

/// Whole sequences held in memory, keyed by name
#[derive(Debug, Default)]
pub struct FastaStore {
    seqs: HashMap<String, Vec<u8>>,
}

impl FastaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every record of a FASTA file. `.gz` files are decompressed.
    /// Later records replace earlier ones with the same name.
    pub fn load(&mut self, infile: &str) -> anyhow::Result<usize> {
        let reader = bio::io::fasta::Reader::new(intspan::reader(infile));
        let mut count = 0;
        for result in reader.records() {
            let record = result?;
            self.insert(record.id(), record.seq());
            count += 1;
        }
        Ok(count)
    }

    pub fn insert(&mut self, name: &str, seq: &[u8]) {
        self.seqs.insert(name.to_string(), seq.to_vec());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seqs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }
}

impl SeqFetcher for FastaStore {
    fn fetch_sequence(
        &mut self,
        chr: &str,
        start: usize,
        end: usize,
        strand: Strand,
    ) -> Result<Vec<u8>, HspError> {
        let not_found = || HspError::RegionNotFound {
            chr: chr.to_string(),
            start,
            end,
        };

        let seq = self.seqs.get(chr).ok_or_else(not_found)?;
        if start > end || end >= seq.len() {
            return Err(not_found());
        }

        let slice = &seq[start..=end];
        Ok(match strand {
            Strand::Forward => slice.to_vec(),
            Strand::Reverse => revcomp(slice),
        })
    }
}

/// FASTA files held in memory plus `.2bit` files read on demand.
///
/// A name is looked up in the FASTA sequences first, then in each `.2bit`
/// file in load order.
#[derive(Debug, Default)]
pub struct GenomeStore {
    fasta: FastaStore,
    twobits: Vec<TwoBitFile<BufReader<File>>>,
}

impl GenomeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one genome file, by extension: `.2bit` is indexed, anything else
    /// is read as (possibly gzipped) FASTA. Returns the number of sequences.
    pub fn load(&mut self, infile: &str) -> anyhow::Result<usize> {
        if infile.ends_with(".2bit") {
            let tb = TwoBitFile::open(infile)?;
            let n = tb.len();
            self.twobits.push(tb);
            Ok(n)
        } else {
            self.fasta.load(infile)
        }
    }
}

impl SeqFetcher for GenomeStore {
    fn fetch_sequence(
        &mut self,
        chr: &str,
        start: usize,
        end: usize,
        strand: Strand,
    ) -> Result<Vec<u8>, HspError> {
        if self.fasta.contains(chr) {
            return self.fasta.fetch_sequence(chr, start, end, strand);
        }
        if let Some(tb) = self.twobits.iter_mut().find(|tb| tb.contains(chr)) {
            return tb.fetch_sequence(chr, start, end, strand);
        }
        Err(HspError::RegionNotFound {
            chr: chr.to_string(),
            start,
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_fetch() {
        let mut store = FastaStore::new();
        store.insert("chr1", b"AACCGGTTac");

        assert_eq!(
            store.fetch_sequence("chr1", 0, 3, Strand::Forward).unwrap(),
            b"AACC".to_vec()
        );
        assert_eq!(
            store.fetch_sequence("chr1", 0, 3, Strand::Reverse).unwrap(),
            b"GGTT".to_vec()
        );
        assert_eq!(
            store.fetch_sequence("chr1", 8, 9, Strand::Forward).unwrap(),
            b"ac".to_vec()
        );
    }

    #[test]
    fn test_fetch_not_found() {
        let mut store = FastaStore::new();
        store.insert("chr1", b"AACCGGTT");

        let err = store.fetch_sequence("chr2", 0, 3, Strand::Forward).unwrap_err();
        assert_eq!(
            err,
            HspError::RegionNotFound {
                chr: "chr2".to_string(),
                start: 0,
                end: 3
            }
        );
        assert!(store.fetch_sequence("chr1", 4, 8, Strand::Forward).is_err());
    }

    #[test]
    fn test_load_fasta() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("genome.fa");
        fs::write(&path, ">I\nACGTACGT\nACGT\n>II desc\nTTTT\n").unwrap();

        let mut store = FastaStore::new();
        let n = store.load(path.to_str().unwrap()).unwrap();
        assert_eq!(n, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.fetch_sequence("I", 6, 9, Strand::Forward).unwrap(),
            b"GTAC".to_vec()
        );
        assert_eq!(
            store.fetch_sequence("II", 0, 3, Strand::Forward).unwrap(),
            b"TTTT".to_vec()
        );
    }

    #[test]
    fn test_load_gzipped_fasta() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("genome.fa.gz");
        {
            let file = fs::File::create(&path).unwrap();
            let mut encoder = GzEncoder::new(file, flate2::Compression::default());
            write!(encoder, ">I\nACGTACGT\n>II\nTTTTCCCC\n").unwrap();
            encoder.finish().unwrap();
        }
        let path = path.to_str().unwrap();
        // really compressed
        assert_eq!(&fs::read(path).unwrap()[..2], &[0x1f, 0x8b]);

        let mut store = FastaStore::new();
        assert_eq!(store.load(path).unwrap(), 2);
        assert_eq!(
            store.fetch_sequence("II", 2, 5, Strand::Reverse).unwrap(),
            b"GGAA".to_vec()
        );
    }

    #[test]
    fn test_genome_store_mixed() {
        let dir = tempdir().unwrap();
        let fa = dir.path().join("query.fa");
        fs::write(&fa, ">I\nACGTACGT\n").unwrap();

        // 2bit v0 holding II = TCAGTCAG
        let mut data = vec![];
        for v in [0x1A412743u32, 0, 1, 0] {
            data.extend_from_slice(&v.to_ne_bytes());
        }
        data.push(2);
        data.extend_from_slice(b"II");
        data.extend_from_slice(&23u32.to_ne_bytes());
        for v in [8u32, 0, 0, 0] {
            data.extend_from_slice(&v.to_ne_bytes());
        }
        data.extend_from_slice(&[0x1B, 0x1B]);
        let tb = dir.path().join("target.2bit");
        fs::write(&tb, data).unwrap();

        let mut store = GenomeStore::new();
        assert_eq!(store.load(fa.to_str().unwrap()).unwrap(), 1);
        assert_eq!(store.load(tb.to_str().unwrap()).unwrap(), 1);

        assert_eq!(
            store.fetch_sequence("I", 0, 3, Strand::Forward).unwrap(),
            b"ACGT".to_vec()
        );
        assert_eq!(
            store.fetch_sequence("II", 0, 3, Strand::Forward).unwrap(),
            b"TCAG".to_vec()
        );
        assert!(matches!(
            store.fetch_sequence("III", 0, 3, Strand::Forward),
            Err(HspError::RegionNotFound { .. })
        ));
    }
}
