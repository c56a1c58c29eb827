//! Drives records through scoring, overlap resolution and block grouping.

use anyhow::Context;
use std::io::BufRead;
use tracing::{debug, info};

use crate::libs::block::{group_blocks, Numbered, Order};
use crate::libs::fetch::SeqFetcher;
use crate::libs::hsp::{HspRecord, DEFAULT_MIN_LEN};
use crate::libs::partition::{partition, sort_for_partition};
use crate::libs::resolve::resolve_partition;
use crate::libs::segment::{Built, Segment, SegmentBuilder};
use crate::libs::sub_matrix::SubMatrix;

/// Default distance threshold for synteny blocks
pub const DEFAULT_DISTANCE: i64 = 50000;

pub struct BlockOpts<'a> {
    /// Maximum signed gap on both axes inside one block
    pub distance: i64,
    pub order: Order,
    pub matrix: Option<&'a SubMatrix>,
    pub min_len: usize,
}

impl Default for BlockOpts<'_> {
    fn default() -> Self {
        Self {
            distance: DEFAULT_DISTANCE,
            order: Order::TargetFirst,
            matrix: None,
            min_len: DEFAULT_MIN_LEN,
        }
    }
}

/// Counters of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Non-empty, non-comment input lines
    pub lines: usize,
    /// Lines rejected by the parser
    pub skipped_lines: usize,
    /// Segments with a best-frame score <= 0
    pub non_positive: usize,
    pub partitions: usize,
    pub removed_target: usize,
    pub removed_query: usize,
    pub segments: usize,
    pub blocks: usize,
}

impl Stats {
    pub fn log(&self) {
        info!(
            "{} lines read, {} skipped as malformed or shorter than the minimum length",
            self.lines, self.skipped_lines
        );
        info!(
            "{} segments dropped for non-positive score",
            self.non_positive
        );
        info!(
            "{} chromosome pairs, {} segments removed on target axis, {} on query axis",
            self.partitions, self.removed_target, self.removed_query
        );
        info!("{} segments in {} blocks", self.segments, self.blocks);
    }
}

/// Parse and rescore every line of `reader`.
///
/// Skipped lines and non-positive scores are counted in `stats`; a fetch
/// failure aborts.
pub fn build_segments<R: BufRead, F: SeqFetcher>(
    reader: R,
    fetcher: &mut F,
    opts: &BlockOpts,
    stats: &mut Stats,
) -> anyhow::Result<Vec<Segment>> {
    let builder = SegmentBuilder::new(opts.matrix);
    let mut segs = vec![];

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        stats.lines += 1;

        let rec = match HspRecord::parse(line, opts.min_len) {
            Some(rec) => rec,
            None => {
                debug!("Skip line {}: {}", i + 1, line);
                stats.skipped_lines += 1;
                continue;
            }
        };

        match builder
            .build(&rec, fetcher)
            .with_context(|| format!("line {}", i + 1))?
        {
            Built::Kept(seg) => segs.push(seg),
            Built::Dropped(fs) => {
                debug!("Drop line {}: best frame {} scores {}", i + 1, fs.frame, fs.score);
                stats.non_positive += 1;
            }
        }
    }

    Ok(segs)
}

/// Resolve overlaps per chromosome pair, then group everything into blocks.
pub fn consolidate(
    mut segs: Vec<Segment>,
    opts: &BlockOpts,
    stats: &mut Stats,
) -> anyhow::Result<Vec<Numbered>> {
    sort_for_partition(&mut segs);
    let parts = partition(segs)?;
    stats.partitions = parts.len();

    let mut accepted = vec![];
    for part in parts {
        let (t_id, q_id) = (part[0].target_id.clone(), part[0].query_id.clone());
        let n = part.len();

        let (kept, removed_target, removed_query) = resolve_partition(part);
        debug!(
            "{}/{}: {} segments, {} kept",
            t_id,
            q_id,
            n,
            kept.len()
        );

        stats.removed_target += removed_target;
        stats.removed_query += removed_query;
        accepted.extend(kept);
    }

    let numbered = group_blocks(accepted, opts.order, opts.distance);
    stats.segments = numbered.len();
    stats.blocks = numbered.last().map(|n| n.block_id).unwrap_or(0);

    Ok(numbered)
}

/// The whole run: records in, numbered segments and counters out.
pub fn run<R: BufRead, F: SeqFetcher>(
    reader: R,
    fetcher: &mut F,
    opts: &BlockOpts,
) -> anyhow::Result<(Vec<Numbered>, Stats)> {
    let mut stats = Stats::default();
    let segs = build_segments(reader, fetcher, opts, &mut stats)?;
    let numbered = consolidate(segs, opts, &mut stats)?;
    Ok((numbered, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::error::HspError;
    use crate::libs::fetch::FastaStore;
    use std::io::Cursor;

    // 60 bp, no stop codon in frame 0
    const CHR: &[u8] = b"ATGGCCAAACCCGGGTTTATGGCCAAACCCGGGTTTATGGCCAAACCCGGGTTTGCTGCT";

    fn store() -> FastaStore {
        let mut store = FastaStore::new();
        store.insert("I", CHR);
        store.insert("II", CHR);
        store.insert("A", b"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");
        store.insert("C", b"CCCCCCCCCCCCCCCCCCCCCCCCCCCCCC");
        store
    }

    #[test]
    fn test_short_line_never_reaches_builder() {
        // span 10 on the query: skipped before any fetch, even though the
        // chromosome does not exist
        let input = "nope\tp\tf\t1\t11\tnope\t1\t11\t5\t0\n";
        let (numbered, stats) = run(Cursor::new(input), &mut store(), &BlockOpts::default()).unwrap();
        assert!(numbered.is_empty());
        assert_eq!(stats.lines, 1);
        assert_eq!(stats.skipped_lines, 1);
        assert_eq!(stats.non_positive, 0);
    }

    #[test]
    fn test_non_positive_counted() {
        let input = "A\tp\tf\t1\t30\tC\t1\t30\t5\t0\n";
        let (numbered, stats) = run(Cursor::new(input), &mut store(), &BlockOpts::default()).unwrap();
        assert!(numbered.is_empty());
        assert_eq!(stats.non_positive, 1);
        assert_eq!(stats.skipped_lines, 0);
    }

    #[test]
    fn test_missing_region_is_fatal() {
        let input = "I\tp\tf\t1\t30\tIII\t1\t30\t5\t0\n";
        let err = run(Cursor::new(input), &mut store(), &BlockOpts::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HspError>(),
            Some(HspError::RegionNotFound { .. })
        ));
    }

    #[test]
    fn test_run_end_to_end() {
        let input = "\
# comment
I\tp\tf\t1\t18\tII\t1\t18\t5\t0
I\tp\tf\t1\t18\tII\t1\t21\t5\t0
I\tp\tf\t37\t54\tII\t37\t54\t5\t0
I\tp\tf\t1\t18\tI\t1\t18\t5\t0
";
        let opts = BlockOpts {
            distance: 10,
            ..Default::default()
        };
        let (numbered, stats) = run(Cursor::new(input), &mut store(), &opts).unwrap();

        assert_eq!(stats.lines, 4);
        assert_eq!(stats.partitions, 2);
        // the second line duplicates the first on both axes
        assert_eq!(stats.removed_target + stats.removed_query, 1);
        assert_eq!(stats.segments, 3);

        // target I before target II; on II, a target gap of 16 splits the block
        let ids: Vec<(usize, usize)> = numbered.iter().map(|n| (n.ordinal, n.block_id)).collect();
        assert_eq!(ids, vec![(1, 1), (2, 2), (3, 3)]);
        assert_eq!(stats.blocks, 3);
        for n in &numbered {
            assert!(n.segment.score > 0);
            assert!(n.segment.query_start <= n.segment.query_end);
            assert!(n.segment.target_start <= n.segment.target_end);
        }
    }
}
