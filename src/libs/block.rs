use std::cmp::Ordering;
use std::io::Write;

use crate::libs::segment::Segment;

/// Global output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// `target_id, query_id, target_start, query_start`
    #[default]
    TargetFirst,
    /// `query_id, target_id, query_start, target_start`
    QueryFirst,
}

impl Order {
    pub fn compare(&self, a: &Segment, b: &Segment) -> Ordering {
        match self {
            Order::TargetFirst => a
                .target_id
                .cmp(&b.target_id)
                .then_with(|| a.query_id.cmp(&b.query_id))
                .then(a.target_start.cmp(&b.target_start))
                .then(a.query_start.cmp(&b.query_start)),
            Order::QueryFirst => a
                .query_id
                .cmp(&b.query_id)
                .then_with(|| a.target_id.cmp(&b.target_id))
                .then(a.query_start.cmp(&b.query_start))
                .then(a.target_start.cmp(&b.target_start)),
        }
    }
}

/// A segment with its place in the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Numbered {
    /// 1-based position in the final order
    pub ordinal: usize,
    /// Synteny block id, starting at 1
    pub block_id: usize,
    pub segment: Segment,
}

/// True if `cur` continues the block of `prev`.
///
/// Both gaps are signed, so overlapping neighbours always qualify.
pub fn is_adjacent(prev: &Segment, cur: &Segment, distance: i64) -> bool {
    let t_gap = cur.target_start as i64 - prev.target_end as i64;
    let q_gap = cur.query_start as i64 - prev.query_end as i64;

    prev.target_id == cur.target_id
        && prev.query_id == cur.query_id
        && t_gap <= distance
        && q_gap <= distance
}

/// Sort all surviving segments and number them into synteny blocks.
///
/// ```
/// use hspsyn::libs::block::{group_blocks, Order};
/// use hspsyn::libs::segment::Segment;
///
/// let seg = |t: usize, q: usize| Segment {
///     target_id: "I".to_string(),
///     query_id: "I".to_string(),
///     target_start: t,
///     target_end: t + 99,
///     query_start: q,
///     query_end: q + 99,
///     score: 1,
///     ..Default::default()
/// };
/// let numbered = group_blocks(vec![seg(300, 300), seg(0, 0), seg(100, 100)], Order::TargetFirst, 100);
/// let ids: Vec<_> = numbered.iter().map(|n| (n.ordinal, n.block_id)).collect();
/// assert_eq!(ids, vec![(1, 1), (2, 1), (3, 2)]);
/// ```
pub fn group_blocks(mut segs: Vec<Segment>, order: Order, distance: i64) -> Vec<Numbered> {
    segs.sort_by(|a, b| order.compare(a, b));

    let mut numbered: Vec<Numbered> = Vec::with_capacity(segs.len());
    let mut block_id = 1;

    for (i, seg) in segs.into_iter().enumerate() {
        if let Some(prev) = numbered.last() {
            if !is_adjacent(&prev.segment, &seg, distance) {
                block_id += 1;
            }
        }
        numbered.push(Numbered {
            ordinal: i + 1,
            block_id,
            segment: seg,
        });
    }

    numbered
}

/// One output line, without the trailing newline.
///
/// Coordinates are written 1-based. Empty species labels fall back to
/// `query_name`/`target_name`.
pub fn format_line(n: &Numbered, query_name: &str, target_name: &str) -> String {
    let s = &n.segment;
    let label = |species: &str, default: &str| {
        if species.is_empty() {
            default.to_string()
        } else {
            species.to_string()
        }
    };

    [
        format!("{}({})", n.ordinal, n.block_id),
        label(&s.query_species, query_name),
        s.query_id.clone(),
        s.program.clone(),
        s.feature.clone(),
        (s.query_start + 1).to_string(),
        (s.query_end + 1).to_string(),
        s.query_strand.to_string(),
        label(&s.target_species, target_name),
        s.target_id.clone(),
        (s.target_start + 1).to_string(),
        (s.target_end + 1).to_string(),
        s.target_strand.to_string(),
        s.score.to_string(),
        s.identity_pct.to_string(),
        s.positive.clone(),
        s.cigar.clone(),
    ]
    .join("\t")
}

pub fn write_blocks<W: Write + ?Sized>(
    writer: &mut W,
    numbered: &[Numbered],
    query_name: &str,
    target_name: &str,
) -> std::io::Result<()> {
    for n in numbered {
        writeln!(writer, "{}", format_line(n, query_name, target_name))?;
    }
    Ok(())
}
