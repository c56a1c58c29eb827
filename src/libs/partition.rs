use itertools::Itertools;
use std::cmp::Ordering;

use crate::libs::error::HspError;
use crate::libs::segment::Segment;

/// Order required by [`partition`]:
/// `(target_id, query_id, target_start, target_end, query_start, query_end)`
pub fn partition_cmp(a: &Segment, b: &Segment) -> Ordering {
    a.target_id
        .cmp(&b.target_id)
        .then_with(|| a.query_id.cmp(&b.query_id))
        .then(a.target_start.cmp(&b.target_start))
        .then(a.target_end.cmp(&b.target_end))
        .then(a.query_start.cmp(&b.query_start))
        .then(a.query_end.cmp(&b.query_end))
}

pub fn sort_for_partition(segs: &mut [Segment]) {
    segs.sort_by(partition_cmp);
}

/// Split sorted segments into runs sharing one `(target_id, query_id)` pair.
///
/// A new run starts whenever either identifier changes from the previous
/// segment. Input that breaks the [`partition_cmp`] order is rejected rather
/// than split into several runs of the same pair.
pub fn partition(segs: Vec<Segment>) -> Result<Vec<Vec<Segment>>, HspError> {
    if let Some((prev, cur)) = segs
        .iter()
        .tuple_windows()
        .find(|(prev, cur)| partition_cmp(prev, cur) == Ordering::Greater)
    {
        return Err(HspError::Unsorted(pair_label(cur), pair_label(prev)));
    }

    let parts = segs
        .into_iter()
        .chunk_by(|s| (s.target_id.clone(), s.query_id.clone()))
        .into_iter()
        .map(|(_, group)| group.collect())
        .collect();

    Ok(parts)
}

fn pair_label(seg: &Segment) -> String {
    format!(
        "{}:{}/{}:{}",
        seg.target_id, seg.target_start, seg.query_id, seg.query_start
    )
}
