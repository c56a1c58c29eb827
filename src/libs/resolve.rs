//! Greedy removal of redundant segments within one chromosome pair.
//!
//! Segments are swept in the order of one axis (the primary axis). At each
//! step a champion, the last segment still standing, is compared with the
//! next segment, the challenger. Overlapping pairs on the same strands are
//! treated as pieces of one alignment and the weaker, non-extending piece is
//! removed; overlapping pairs on different strands are competing alignments
//! and the lower score loses.

use std::cmp::Ordering;

use crate::libs::segment::Segment;

/// Extension tolerance, in coordinate units
pub const EXTEND_TOLERANCE: i64 = 6;

/// The axis segments are sorted by. The other one is checked for overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Target,
    Query,
}

/// What to do with opposite-strand overlaps of equal score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieRule {
    DropChallenger,
    KeepBoth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOpts {
    pub axis: Axis,
    pub tie: TieRule,
    pub tolerance: i64,
}

impl ResolveOpts {
    /// First pass: sorted by target, ties drop the challenger
    pub fn target_pass() -> Self {
        Self {
            axis: Axis::Target,
            tie: TieRule::DropChallenger,
            tolerance: EXTEND_TOLERANCE,
        }
    }

    /// Second pass: sorted by query, ties keep both segments
    pub fn query_pass() -> Self {
        Self {
            axis: Axis::Query,
            tie: TieRule::KeepBoth,
            tolerance: EXTEND_TOLERANCE,
        }
    }
}

/// Survivors of one sweep and how many segments it removed
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub kept: Vec<Segment>,
    pub removed: usize,
}

/// `(start, end)` of a segment on the primary and secondary axes
fn spans(seg: &Segment, axis: Axis) -> ((i64, i64), (i64, i64)) {
    let t = (seg.target_start as i64, seg.target_end as i64);
    let q = (seg.query_start as i64, seg.query_end as i64);
    match axis {
        Axis::Target => (t, q),
        Axis::Query => (q, t),
    }
}

pub fn axis_cmp(axis: Axis) -> impl Fn(&Segment, &Segment) -> Ordering {
    move |a, b| {
        let ((ap, aps), (as_, ase)) = spans(a, axis);
        let ((bp, bps), (bs, bse)) = spans(b, axis);
        ap.cmp(&bp)
            .then(aps.cmp(&bps))
            .then(as_.cmp(&bs))
            .then(ase.cmp(&bse))
    }
}

pub fn sort_by_axis(segs: &mut [Segment], axis: Axis) {
    segs.sort_by(axis_cmp(axis));
}

fn overlaps(champ: &Segment, chal: &Segment, axis: Axis) -> bool {
    let ((_, champ_p_end), (champ_s_start, champ_s_end)) = spans(champ, axis);
    let ((chal_p_start, _), (chal_s_start, chal_s_end)) = spans(chal, axis);

    chal_p_start <= champ_p_end
        && ((champ_s_start..=champ_s_end).contains(&chal_s_start)
            || (chal_s_start..=chal_s_end).contains(&champ_s_start))
}

fn same_strands(a: &Segment, b: &Segment) -> bool {
    a.query_strand == b.query_strand && a.target_strand == b.target_strand
}

/// Outcome of one champion/challenger comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Both stay, the challenger becomes champion
    Advance,
    /// The champion is removed, the challenger becomes champion
    DropChampion,
    /// The challenger is removed, the champion stays
    DropChallenger,
}

fn compare(champ: &Segment, chal: &Segment, opts: &ResolveOpts) -> Step {
    if !overlaps(champ, chal, opts.axis) {
        return Step::Advance;
    }

    if same_strands(champ, chal) {
        let (_, (champ_s_start, champ_s_end)) = spans(champ, opts.axis);
        let (_, (chal_s_start, chal_s_end)) = spans(chal, opts.axis);
        let start_delta = chal_s_start - champ_s_start;
        let end_delta = chal_s_end - champ_s_end;

        if chal.score >= champ.score {
            // the champion survives only if it sticks out well beyond the challenger
            if start_delta > opts.tolerance || end_delta < -opts.tolerance {
                Step::Advance
            } else {
                Step::DropChampion
            }
        } else if end_delta > opts.tolerance {
            Step::Advance
        } else {
            Step::DropChallenger
        }
    } else {
        match chal.score.cmp(&champ.score) {
            Ordering::Greater => Step::DropChampion,
            Ordering::Less => Step::DropChallenger,
            Ordering::Equal => match opts.tie {
                TieRule::DropChallenger => Step::DropChallenger,
                TieRule::KeepBoth => Step::Advance,
            },
        }
    }
}

/// Sweep segments already sorted along `opts.axis`.
///
/// The input is never modified; the champion is tracked by index into it and
/// a keep mask records removals. Survivors keep their input order. A single
/// pass is made, without iterating to a fixed point: when a weak extension
/// advances past a champion and is then dropped by its own challenger, the
/// earlier champion and that challenger are never compared, and a second
/// sweep may remove more.
pub fn resolve(sorted: &[Segment], opts: &ResolveOpts) -> Resolution {
    if sorted.is_empty() {
        return Resolution::default();
    }

    let mut keep = vec![true; sorted.len()];
    let mut champ = 0;

    for chal in 1..sorted.len() {
        match compare(&sorted[champ], &sorted[chal], opts) {
            Step::Advance => champ = chal,
            Step::DropChampion => {
                keep[champ] = false;
                champ = chal;
            }
            Step::DropChallenger => keep[chal] = false,
        }
    }

    let kept: Vec<Segment> = sorted
        .iter()
        .zip(keep.iter())
        .filter(|(_, k)| **k)
        .map(|(s, _)| s.clone())
        .collect();
    let removed = sorted.len() - kept.len();

    Resolution { kept, removed }
}

/// Both passes over one chromosome pair.
///
/// Returns the survivors in query order, plus the removal counts of the
/// target pass and the query pass.
pub fn resolve_partition(mut segs: Vec<Segment>) -> (Vec<Segment>, usize, usize) {
    sort_by_axis(&mut segs, Axis::Target);
    let first = resolve(&segs, &ResolveOpts::target_pass());

    let mut survivors = first.kept;
    sort_by_axis(&mut survivors, Axis::Query);
    let second = resolve(&survivors, &ResolveOpts::query_pass());

    (second.kept, first.removed, second.removed)
}
