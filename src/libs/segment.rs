use crate::libs::error::HspError;
use crate::libs::fetch::SeqFetcher;
use crate::libs::frame::{score_pair, FrameScore};
use crate::libs::hsp::{HspRecord, Strand};
use crate::libs::sub_matrix::SubMatrix;

/// A rescored alignment between a query and a target region.
///
/// Coordinates are 0-based and inclusive. `score` is always positive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub query_species: String,
    pub query_id: String,
    pub query_start: usize,
    pub query_end: usize,
    pub query_strand: Strand,
    pub target_species: String,
    pub target_id: String,
    pub target_start: usize,
    pub target_end: usize,
    pub target_strand: Strand,
    pub score: i32,
    pub identity_pct: u32,
    pub frame: usize,
    // carried through untouched
    pub program: String,
    pub feature: String,
    pub aligner_score: String,
    pub pvalue: String,
    pub identity: String,
    pub positive: String,
    pub cigar: String,
}

impl Segment {
    /// Target span in nucleotides
    pub fn length(&self) -> usize {
        self.target_end - self.target_start + 1
    }
}

/// Percent identity over the translated length, rounded half away from zero
pub fn identity_pct(identity: usize, length: usize) -> u32 {
    let aa_len = length / 3;
    if aa_len == 0 {
        return 0;
    }
    (identity as f64 / aa_len as f64 * 100.0).round() as u32
}

/// Outcome of building one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Built {
    Kept(Segment),
    /// Best frame score was zero or negative
    Dropped(FrameScore),
}

/// Turns parsed aligner records into rescored segments.
pub struct SegmentBuilder<'a> {
    matrix: Option<&'a SubMatrix>,
}

impl<'a> SegmentBuilder<'a> {
    pub fn new(matrix: Option<&'a SubMatrix>) -> Self {
        Self { matrix }
    }

    /// Fetch both regions of `rec` and rescore them.
    ///
    /// Fetch failures and matrix lookups without a score are errors; a
    /// non-positive score is a [`Built::Dropped`].
    pub fn build<F: SeqFetcher>(&self, rec: &HspRecord, fetcher: &mut F) -> Result<Built, HspError> {
        let (q_start, q_end) = rec.query_range();
        let (t_start, t_end) = rec.target_range();

        let q_seq = fetcher.fetch_sequence(&rec.query.chr, q_start, q_end, rec.query_strand())?;
        let t_seq = fetcher.fetch_sequence(&rec.target.chr, t_start, t_end, rec.target_strand())?;

        self.build_with_seqs(rec, &q_seq, &t_seq)
    }

    /// Rescore `rec` against already fetched sequences.
    pub fn build_with_seqs(
        &self,
        rec: &HspRecord,
        q_seq: &[u8],
        t_seq: &[u8],
    ) -> Result<Built, HspError> {
        let fs = score_pair(q_seq, t_seq, self.matrix)?;
        if fs.score <= 0 {
            return Ok(Built::Dropped(fs));
        }

        let (query_start, query_end) = rec.query_range();
        let (target_start, target_end) = rec.target_range();

        let query_strand = if fs.is_reverse() {
            rec.query_strand().flip()
        } else {
            rec.query_strand()
        };

        let length = target_end - target_start + 1;

        Ok(Built::Kept(Segment {
            query_species: rec.query.species.clone(),
            query_id: rec.query.chr.clone(),
            query_start,
            query_end,
            query_strand,
            target_species: rec.target.species.clone(),
            target_id: rec.target.chr.clone(),
            target_start,
            target_end,
            target_strand: rec.target_strand(),
            score: fs.score,
            identity_pct: identity_pct(fs.identity, length),
            frame: fs.frame,
            program: rec.program.clone(),
            feature: rec.feature.clone(),
            aligner_score: rec.aligner_score.clone(),
            pvalue: rec.pvalue.clone(),
            identity: rec.identity.clone(),
            positive: rec.positive.clone(),
            cigar: rec.cigar.clone(),
        }))
    }
}
