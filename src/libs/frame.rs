//! Six-frame amino-acid rescoring of a gapless nucleotide alignment.

use crate::libs::error::HspError;
use crate::libs::sub_matrix::SubMatrix;
use crate::libs::translate::{revcomp, six_frames, translate};

/// Score of a match when no matrix is given
pub const MATCH_SCORE: i32 = 2;
/// Score of a mismatch when no matrix is given
pub const MISMATCH_SCORE: i32 = -1;

/// Best frame of a sequence pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameScore {
    pub score: i32,
    pub identity: usize,
    /// 0..3 forward, 3..6 reverse complement
    pub frame: usize,
}

impl FrameScore {
    pub fn is_reverse(&self) -> bool {
        self.frame >= 3
    }
}

/// Score two peptides position by position, truncated to the shorter one.
fn score_peptides(
    pep1: &[u8],
    pep2: &[u8],
    matrix: Option<&SubMatrix>,
) -> Result<(i32, usize), HspError> {
    let mut score = 0;
    let mut identity = 0;

    for (&aa1, &aa2) in pep1.iter().zip(pep2.iter()) {
        match matrix {
            Some(m) => {
                score += m
                    .get_score(aa1, aa2)
                    .ok_or(HspError::MissingResidue(aa1 as char, aa2 as char))?;
                if aa1 == aa2 {
                    identity += 1;
                }
            }
            None => {
                if aa1 == aa2 {
                    score += MATCH_SCORE;
                    identity += 1;
                } else {
                    score += MISMATCH_SCORE;
                }
            }
        }
    }

    Ok((score, identity))
}

/// Rescore a pair of aligned nucleotide sequences in all six frames and keep
/// the best one.
///
/// Frames are tried in order 0..6 and only a strictly greater score replaces
/// the current best, so ties resolve to the lower frame index. The only error
/// is a matrix without a score for a translated residue.
///
/// ```
/// use hspsyn::libs::frame::score_pair;
/// let fs = score_pair(b"ATGGCCAAA", b"ATGGCCAAA", None).unwrap();
/// assert_eq!(fs.score, 6);
/// assert_eq!(fs.identity, 3);
/// assert_eq!(fs.frame, 0);
/// ```
pub fn score_pair(
    seq1: &[u8],
    seq2: &[u8],
    matrix: Option<&SubMatrix>,
) -> Result<FrameScore, HspError> {
    let frames1 = six_frames(seq1);
    let frames2 = six_frames(seq2);

    let mut best: Option<FrameScore> = None;
    for (frame, (pep1, pep2)) in frames1.iter().zip(frames2.iter()).enumerate() {
        let (score, identity) = score_peptides(pep1, pep2, matrix)?;
        match best {
            Some(b) if score <= b.score => {}
            _ => {
                best = Some(FrameScore {
                    score,
                    identity,
                    frame,
                })
            }
        }
    }

    // six_frames always yields six entries
    Ok(best.unwrap_or(FrameScore {
        score: 0,
        identity: 0,
        frame: 0,
    }))
}

/// Peptides of a chosen frame, as they were scored.
///
/// Reverse frames come from the reverse complement of both sequences at
/// offset `frame - 3`. Both peptides are truncated to the shorter length.
pub fn frame_peptides(seq1: &[u8], seq2: &[u8], frame: usize) -> (Vec<u8>, Vec<u8>) {
    let (mut pep1, mut pep2) = if frame < 3 {
        (translate(seq1, frame), translate(seq2, frame))
    } else {
        (
            translate(&revcomp(seq1), frame - 3),
            translate(&revcomp(seq2), frame - 3),
        )
    };

    let len = pep1.len().min(pep2.len());
    pep1.truncate(len);
    pep2.truncate(len);
    (pep1, pep2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_one_codon_differs() {
        // ATG AAA vs ATG CCC: M K vs M P in frame 0; frame 3 ties (F H vs G H)
        let fs = score_pair(b"ATGAAA", b"ATGCCC", None).unwrap();
        let n = 2;
        assert_eq!(fs.score, 2 * (n - 1) - 1);
        assert_eq!(fs.identity, 1);
        assert_eq!(fs.frame, 0);
    }

    #[test]
    fn test_frame_range_and_determinism() {
        let s1 = b"ACGTTGCAAGGCTTACCGATAGGCTAGCTAGGATCC";
        let s2 = b"ACGTTGCTAGGCTTACAGATAGGCTAGCAAGGATCC";
        let a = score_pair(s1, s2, None).unwrap();
        let b = score_pair(s1, s2, None).unwrap();
        assert_eq!(a, b);
        assert!(a.frame < 6);
    }

    #[test]
    fn test_tie_prefers_lower_frame() {
        // identical sequences: frames 0 and 3 have the most residues and tie
        let seq = b"GCTGCTGCTGCT";
        let fs = score_pair(seq, seq, None).unwrap();
        assert_eq!(fs.frame, 0);
        assert_eq!(fs.score, 8);
        assert_eq!(fs.identity, 4);
    }

    #[test]
    fn test_reverse_frame_wins() {
        // frame 1 agrees on two residues, frame 3 on all three
        let s1 = b"TTTTTTTTT"; // rc AAA AAA AAA: K K K
        let s2 = b"CTTCTTCTT"; // rc AAG AAG AAG: K K K
        let fs = score_pair(s1, s2, None).unwrap();
        assert_eq!(fs.frame, 3);
        assert!(fs.is_reverse());
        assert_eq!(fs.score, 6);
        assert_eq!(fs.identity, 3);

        let (p1, p2) = frame_peptides(s1, s2, fs.frame);
        assert_eq!(p1, b"KKK".to_vec());
        assert_eq!(p2, b"KKK".to_vec());
    }

    #[test]
    fn test_length_mismatch_truncates() {
        let fs = score_pair(b"ATGGCCAAA", b"ATGGCC", None).unwrap();
        assert_eq!(fs.frame, 0);
        assert_eq!(fs.identity, 2);
        assert_eq!(fs.score, 4);

        let (p1, p2) = frame_peptides(b"ATGGCCAAA", b"ATGGCC", 0);
        assert_eq!(p1, b"MA".to_vec());
        assert_eq!(p2, b"MA".to_vec());
    }

    #[test]
    fn test_with_matrix() {
        let text = "   M  A  S  K  *\nM 5 -1 -1 -1 -4\nA -1 4 1 -1 -4\nS -1 1 4 0 -4\nK -1 -1 0 5 -4\n* -4 -4 -4 -4 1\n";
        let tiny = SubMatrix::from_reader(Cursor::new(text)).unwrap();
        let res = score_pair(b"ATGGCC", b"ATGTCC", Some(&tiny));
        assert_eq!(res, Err(HspError::MissingResidue('W', 'C')));

        let blosum = SubMatrix::from_name("blosum62").unwrap();
        let fs = score_pair(b"ATGGCC", b"ATGTCC", Some(&blosum)).unwrap();
        // frame 0: M/M 5 + A/S 1 = 6, frame 3: G/G 6 + H/H 8 = 14
        assert_eq!(fs.score, 14);
        assert_eq!(fs.identity, 2);
        assert_eq!(fs.frame, 3);
    }
}
