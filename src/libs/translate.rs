use lazy_static::lazy_static;
use std::collections::HashMap;

/// Standard genetic code, codons enumerated in TCAG order
const STANDARD_CODE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

const BASES: &[u8; 4] = b"TCAG";

lazy_static! {
    static ref CODON_TABLE: HashMap<[u8; 3], u8> = {
        let mut table = HashMap::with_capacity(64);
        for (i, &b1) in BASES.iter().enumerate() {
            for (j, &b2) in BASES.iter().enumerate() {
                for (k, &b3) in BASES.iter().enumerate() {
                    table.insert([b1, b2, b3], STANDARD_CODE[i * 16 + j * 4 + k]);
                }
            }
        }
        table
    };
}

/// Translate one codon. Lowercase (soft-masked) bases are accepted; anything
/// that is not ACGT gives `X`.
///
/// ```
/// use hspsyn::libs::translate::codon_to_aa;
/// assert_eq!(codon_to_aa(b"ATG"), b'M');
/// assert_eq!(codon_to_aa(b"taa"), b'*');
/// assert_eq!(codon_to_aa(b"ANG"), b'X');
/// ```
pub fn codon_to_aa(codon: &[u8]) -> u8 {
    if codon.len() != 3 {
        return b'X';
    }
    let key = [
        codon[0].to_ascii_uppercase(),
        codon[1].to_ascii_uppercase(),
        codon[2].to_ascii_uppercase(),
    ];
    *CODON_TABLE.get(&key).unwrap_or(&b'X')
}

/// Translate `seq` starting at codon offset `offset`. A trailing partial codon
/// is ignored.
pub fn translate(seq: &[u8], offset: usize) -> Vec<u8> {
    if offset >= seq.len() {
        return vec![];
    }
    seq[offset..]
        .chunks_exact(3)
        .map(codon_to_aa)
        .collect()
}

pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    bio::alphabets::dna::revcomp(seq)
}

/// All six reading frames of a sequence.
///
/// Index 0..3 are the forward frames at offsets 0, 1, 2; index 3..6 are the
/// frames of the reverse complement at the same offsets.
pub fn six_frames(seq: &[u8]) -> [Vec<u8>; 6] {
    let rc = revcomp(seq);
    [
        translate(seq, 0),
        translate(seq, 1),
        translate(seq, 2),
        translate(&rc, 0),
        translate(&rc, 1),
        translate(&rc, 2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codon_table() {
        assert_eq!(CODON_TABLE.len(), 64);
        assert_eq!(codon_to_aa(b"TTT"), b'F');
        assert_eq!(codon_to_aa(b"TGG"), b'W');
        assert_eq!(codon_to_aa(b"TGA"), b'*');
        assert_eq!(codon_to_aa(b"GGG"), b'G');
        assert_eq!(codon_to_aa(b"gcc"), b'A');
        assert_eq!(codon_to_aa(b"AT"), b'X');
    }

    #[test]
    fn test_translate_offsets() {
        let seq = b"ATGGCCTAAG";
        assert_eq!(translate(seq, 0), b"MA*".to_vec());
        assert_eq!(translate(seq, 1), b"WPK".to_vec());
        assert_eq!(translate(seq, 2), b"GL".to_vec());
        assert!(translate(seq, 10).is_empty());
    }

    #[test]
    fn test_six_frames() {
        // revcomp: CATGGCCAT
        let frames = six_frames(b"ATGGCCATG");
        assert_eq!(frames[0], b"MAM".to_vec());
        assert_eq!(frames[3], b"HGH".to_vec());
        assert_eq!(frames[4], b"MA".to_vec());
        assert_eq!(frames[5], b"WP".to_vec());
    }
}
