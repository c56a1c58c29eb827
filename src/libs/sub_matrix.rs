use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};

use crate::libs::error::HspError;

const BLOSUM62: &str = r###"# BLOSUM62, NCBI layout
   A  R  N  D  C  Q  E  G  H  I  L  K  M  F  P  S  T  W  Y  V  B  Z  X  *
A  4 -1 -2 -2  0 -1 -1  0 -2 -1 -1 -1 -1 -2 -1  1  0 -3 -2  0 -2 -1  0 -4
R -1  5  0 -2 -3  1  0 -2  0 -3 -2  2 -1 -3 -2 -1 -1 -3 -2 -3 -1  0 -1 -4
N -2  0  6  1 -3  0  0  0  1 -3 -3  0 -2 -3 -2  1  0 -4 -2 -3  3  0 -1 -4
D -2 -2  1  6 -3  0  2 -1 -1 -3 -4 -1 -3 -3 -1  0 -1 -4 -3 -3  4  1 -1 -4
C  0 -3 -3 -3  9 -3 -4 -3 -3 -1 -1 -3 -1 -2 -3 -1 -1 -2 -2 -1 -3 -3 -2 -4
Q -1  1  0  0 -3  5  2 -2  0 -3 -2  1  0 -3 -1  0 -1 -2 -1 -2  0  3 -1 -4
E -1  0  0  2 -4  2  5 -2  0 -3 -3  1 -2 -3 -1  0 -1 -3 -2 -2  1  4 -1 -4
G  0 -2  0 -1 -3 -2 -2  6 -2 -4 -4 -2 -3 -3 -2  0 -2 -2 -3 -3 -1 -2 -1 -4
H -2  0  1 -1 -3  0  0 -2  8 -3 -3 -1 -2 -1 -2 -1 -2 -2  2 -3  0  0 -1 -4
I -1 -3 -3 -3 -1 -3 -3 -4 -3  4  2 -3  1  0 -3 -2 -1 -3 -1  3 -3 -3 -1 -4
L -1 -2 -3 -4 -1 -2 -3 -4 -3  2  4 -2  2  0 -3 -2 -1 -2 -1  1 -4 -3 -1 -4
K -1  2  0 -1 -3  1  1 -2 -1 -3 -2  5 -1 -3 -1  0 -1 -3 -2 -2  0  1 -1 -4
M -1 -1 -2 -3 -1  0 -2 -3 -2  1  2 -1  5  0 -2 -1 -1 -1 -1  1 -3 -1 -1 -4
F -2 -3 -3 -3 -2 -3 -3 -3 -1  0  0 -3  0  6 -4 -2 -2  1  3 -1 -3 -3 -1 -4
P -1 -2 -2 -1 -3 -1 -1 -2 -2 -3 -3 -1 -2 -4  7 -1 -1 -4 -3 -2 -2 -1 -2 -4
S  1 -1  1  0 -1  0  0  0 -1 -2 -2  0 -1 -2 -1  4  1 -3 -2 -2  0  0  0 -4
T  0 -1  0 -1 -1 -1 -1 -2 -2 -1 -1 -1 -1 -2 -1  1  5 -2 -2  0 -1 -1  0 -4
W -3 -3 -4 -4 -2 -2 -3 -2 -2 -3 -2 -3 -1  1 -4 -3 -2 11  2 -3 -4 -3 -2 -4
Y -2 -2 -2 -3 -2 -1 -2 -3  2 -1 -1 -2 -1  3 -3 -2 -2  2  7 -1 -3 -2 -1 -4
V  0 -3 -3 -3 -1 -2 -2 -3 -3  3  1 -2  1 -1 -2 -2  0 -3 -1  4 -3 -2 -1 -4
B -2 -1  3  4 -3  0  1 -1  0 -3 -4  0 -3 -3 -2  0 -1 -4 -3 -3  4  1 -1 -4
Z -1  0  0  1 -3  3  4 -2  0 -3 -3  1 -1 -3 -1  0 -1 -3 -2 -2  1  4 -1 -4
X  0 -1 -1 -1 -2 -1 -1 -1 -1 -1 -1 -1 -1 -1 -2  0  0 -2 -1 -1 -1 -1 -1 -4
* -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4 -4  1
"###;

/// An amino-acid substitution matrix.
///
/// Scores live in a flat 256x256 table indexed by residue byte; `known` marks
/// the residues that appeared as keys. Lowercase residues share the uppercase
/// scores.
pub struct SubMatrix {
    matrix: Vec<i32>,
    known: [bool; 256],
    keys: Vec<u8>,
}

impl SubMatrix {
    /// Substitution score of two residues, `None` if either is not a key.
    pub fn get_score(&self, a1: u8, a2: u8) -> Option<i32> {
        if self.known[a1 as usize] && self.known[a2 as usize] {
            Some(self.matrix[(a1 as usize) * 256 + (a2 as usize)])
        } else {
            None
        }
    }

    /// Residue keys in column order
    pub fn keys(&self) -> &[u8] {
        &self.keys
    }

    /// Load from name (preset) or file.
    pub fn from_name(name: &str) -> Result<Self, HspError> {
        match name.to_lowercase().as_str() {
            "blosum62" => Self::from_reader(Cursor::new(BLOSUM62)),
            _ => Self::from_file(name),
        }
    }

    pub fn from_file(path: &str) -> Result<Self, HspError> {
        let file = File::open(path).map_err(|e| HspError::Matrix(format!("{}: {}", path, e)))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a BLAST-style matrix.
    ///
    /// Lines starting with '#' are comments. The first remaining line with an
    /// empty leading field holds the column keys; every following line is a
    /// row key and one integer per column. The table must be complete.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, HspError> {
        let mut matrix = vec![0; 256 * 256];
        let mut known = [false; 256];
        let mut keys: Vec<u8> = vec![];
        let mut rows_seen = [false; 256];

        for line in reader.lines() {
            let line = line.map_err(|e| HspError::Matrix(e.to_string()))?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();

            if keys.is_empty() {
                if !line.starts_with(char::is_whitespace) && !is_key_line(&parts) {
                    return Err(HspError::Matrix(format!("expected a header line, got: {}", line)));
                }
                keys = parse_keys(&parts)?;
                for &k in &keys {
                    known[k as usize] = true;
                    known[k.to_ascii_lowercase() as usize] = true;
                }
                continue;
            }

            let row = parse_key(parts[0])?;
            if !known[row as usize] {
                return Err(HspError::Matrix(format!("row key {} is not a column key", row as char)));
            }
            if parts.len() - 1 != keys.len() {
                return Err(HspError::Matrix(format!(
                    "row {} has {} scores, expected {}",
                    row as char,
                    parts.len() - 1,
                    keys.len()
                )));
            }

            for (&col, field) in keys.iter().zip(&parts[1..]) {
                let val: i32 = field
                    .parse()
                    .map_err(|_| HspError::Matrix(format!("invalid score {} in row {}", field, row as char)))?;

                let r_lower = row.to_ascii_lowercase();
                let c_lower = col.to_ascii_lowercase();
                for (r, c) in [(row, col), (r_lower, c_lower), (row, c_lower), (r_lower, col)] {
                    matrix[(r as usize) * 256 + (c as usize)] = val;
                }
            }
            rows_seen[row as usize] = true;
        }

        if keys.is_empty() {
            return Err(HspError::Matrix("no header line found".to_string()));
        }
        if let Some(&missing) = keys.iter().find(|&&k| !rows_seen[k as usize]) {
            return Err(HspError::Matrix(format!("missing row for {}", missing as char)));
        }

        Ok(SubMatrix { matrix, known, keys })
    }
}

fn is_key_line(parts: &[&str]) -> bool {
    parts
        .iter()
        .all(|s| s.len() == 1 && !s.as_bytes()[0].is_ascii_digit() && s.as_bytes()[0] != b'-')
}

fn parse_key(s: &str) -> Result<u8, HspError> {
    match s.as_bytes() {
        [b] => Ok(b.to_ascii_uppercase()),
        _ => Err(HspError::Matrix(format!("invalid residue key: {}", s))),
    }
}

fn parse_keys(parts: &[&str]) -> Result<Vec<u8>, HspError> {
    parts.iter().map(|s| parse_key(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blosum62_preset() {
        let m = SubMatrix::from_name("BLOSUM62").unwrap();
        assert_eq!(m.keys().len(), 24);
        assert_eq!(m.get_score(b'A', b'A'), Some(4));
        assert_eq!(m.get_score(b'W', b'W'), Some(11));
        assert_eq!(m.get_score(b'A', b'R'), Some(-1));
        assert_eq!(m.get_score(b'R', b'A'), Some(-1));
        assert_eq!(m.get_score(b'*', b'*'), Some(1));
        assert_eq!(m.get_score(b'w', b'W'), Some(11));
        assert_eq!(m.get_score(b'J', b'A'), None);
    }

    #[test]
    fn test_small_matrix() {
        let text = "# tiny\n   A  C\nA  5 -2\nC -2  7\n";
        let m = SubMatrix::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(m.keys(), b"AC");
        assert_eq!(m.get_score(b'C', b'C'), Some(7));
        assert_eq!(m.get_score(b'A', b'C'), Some(-2));
        assert_eq!(m.get_score(b'A', b'G'), None);
    }

    #[test]
    fn test_malformed_matrix() {
        let missing_row = "   A  C\nA  5 -2\n";
        let err = SubMatrix::from_reader(Cursor::new(missing_row)).err().unwrap();
        assert_eq!(err, HspError::Matrix("missing row for C".to_string()));

        let short_row = "   A  C\nA  5\nC -2  7\n";
        assert!(SubMatrix::from_reader(Cursor::new(short_row)).is_err());

        let bad_score = "   A  C\nA  5 x\nC -2  7\n";
        assert!(SubMatrix::from_reader(Cursor::new(bad_score)).is_err());

        assert!(SubMatrix::from_reader(Cursor::new("# only comments\n")).is_err());
        assert!(SubMatrix::from_name("tests/no_such.mat").is_err());
    }
}
