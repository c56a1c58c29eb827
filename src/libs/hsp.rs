use std::fmt;

/// Minimum alignment span accepted by default
pub const DEFAULT_MIN_LEN: usize = 15;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

/// `-` is reverse, anything else forward
impl From<&str> for Strand {
    fn from(s: &str) -> Self {
        if s.trim() == "-" {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }
}

impl Strand {
    pub fn flip(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

/// One side of a hit, taken from a region spec like `S288c.I(+):1001-2000`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    pub species: String,
    pub chr: String,
    /// 0-based start of the region on the chromosome
    pub offset: usize,
}

impl Region {
    pub fn from_spec(spec: &str) -> Option<Self> {
        let rg = intspan::Range::from_str(spec);
        if rg.chr().is_empty() {
            return None;
        }
        let start = *rg.start();
        let offset = if start > 0 { start as usize - 1 } else { 0 };

        Some(Region {
            species: rg.name().to_string(),
            chr: rg.chr().to_string(),
            offset,
        })
    }

    /// 1-based local position to 0-based absolute position
    pub fn absolute(&self, local: usize) -> usize {
        self.offset + local.saturating_sub(1)
    }
}

/// A parsed aligner line.
///
/// Local coordinates are 1-based and inclusive within their region.
#[derive(Debug, Clone, Default)]
pub struct HspRecord {
    pub query: Region,
    pub program: String,
    pub feature: String,
    pub q_local_start: usize,
    pub q_local_end: usize,
    pub target: Region,
    pub t_local_start: usize,
    pub t_local_end: usize,
    pub aligner_score: String,
    pub pvalue: String,
    pub q_strand: Option<Strand>,
    pub t_strand: Option<Strand>,
    pub identity: String,
    pub positive: String,
    pub cigar: String,
}

impl HspRecord {
    /// Parse a tab-separated aligner line.
    ///
    /// Returns `None` for lines that should be skipped: fewer than 10 fields,
    /// unparsable coordinates, an unusable region spec, reversed local
    /// coordinates, or a query span shorter than `min_len`.
    ///
    /// ```
    /// use hspsyn::libs::hsp::{HspRecord, Strand};
    /// let line = "S288c.I:1001-2000\ttblastx\tHSP\t1\t30\tRM11.I:501-1500\t11\t40\t55\t1e-5\t+\t-";
    /// let rec = HspRecord::parse(line, 15).unwrap();
    /// assert_eq!(rec.query.species, "S288c");
    /// assert_eq!(rec.query_range(), (1000, 1029));
    /// assert_eq!(rec.target_range(), (510, 539));
    /// assert_eq!(rec.target_strand(), Strand::Reverse);
    ///
    /// let short = "I\ttblastx\tHSP\t1\t10\tI\t1\t10\t55\t1e-5";
    /// assert!(HspRecord::parse(short, 15).is_none());
    /// ```
    pub fn parse(line: &str, min_len: usize) -> Option<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 10 {
            return None;
        }

        let q_local_start: usize = fields[3].trim().parse().ok()?;
        let q_local_end: usize = fields[4].trim().parse().ok()?;
        let t_local_start: usize = fields[6].trim().parse().ok()?;
        let t_local_end: usize = fields[7].trim().parse().ok()?;

        if q_local_start > q_local_end || t_local_start > t_local_end {
            return None;
        }
        if q_local_end - q_local_start < min_len {
            return None;
        }

        let query = Region::from_spec(fields[0].trim())?;
        let target = Region::from_spec(fields[5].trim())?;

        let field = |i: usize| fields.get(i).map(|s| s.trim().to_string()).unwrap_or_default();
        let strand = |i: usize| fields.get(i).map(|s| Strand::from(*s));

        Some(HspRecord {
            query,
            program: field(1),
            feature: field(2),
            q_local_start,
            q_local_end,
            target,
            t_local_start,
            t_local_end,
            aligner_score: field(8),
            pvalue: field(9),
            q_strand: strand(10),
            t_strand: strand(11),
            identity: field(12),
            positive: field(13),
            cigar: field(14),
        })
    }

    /// Absolute 0-based inclusive query range
    pub fn query_range(&self) -> (usize, usize) {
        (
            self.query.absolute(self.q_local_start),
            self.query.absolute(self.q_local_end),
        )
    }

    /// Absolute 0-based inclusive target range
    pub fn target_range(&self) -> (usize, usize) {
        (
            self.target.absolute(self.t_local_start),
            self.target.absolute(self.t_local_end),
        )
    }

    pub fn query_strand(&self) -> Strand {
        self.q_strand.unwrap_or(Strand::Forward)
    }

    pub fn target_strand(&self) -> Strand {
        self.t_strand.unwrap_or(Strand::Forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand() {
        assert_eq!(Strand::from("-"), Strand::Reverse);
        assert_eq!(Strand::from("+"), Strand::Forward);
        assert_eq!(Strand::from(""), Strand::Forward);
        assert_eq!(Strand::Forward.flip(), Strand::Reverse);
        assert_eq!(format!("{}{}", Strand::Forward, Strand::Reverse), "+-");
    }

    #[test]
    fn test_region_without_range() {
        let rg = Region::from_spec("chr1").unwrap();
        assert_eq!(rg.chr, "chr1");
        assert_eq!(rg.offset, 0);
        assert_eq!(rg.absolute(1), 0);
        assert_eq!(rg.absolute(100), 99);
    }

    #[test]
    fn test_full_record() {
        let line = "Sc.II:101-400\tblastz\tsyn\t5\t34\tSp.IV:1-300\t15\t44\t120\t0.001\t-\t+\t90\t95\t30M";
        let rec = HspRecord::parse(line, 15).unwrap();
        assert_eq!(rec.program, "blastz");
        assert_eq!(rec.feature, "syn");
        assert_eq!(rec.query.chr, "II");
        assert_eq!(rec.target.species, "Sp");
        assert_eq!(rec.query_range(), (104, 133));
        assert_eq!(rec.target_range(), (14, 43));
        assert_eq!(rec.query_strand(), Strand::Reverse);
        assert_eq!(rec.target_strand(), Strand::Forward);
        assert_eq!(rec.aligner_score, "120");
        assert_eq!(rec.positive, "95");
        assert_eq!(rec.cigar, "30M");
    }

    #[test]
    fn test_skipped_lines() {
        // too few fields
        assert!(HspRecord::parse("I\tp\tf\t1\t30\tI\t1\t30\t5", 15).is_none());
        // non numeric coordinate
        assert!(HspRecord::parse("I\tp\tf\tx\t30\tI\t1\t30\t5\t0", 15).is_none());
        // span of 14
        assert!(HspRecord::parse("I\tp\tf\t1\t15\tI\t1\t15\t5\t0", 15).is_none());
        // span of 15 passes
        assert!(HspRecord::parse("I\tp\tf\t1\t16\tI\t1\t16\t5\t0", 15).is_some());
        // reversed
        assert!(HspRecord::parse("I\tp\tf\t40\t1\tI\t1\t40\t5\t0", 15).is_none());
    }
}
