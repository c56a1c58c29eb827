use thiserror::Error;

/// Errors raised by the HSP consolidation library.
///
/// All of them abort a run. Recoverable conditions (short lines, non-positive
/// scores) are counted in [`crate::libs::pipeline::Stats`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HspError {
    /// The sequence store cannot resolve a region
    #[error("Region not found: {chr}:{start}-{end}")]
    RegionNotFound {
        chr: String,
        start: usize,
        end: usize,
    },

    /// A sequence store failed while reading
    #[error("Sequence store: {0}")]
    Store(String),

    /// Unreadable or malformed substitution matrix
    #[error("Bad substitution matrix: {0}")]
    Matrix(String),

    /// A translated residue has no row/column in the matrix
    #[error("Substitution matrix has no score for {0}/{1}")]
    MissingResidue(char, char),

    /// Segments handed to the partitioner break the sort contract
    #[error("Segments are not sorted by chromosome pair: {0} comes after {1}")]
    Unsorted(String, String),
}
