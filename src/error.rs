use thiserror::Error;

/// Errors reported before any batch processing starts.
/// Once the triplet input has been validated the numeric pipeline is total
/// and no further errors are produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The three triplet slices disagree in length.
    #[error("triplet slices must be the same length (rows: {rows}, cols: {cols}, values: {values})")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        values: usize,
    },

    /// A triplet coordinate falls outside the declared matrix dimensions.
    #[error("triplet {index} at ({row}, {col}) is outside the {n_docs} x {n_terms} matrix")]
    TripletOutOfBounds {
        index: usize,
        row: usize,
        col: usize,
        n_docs: usize,
        n_terms: usize,
    },

    /// A batch size of zero would make no progress.
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
}
