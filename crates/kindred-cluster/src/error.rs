use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("cannot cluster an empty set of vectors")]
    EmptyInput,

    #[error("number of clusters must be at least 1, got {0}")]
    InvalidK(usize),

    #[error("vector {index} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{labels} labels given for {vectors} vectors")]
    LabelMismatch { vectors: usize, labels: usize },

    /// Choosing k needs at least three points (k ranges over 2..n).
    #[error("need at least 3 vectors to choose a cluster count, got {0}")]
    TooFewPoints(usize),
}

pub type Result<T> = std::result::Result<T, ClusterError>;

/// Check every vector has the first vector's length.
pub(crate) fn check_dimensions(vectors: &[Vec<f32>]) -> Result<usize> {
    let expected = vectors.first().ok_or(ClusterError::EmptyInput)?.len();
    match vectors.iter().position(|v| v.len() != expected) {
        Some(index) => Err(ClusterError::DimensionMismatch {
            index,
            expected,
            actual: vectors[index].len(),
        }),
        None => Ok(expected),
    }
}
