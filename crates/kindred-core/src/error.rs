use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A vector's length disagrees with the dimensionality established by
    /// the first record inserted into the collection.
    #[error("dimension mismatch in collection {collection} for {id}: expected {expected}, got {actual}")]
    DimensionMismatch {
        collection: String,
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("not found: {id} in collection {collection}")]
    NotFound { collection: String, id: String },

    #[error("top_k must be at least 1, got {0}")]
    InvalidTopK(usize),

    #[error("unknown content domain: {0}")]
    UnknownDomain(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Returns `true` when the error means "no such item" and callers should
    /// present an empty result rather than fail.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
