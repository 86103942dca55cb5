//! Error types for the embedding builders.

use thiserror::Error;

/// Errors that can occur while turning catalog files into embeddings.
#[derive(Debug, Error)]
pub enum EtlError {
    /// A catalog file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The CSV parser rejected the input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A column the embedder needs is absent from the header row.
    #[error("missing column {column} in {catalog} catalog")]
    MissingColumn {
        catalog: &'static str,
        column: String,
    },

    /// A numeric feature could not be parsed.
    #[error("invalid number {value:?} in column {column} at row {row}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    /// Every row was dropped during cleaning.
    #[error("no usable rows in {0} catalog")]
    EmptyDataset(&'static str),

    /// The vector store rejected the embeddings.
    #[error("vector store error: {0}")]
    Search(#[from] kindred_core::Error),
}

impl EtlError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Convenience alias for embedding-builder results.
pub type EtlResult<T> = std::result::Result<T, EtlError>;
