//! Vector search for kindred.
//!
//! Holds embedding records in named in-memory collections and answers
//! exact nearest-neighbour queries by brute-force cosine similarity.
//! Built catalogs are served from frozen snapshots that are rebuilt only
//! when the underlying dataset changes.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod dispatch;
pub mod engine;
pub mod similarity;
pub mod snapshot;
pub mod store;

pub use dispatch::{find_similar, find_similar_in, neighbours};
pub use engine::{QueryOptions, ScoredRecord, SearchEngine};
pub use similarity::cosine_similarity;
pub use snapshot::{CatalogSnapshot, DatasetFingerprint, SnapshotCache};
pub use store::{Collection, InMemoryStore, VectorBackend};
