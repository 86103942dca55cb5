//! Embedding builders for kindred.
//!
//! Loads the track and title catalogs from CSV, turns each row into a
//! fixed-dimension vector (standardized audio features for tracks, TF-IDF
//! for titles), and loads the results into a vector store. Also owns the
//! application configuration.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod scaler;
pub mod table;
pub mod text;
pub mod tfidf;
pub mod titles;
pub mod tracks;

pub use config::Config;
pub use error::{EtlError, EtlResult};
pub use pipeline::{build_store, fingerprint, load_catalogs, Catalog, CatalogSources, Catalogs};
pub use tfidf::TfidfVectorizer;
pub use titles::TitleEmbedder;
pub use tracks::TrackEmbedder;
