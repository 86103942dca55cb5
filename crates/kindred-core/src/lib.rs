//! Core domain model for kindred.
//!
//! This crate defines the embedding record that flows from the embedding
//! builders into the vector store, the opaque metadata carried alongside
//! each vector, the content domains (one collection per domain), and the
//! error taxonomy shared by the store and the search engine.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::{ContentDomain, EmbeddingRecord, Metadata, MetadataValue};
