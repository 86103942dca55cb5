pub mod domain;
pub mod metadata;
pub mod record;

pub use domain::ContentDomain;
pub use metadata::{Metadata, MetadataValue};
pub use record::EmbeddingRecord;
