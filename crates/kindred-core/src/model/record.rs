use serde::{Deserialize, Serialize};

use crate::model::metadata::{Metadata, MetadataValue};

/// An item's embedding plus the metadata displayed alongside it.
///
/// `id` is the sole lookup key within a collection. The vector's length is
/// fixed per collection; the store rejects records that disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: String,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl EmbeddingRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// Euclidean norm of the vector.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.vector.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&MetadataValue> {
        self.metadata.get(name)
    }

    /// Human-readable label: `title`, then `track_name`, then the id.
    #[must_use]
    pub fn title(&self) -> &str {
        ["title", "track_name"]
            .iter()
            .find_map(|key| self.field(key).and_then(MetadataValue::as_str))
            .unwrap_or(&self.id)
    }
}
