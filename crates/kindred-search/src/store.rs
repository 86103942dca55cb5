//! Vector store: named collections of embedding records.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use kindred_core::{EmbeddingRecord, Error, Result};

/// Storage backend for embedding collections.
///
/// [`InMemoryStore`] is the only implementation in this crate; a remote
/// index would implement the same trait.
pub trait VectorBackend: fmt::Debug {
    /// Insert or replace records by id.
    ///
    /// The batch is validated as a whole before anything is written: a
    /// vector whose length differs from the collection's dimensionality
    /// fails with [`Error::DimensionMismatch`] and leaves the collection
    /// untouched.
    fn upsert(&mut self, collection: &str, records: Vec<EmbeddingRecord>) -> Result<()>;

    /// Look up a record by id. `None` is an ordinary outcome.
    fn get(&self, collection: &str, id: &str) -> Option<EmbeddingRecord>;

    /// Owned copy of every record in insertion order.
    fn all(&self, collection: &str) -> Vec<EmbeddingRecord>;

    fn collection_names(&self) -> BTreeSet<String>;

    /// Number of records in a collection (0 if it does not exist).
    fn len(&self, collection: &str) -> usize;

    /// Dimensionality established by the collection's first record.
    fn dimension(&self, collection: &str) -> Option<usize>;

    /// Visit every record with its insertion position, without copying.
    fn scan<'a>(&'a self, collection: &str, visit: &mut dyn FnMut(usize, &'a EmbeddingRecord));
}

/// A named partition of the store.
///
/// `index` maps each id to its slot in `records`; both are only ever
/// written together in [`Collection::apply`].
#[derive(Debug, Clone, Default)]
pub struct Collection {
    name: String,
    dimension: Option<usize>,
    index: HashMap<String, usize>,
    records: Vec<EmbeddingRecord>,
}

impl Collection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EmbeddingRecord> {
        self.index.get(id).map(|&slot| &self.records[slot])
    }

    /// Records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }

    /// Check a batch against the established dimensionality (or the first
    /// record's, for an empty collection). Returns the dimensionality the
    /// collection will have after the batch is applied.
    fn validate(&self, records: &[EmbeddingRecord]) -> Result<Option<usize>> {
        let expected = self
            .dimension
            .or_else(|| records.first().map(EmbeddingRecord::dimension));

        if let Some(expected) = expected {
            if expected == 0 {
                return Err(Error::InvalidData(format!(
                    "empty vector for {} in collection {}",
                    records.first().map_or("<unknown>", |r| r.id.as_str()),
                    self.name
                )));
            }

            if let Some(bad) = records.iter().find(|r| r.dimension() != expected) {
                return Err(Error::DimensionMismatch {
                    collection: self.name.clone(),
                    id: bad.id.clone(),
                    expected,
                    actual: bad.dimension(),
                });
            }
        }

        Ok(expected)
    }

    fn apply(&mut self, records: Vec<EmbeddingRecord>, dimension: Option<usize>) {
        self.dimension = dimension;
        for record in records {
            if let Some(&slot) = self.index.get(&record.id) {
                self.records[slot] = record;
            } else {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Validate then apply a batch of records.
    pub fn upsert(&mut self, records: Vec<EmbeddingRecord>) -> Result<()> {
        let dimension = self.validate(&records)?;
        self.apply(records, dimension);
        Ok(())
    }
}

/// In-memory store holding one [`Collection`] per name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    collections: BTreeMap<String, Collection>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given collections established empty.
    #[must_use]
    pub fn with_collections<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let collections = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                (name.clone(), Collection::new(name))
            })
            .collect();
        Self { collections }
    }

    #[must_use]
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }
}

impl VectorBackend for InMemoryStore {
    fn upsert(&mut self, collection: &str, records: Vec<EmbeddingRecord>) -> Result<()> {
        let count = records.len();

        if let Some(existing) = self.collections.get_mut(collection) {
            existing.upsert(records)?;
        } else {
            // Only register a new collection once its first batch is valid.
            let mut created = Collection::new(collection);
            created.upsert(records)?;
            self.collections.insert(collection.to_string(), created);
        }

        log::debug!("Upserted {} records into {}", count, collection);
        Ok(())
    }

    fn get(&self, collection: &str, id: &str) -> Option<EmbeddingRecord> {
        self.collections
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned()
    }

    fn all(&self, collection: &str) -> Vec<EmbeddingRecord> {
        self.collections
            .get(collection)
            .map(|c| c.records().to_vec())
            .unwrap_or_default()
    }

    fn collection_names(&self) -> BTreeSet<String> {
        self.collections.keys().cloned().collect()
    }

    fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, Collection::len)
    }

    fn dimension(&self, collection: &str) -> Option<usize> {
        self.collections.get(collection).and_then(Collection::dimension)
    }

    fn scan<'a>(&'a self, collection: &str, visit: &mut dyn FnMut(usize, &'a EmbeddingRecord)) {
        if let Some(c) = self.collections.get(collection) {
            for (position, record) in c.records().iter().enumerate() {
                visit(position, record);
            }
        }
    }
}
