//! Frozen, fingerprinted catalogs.
//!
//! Building a store from raw catalog files is the expensive step, so the
//! result is kept as an immutable [`CatalogSnapshot`]. A [`SnapshotCache`]
//! hands out the same snapshot for as long as the dataset fingerprint is
//! unchanged, and rebuilds when it changes or after [`SnapshotCache::invalidate`].

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::engine::SearchEngine;
use crate::store::InMemoryStore;

/// SHA-256 digest identifying the raw input a snapshot was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetFingerprint([u8; 32]);

impl DatasetFingerprint {
    /// Fingerprint a sequence of raw sources (e.g. CSV file contents).
    ///
    /// Each source is length-prefixed, so moving bytes from one source to
    /// the next changes the fingerprint.
    pub fn of_sources<'a, I>(sources: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut hasher = Sha256::new();
        for source in sources {
            hasher.update((source.len() as u64).to_le_bytes());
            hasher.update(source);
        }
        let mut digest = [0_u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        Self(digest)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for DatasetFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A populated search engine frozen at build time.
#[derive(Debug)]
pub struct CatalogSnapshot {
    engine: SearchEngine<InMemoryStore>,
    fingerprint: DatasetFingerprint,
    built_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    #[must_use]
    pub fn new(store: InMemoryStore, fingerprint: DatasetFingerprint) -> Self {
        Self {
            engine: SearchEngine::new(store),
            fingerprint,
            built_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn engine(&self) -> &SearchEngine<InMemoryStore> {
        &self.engine
    }

    #[must_use]
    pub const fn fingerprint(&self) -> DatasetFingerprint {
        self.fingerprint
    }

    #[must_use]
    pub const fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Holds at most one snapshot and decides whether to reuse or rebuild it.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    current: Option<Arc<CatalogSnapshot>>,
}

impl SnapshotCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached snapshot if it was built from `fingerprint`, otherwise a
    /// fresh one from `build`. A failed build leaves the cache empty.
    pub fn get_or_build<F, E>(
        &mut self,
        fingerprint: DatasetFingerprint,
        build: F,
    ) -> Result<Arc<CatalogSnapshot>, E>
    where
        F: FnOnce() -> Result<InMemoryStore, E>,
    {
        if let Some(snapshot) = &self.current {
            if snapshot.fingerprint() == fingerprint {
                log::debug!("Reusing catalog snapshot {}", fingerprint);
                return Ok(Arc::clone(snapshot));
            }
            log::info!("Dataset changed, rebuilding catalog snapshot");
        }

        self.current = None;
        let snapshot = Arc::new(CatalogSnapshot::new(build()?, fingerprint));
        log::info!("Built catalog snapshot {}", fingerprint);
        self.current = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    #[must_use]
    pub fn current(&self) -> Option<Arc<CatalogSnapshot>> {
        self.current.as_ref().map(Arc::clone)
    }

    /// Drop the cached snapshot so the next request rebuilds.
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}
