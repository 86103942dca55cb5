//! Catalog loading: raw files to embeddings to a populated store.

use std::path::Path;

use kindred_core::{ContentDomain, EmbeddingRecord};
use kindred_search::{DatasetFingerprint, InMemoryStore, VectorBackend};

use crate::config::Config;
use crate::error::{EtlError, EtlResult};
use crate::table::Table;
use crate::titles::TitleEmbedder;
use crate::tracks::TrackEmbedder;

/// The embeddings of one content domain.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub domain: ContentDomain,
    pub records: Vec<EmbeddingRecord>,
}

impl Catalog {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Both catalogs plus the fingerprint of the files they came from.
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub tracks: Catalog,
    pub titles: Catalog,
    pub fingerprint: DatasetFingerprint,
}

impl Catalogs {
    #[must_use]
    pub fn get(&self, domain: ContentDomain) -> &Catalog {
        match domain {
            ContentDomain::Tracks => &self.tracks,
            ContentDomain::Titles => &self.titles,
        }
    }
}

fn read(path: &Path) -> EtlResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| EtlError::io(path, e))
}

/// Raw catalog file contents, read once and fingerprinted.
#[derive(Debug, Clone)]
pub struct CatalogSources {
    tracks: Vec<u8>,
    titles: Vec<u8>,
    fingerprint: DatasetFingerprint,
}

impl CatalogSources {
    /// Read both catalog files named in `config`.
    pub fn read(config: &Config) -> EtlResult<Self> {
        log::info!(
            "Reading catalogs from {} and {}",
            config.tracks_path.display(),
            config.titles_path.display()
        );
        let tracks = read(&config.tracks_path)?;
        let titles = read(&config.titles_path)?;
        let fingerprint = DatasetFingerprint::of_sources([tracks.as_slice(), titles.as_slice()]);
        Ok(Self {
            tracks,
            titles,
            fingerprint,
        })
    }

    #[must_use]
    pub const fn fingerprint(&self) -> DatasetFingerprint {
        self.fingerprint
    }

    /// Parse and embed both catalogs.
    pub fn embed(&self, max_features: usize) -> EtlResult<Catalogs> {
        let tracks = TrackEmbedder::new().embed(&Table::from_bytes(&self.tracks)?)?;
        let titles = TitleEmbedder::new(max_features).embed(&Table::from_bytes(&self.titles)?)?;

        Ok(Catalogs {
            tracks: Catalog {
                domain: ContentDomain::Tracks,
                records: tracks,
            },
            titles: Catalog {
                domain: ContentDomain::Titles,
                records: titles,
            },
            fingerprint: self.fingerprint,
        })
    }
}

/// Fingerprint of the configured catalog files, without parsing them.
pub fn fingerprint(config: &Config) -> EtlResult<DatasetFingerprint> {
    CatalogSources::read(config).map(|sources| sources.fingerprint())
}

/// Read and embed both catalogs named in `config`.
pub fn load_catalogs(config: &Config) -> EtlResult<Catalogs> {
    CatalogSources::read(config)?.embed(config.max_features)
}

/// A fresh store holding both catalogs in their collections.
pub fn build_store(catalogs: &Catalogs) -> EtlResult<InMemoryStore> {
    let mut store = InMemoryStore::with_collections(ContentDomain::ALL.map(ContentDomain::collection));
    for catalog in [&catalogs.tracks, &catalogs.titles] {
        store.upsert(catalog.domain.collection(), catalog.records.clone())?;
        log::debug!("Indexed {} records into {}", catalog.len(), catalog.domain);
    }
    Ok(store)
}
