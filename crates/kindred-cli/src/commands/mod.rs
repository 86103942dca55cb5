pub mod clusters;
pub mod config;
pub mod list;
pub mod similar;

use anyhow::{Context, Result};
use kindred_etl::{build_store, CatalogSources, Config};
use kindred_search::CatalogSnapshot;

/// Load, embed and index both catalogs named in `config`.
/// Each file is read once.
pub fn load_snapshot(config: &Config) -> Result<CatalogSnapshot> {
    let sources = CatalogSources::read(config).context("Failed to read catalog files")?;
    let catalogs = sources
        .embed(config.max_features)
        .context("Failed to build catalogs")?;
    let store = build_store(&catalogs).context("Failed to index catalogs")?;
    let snapshot = CatalogSnapshot::new(store, sources.fingerprint());
    log::debug!("Catalog snapshot {} built at {}", snapshot.fingerprint(), snapshot.built_at());
    Ok(snapshot)
}
