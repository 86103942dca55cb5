//! Collection selection for the presentation layer.
//!
//! Callers pick a catalog by name (or [`ContentDomain`]) and an item id;
//! a missing item or collection yields an empty result instead of an
//! error so the caller can show "no similar items found".

use kindred_core::{ContentDomain, Result};

use crate::engine::{ScoredRecord, SearchEngine};
use crate::store::VectorBackend;

/// Items similar to `id` in the named collection, query item first.
///
/// Unknown ids and collections produce an empty list. Other errors, such
/// as a zero `top_k`, are returned.
pub fn find_similar<B: VectorBackend>(
    engine: &SearchEngine<B>,
    collection: &str,
    id: &str,
    top_k: usize,
) -> Result<Vec<ScoredRecord>> {
    match engine.query_by_id(collection, id, top_k) {
        Ok(results) => Ok(results),
        Err(e) if e.is_not_found() => {
            log::debug!("No similar items: {}", e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// [`find_similar`] keyed by content domain.
pub fn find_similar_in<B: VectorBackend>(
    engine: &SearchEngine<B>,
    domain: ContentDomain,
    id: &str,
    top_k: usize,
) -> Result<Vec<ScoredRecord>> {
    find_similar(engine, domain.collection(), id, top_k)
}

/// The neighbours in a [`find_similar`] result: everything after the
/// query item at index 0.
pub fn neighbours(results: &[ScoredRecord]) -> &[ScoredRecord] {
    results.get(1..).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use kindred_core::EmbeddingRecord;

    fn engine() -> SearchEngine {
        let mut engine = SearchEngine::new(InMemoryStore::with_collections(
            ContentDomain::ALL.map(ContentDomain::collection),
        ));
        engine
            .upsert(
                "spotify",
                vec![
                    EmbeddingRecord::new("spotify_0", vec![0.8, 0.1, 0.3]),
                    EmbeddingRecord::new("spotify_1", vec![0.7, 0.2, 0.3]),
                    EmbeddingRecord::new("spotify_2", vec![-0.5, 0.9, 0.0]),
                ],
            )
            .unwrap();
        engine
    }

    #[test]
    fn test_find_similar_by_name() {
        let engine = engine();
        let results = find_similar(&engine, "spotify", "spotify_0", 6).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].record.id, "spotify_0");
        assert_eq!(neighbours(&results)[0].record.id, "spotify_1");
    }

    #[test]
    fn test_find_similar_by_domain() {
        let engine = engine();
        let results = find_similar_in(&engine, ContentDomain::Tracks, "spotify_2", 2).unwrap();
        assert_eq!(results[0].record.id, "spotify_2");
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_missing_item_is_empty() {
        let engine = engine();
        assert!(find_similar(&engine, "spotify", "spotify_99", 6).unwrap().is_empty());
        assert!(find_similar_in(&engine, ContentDomain::Titles, "netflix_0", 6)
            .unwrap()
            .is_empty());
        assert!(find_similar(&engine, "podcasts", "x", 6).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_top_k_still_errors() {
        let engine = engine();
        assert!(find_similar(&engine, "spotify", "spotify_0", 0).is_err());
    }

    #[test]
    fn test_neighbours_of_empty() {
        assert!(neighbours(&[]).is_empty());
    }
}
