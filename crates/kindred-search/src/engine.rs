//! Similarity search over a [`VectorBackend`].
//!
//! Every query is an exact brute-force scan: the query vector is compared
//! with every stored vector in the collection, the best `top_k` candidates
//! are selected, and only those are sorted and copied out.

use std::cmp::Ordering;

use kindred_core::{EmbeddingRecord, Error, Result};

use crate::similarity::cosine_similarity;
use crate::store::{InMemoryStore, VectorBackend};

/// A ranked search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: EmbeddingRecord,
    /// Cosine similarity with the query, in `[-1.0, 1.0]`.
    pub score: f32,
    /// Zero-based position in the result list.
    pub rank: usize,
}

impl ScoredRecord {
    /// Score formatted as a percentage, e.g. `"99.4%"`.
    #[must_use]
    pub fn score_percent(&self) -> String {
        format!("{:.1}%", self.score * 100.0)
    }
}

/// Options for [`SearchEngine::query_by_id_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub top_k: usize,
    /// Keep the query item as the first result (score 1.0). Callers that
    /// want neighbours only either clear this or skip index 0.
    pub include_self: bool,
}

impl QueryOptions {
    #[must_use]
    pub const fn new(top_k: usize) -> Self {
        Self {
            top_k,
            include_self: true,
        }
    }

    #[must_use]
    pub const fn excluding_self(mut self) -> Self {
        self.include_self = false;
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::new(6)
    }
}

struct Candidate<'a> {
    position: usize,
    score: f32,
    exact: bool,
    record: &'a EmbeddingRecord,
}

/// Descending score, then exact vector matches, then insertion order.
/// Positions are unique, so this is a total order and unstable sorts
/// give deterministic results.
fn rank_order(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.exact.cmp(&a.exact))
        .then_with(|| a.position.cmp(&b.position))
}

/// Ranks a backend's collections against query vectors.
#[derive(Debug, Clone, Default)]
pub struct SearchEngine<B = InMemoryStore> {
    backend: B,
}

impl<B: VectorBackend> SearchEngine<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Insert or replace records in a collection. See [`VectorBackend::upsert`].
    pub fn upsert(&mut self, collection: &str, records: Vec<EmbeddingRecord>) -> Result<()> {
        self.backend.upsert(collection, records)
    }

    /// The `top_k` records most similar to `query`, best first.
    ///
    /// Returns fewer than `top_k` results when the collection is smaller,
    /// and an empty list when the collection is empty or unknown.
    pub fn query_by_vector(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>> {
        self.rank(collection, query, top_k, None)
    }

    /// The `top_k` records most similar to the stored record `id`.
    ///
    /// The query item itself is always the first result, with score 1.0.
    pub fn query_by_id(
        &self,
        collection: &str,
        id: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>> {
        self.query_by_id_with(collection, id, QueryOptions::new(top_k))
    }

    pub fn query_by_id_with(
        &self,
        collection: &str,
        id: &str,
        options: QueryOptions,
    ) -> Result<Vec<ScoredRecord>> {
        if options.top_k == 0 {
            return Err(Error::InvalidTopK(0));
        }

        let query = self
            .backend
            .get(collection, id)
            .ok_or_else(|| Error::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        if !options.include_self {
            return self.rank(collection, &query.vector, options.top_k, Some(id));
        }

        let mut results = if options.top_k > 1 {
            self.rank(collection, &query.vector, options.top_k - 1, Some(id))?
        } else {
            Vec::new()
        };
        results.insert(
            0,
            ScoredRecord {
                record: query,
                score: 1.0,
                rank: 0,
            },
        );
        for (rank, hit) in results.iter_mut().enumerate() {
            hit.rank = rank;
        }

        log::debug!(
            "query_by_id {}/{}: {} results",
            collection,
            id,
            results.len()
        );
        Ok(results)
    }

    fn rank(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
        skip_id: Option<&str>,
    ) -> Result<Vec<ScoredRecord>> {
        if top_k == 0 {
            return Err(Error::InvalidTopK(0));
        }

        if let Some(expected) = self.backend.dimension(collection) {
            if query.len() != expected {
                return Err(Error::DimensionMismatch {
                    collection: collection.to_string(),
                    id: "<query>".to_string(),
                    expected,
                    actual: query.len(),
                });
            }
        }

        let mut candidates = Vec::with_capacity(self.backend.len(collection));
        self.backend.scan(collection, &mut |position, record| {
            if skip_id == Some(record.id.as_str()) {
                return;
            }
            candidates.push(Candidate {
                position,
                score: cosine_similarity(query, &record.vector),
                exact: record.vector.as_slice() == query,
                record,
            });
        });

        if candidates.len() > top_k {
            candidates.select_nth_unstable_by(top_k - 1, rank_order);
            candidates.truncate(top_k);
        }
        candidates.sort_unstable_by(rank_order);

        Ok(candidates
            .into_iter()
            .enumerate()
            .map(|(rank, c)| ScoredRecord {
                record: c.record.clone(),
                score: c.score,
                rank,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_engine() -> SearchEngine {
        let mut engine = SearchEngine::new(InMemoryStore::new());
        engine
            .upsert(
                "demo",
                vec![
                    EmbeddingRecord::new("a", vec![1.0, 0.0]),
                    EmbeddingRecord::new("b", vec![0.0, 1.0]),
                    EmbeddingRecord::new("c", vec![0.9, 0.1]),
                ],
            )
            .unwrap();
        engine
    }

    fn ids(results: &[ScoredRecord]) -> Vec<&str> {
        results.iter().map(|r| r.record.id.as_str()).collect()
    }

    #[test]
    fn test_demo_query_by_id() {
        let engine = demo_engine();
        let results = engine.query_by_id("demo", "a", 3).unwrap();

        assert_eq!(ids(&results), vec!["a", "c", "b"]);
        assert_eq!(results[0].score, 1.0);
        assert!((results[1].score - 0.994).abs() < 1e-3);
        assert_eq!(results[2].score, 0.0);
        let ranks: Vec<_> = results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn test_zero_vector_query() {
        let mut engine = demo_engine();
        engine
            .upsert("demo", vec![EmbeddingRecord::new("z", vec![0.0, 0.0])])
            .unwrap();

        let results = engine.query_by_vector("demo", &[0.0, 0.0], 1).unwrap();
        assert_eq!(ids(&results), vec!["z"]);
        assert_eq!(results[0].score, 0.0);
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let engine = demo_engine();
        for v in [[1.0, 0.0], [0.0, 1.0], [0.9, 0.1]] {
            let results = engine.query_by_vector("demo", &v, 1).unwrap();
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].record.vector, v.to_vec());
            assert_eq!(results[0].score, 1.0);
        }
    }

    #[test]
    fn test_exact_match_beats_parallel_vector() {
        let mut engine = SearchEngine::new(InMemoryStore::new());
        engine
            .upsert(
                "demo",
                vec![
                    EmbeddingRecord::new("scaled", vec![2.0, 0.0]),
                    EmbeddingRecord::new("exact", vec![1.0, 0.0]),
                ],
            )
            .unwrap();
        let results = engine.query_by_vector("demo", &[1.0, 0.0], 2).unwrap();
        assert_eq!(ids(&results), vec!["exact", "scaled"]);
    }

    #[test]
    fn test_scores_non_increasing() {
        let mut engine = SearchEngine::new(InMemoryStore::new());
        let records = (0..50)
            .map(|i| {
                let t = i as f32 * 0.37;
                EmbeddingRecord::new(format!("r{i}"), vec![t.sin(), t.cos(), (t * 0.5).sin()])
            })
            .collect();
        engine.upsert("wave", records).unwrap();

        let results = engine.query_by_vector("wave", &[0.2, 0.9, -0.1], 20).unwrap();
        assert_eq!(results.len(), 20);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_top_k_matches_full_sort() {
        let mut engine = SearchEngine::new(InMemoryStore::new());
        let records = (0..30)
            .map(|i| EmbeddingRecord::new(format!("r{i}"), vec![i as f32, (30 - i) as f32]))
            .collect();
        engine.upsert("line", records).unwrap();

        let full = engine.query_by_vector("line", &[1.0, 1.0], 30).unwrap();
        let top = engine.query_by_vector("line", &[1.0, 1.0], 5).unwrap();
        assert_eq!(ids(&top), ids(&full[..5]));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut engine = SearchEngine::new(InMemoryStore::new());
        engine
            .upsert(
                "ties",
                vec![
                    EmbeddingRecord::new("first", vec![0.0, 1.0]),
                    EmbeddingRecord::new("second", vec![0.0, 2.0]),
                    EmbeddingRecord::new("third", vec![0.0, 3.0]),
                ],
            )
            .unwrap();

        let results = engine.query_by_vector("ties", &[1.0, 0.0], 3).unwrap();
        assert_eq!(ids(&results), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_fewer_items_than_top_k() {
        let engine = demo_engine();
        let results = engine.query_by_vector("demo", &[1.0, 1.0], 10).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_empty_and_unknown_collections() {
        let mut engine = SearchEngine::new(InMemoryStore::with_collections(["empty"]));
        assert!(engine.query_by_vector("empty", &[1.0], 5).unwrap().is_empty());
        assert!(engine.query_by_vector("missing", &[1.0], 5).unwrap().is_empty());

        engine.upsert("empty", Vec::new()).unwrap();
        assert!(engine.query_by_vector("empty", &[1.0, 2.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let engine = demo_engine();
        assert!(matches!(
            engine.query_by_vector("demo", &[1.0, 0.0], 0),
            Err(Error::InvalidTopK(0))
        ));
        assert!(matches!(
            engine.query_by_id("demo", "a", 0),
            Err(Error::InvalidTopK(0))
        ));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let engine = demo_engine();
        let result = engine.query_by_vector("demo", &[1.0, 0.0, 0.0], 3);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_query_by_id_not_found() {
        let engine = demo_engine();
        let err = engine.query_by_id("demo", "nope", 3).unwrap_err();
        assert!(err.is_not_found());

        let err = engine.query_by_id("missing", "a", 3).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_query_by_id_top_one_is_self() {
        let engine = demo_engine();
        let results = engine.query_by_id("demo", "c", 1).unwrap();
        assert_eq!(ids(&results), vec!["c"]);
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_self_first_even_with_duplicate_vector() {
        let mut engine = demo_engine();
        engine
            .upsert("demo", vec![EmbeddingRecord::new("a2", vec![1.0, 0.0])])
            .unwrap();

        let results = engine.query_by_id("demo", "a2", 2).unwrap();
        assert_eq!(ids(&results), vec!["a2", "a"]);
        assert_eq!(results[1].score, 1.0);
    }

    #[test]
    fn test_self_first_for_zero_vector() {
        let mut engine = demo_engine();
        engine
            .upsert("demo", vec![EmbeddingRecord::new("z", vec![0.0, 0.0])])
            .unwrap();

        let results = engine.query_by_id("demo", "z", 4).unwrap();
        assert_eq!(results[0].record.id, "z");
        assert_eq!(results[0].score, 1.0);
        assert!(results[1..].iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn test_exclude_self() {
        let engine = demo_engine();
        let options = QueryOptions::new(2).excluding_self();
        let results = engine.query_by_id_with("demo", "a", options).unwrap();
        assert_eq!(ids(&results), vec!["c", "b"]);
        assert_eq!(results[0].rank, 0);
    }

    #[test]
    fn test_score_percent() {
        let engine = demo_engine();
        let results = engine.query_by_id("demo", "a", 2).unwrap();
        assert_eq!(results[0].score_percent(), "100.0%");
        assert_eq!(results[1].score_percent(), "99.4%");
    }
}
