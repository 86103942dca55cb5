//! TF-IDF document vectors.
//!
//! Terms are counted raw, weighted by a smoothed inverse document
//! frequency `ln((1 + n) / (1 + df)) + 1`, and every row is L2-normalized.
//! The vocabulary keeps the `max_features` terms with the highest total
//! count across the corpus (ties broken alphabetically) and its columns
//! are laid out in alphabetical order.

use std::collections::{BTreeMap, HashMap};

use crate::text::{is_stop_word, tokenize};

#[derive(Debug, Clone, PartialEq)]
pub struct TfidfVectorizer {
    max_features: usize,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    #[must_use]
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        }
    }

    fn terms(document: &str) -> impl Iterator<Item = String> + '_ {
        tokenize(document).filter(|t| !is_stop_word(t))
    }

    /// Learn the vocabulary and idf weights from a corpus.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> &mut Self {
        let mut total: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for document in documents {
            let mut seen: HashMap<String, usize> = HashMap::new();
            for term in Self::terms(document.as_ref()) {
                *seen.entry(term).or_default() += 1;
            }
            for (term, count) in seen {
                *total.entry(term.clone()).or_default() += count;
                *doc_freq.entry(term).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = total.into_iter().collect();
        ranked.sort_unstable_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
        ranked.truncate(self.max_features);

        let mut kept: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let n = documents.len() as f64;
        self.idf = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.vocabulary = kept
            .into_iter()
            .enumerate()
            .map(|(column, term)| (term, column))
            .collect();

        log::debug!(
            "TF-IDF vocabulary: {} terms from {} documents",
            self.vocabulary.len(),
            documents.len()
        );
        self
    }

    /// Weighted, L2-normalized vector for one document. Documents with no
    /// vocabulary terms map to the zero vector.
    #[must_use]
    pub fn transform(&self, document: &str) -> Vec<f32> {
        let mut row = vec![0.0_f64; self.vocabulary.len()];
        for term in Self::terms(document) {
            if let Some(&column) = self.vocabulary.get(&term) {
                row[column] += 1.0;
            }
        }
        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        row.into_iter()
            .map(|v| if norm > 0.0 { (v / norm) as f32 } else { 0.0 })
            .collect()
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Vec<Vec<f32>> {
        self.fit(documents);
        documents.iter().map(|d| self.transform(d.as_ref())).collect()
    }

    /// Terms in column order.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    #[must_use]
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(100)
    }
}
