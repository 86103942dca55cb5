//! Per-cluster summaries of catalog metadata.

use std::collections::{BTreeMap, HashMap};

use kindred_core::{ContentDomain, EmbeddingRecord, MetadataValue};

use crate::error::{ClusterError, Result};
use crate::kmeans::{ClusterModel, KMeans};
use crate::pca::project_2d;
use crate::quality::silhouette_score;

const SAMPLES: usize = 3;

/// What to summarize for a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterProfile {
    /// Categorical fields reported by their most common value. Values are
    /// split on commas when the field is listed in `multi_valued`.
    pub categorical: Vec<&'static str>,
    pub multi_valued: Vec<&'static str>,
    /// Numeric fields reported by their mean.
    pub numeric: Vec<&'static str>,
    /// Fields joined with `" - "` to label a sample item.
    pub label: Vec<&'static str>,
}

impl ClusterProfile {
    #[must_use]
    pub fn for_domain(domain: ContentDomain) -> Self {
        match domain {
            ContentDomain::Tracks => Self {
                categorical: vec!["genre"],
                multi_valued: Vec::new(),
                numeric: vec!["popularity", "danceability", "energy", "valence", "tempo"],
                label: vec!["track_name", "artists"],
            },
            ContentDomain::Titles => Self {
                categorical: vec!["type", "listed_in", "country"],
                multi_valued: vec!["listed_in"],
                numeric: vec!["release_year"],
                label: vec!["title"],
            },
        }
    }

    fn label_of(&self, record: &EmbeddingRecord) -> String {
        let parts: Vec<String> = self
            .label
            .iter()
            .filter_map(|field| record.field(field).map(ToString::to_string))
            .collect();
        if parts.is_empty() {
            record.id.clone()
        } else {
            parts.join(" - ")
        }
    }

    /// Summaries for every non-empty cluster in `0..k`.
    pub fn analyze(
        &self,
        records: &[EmbeddingRecord],
        labels: &[usize],
        k: usize,
    ) -> Result<Vec<ClusterSummary>> {
        if records.len() != labels.len() {
            return Err(ClusterError::LabelMismatch {
                vectors: records.len(),
                labels: labels.len(),
            });
        }

        let mut summaries = Vec::new();
        for cluster in 0..k {
            let members: Vec<&EmbeddingRecord> = records
                .iter()
                .zip(labels)
                .filter(|(_, &label)| label == cluster)
                .map(|(record, _)| record)
                .collect();
            if members.is_empty() {
                continue;
            }

            let most_common = self
                .categorical
                .iter()
                .filter_map(|&field| {
                    let split = self.multi_valued.contains(&field);
                    most_common_value(&members, field, split).map(|v| (field.to_string(), v))
                })
                .collect();
            let averages = self
                .numeric
                .iter()
                .filter_map(|&field| mean_of(&members, field).map(|m| (field.to_string(), m)))
                .collect();
            let samples = members
                .iter()
                .take(SAMPLES)
                .map(|record| self.label_of(record))
                .collect();

            summaries.push(ClusterSummary {
                cluster,
                size: members.len(),
                most_common,
                averages,
                samples,
            });
        }
        Ok(summaries)
    }
}

/// Most frequent text value of `field`, skipping `"Unknown"`. Ties go to
/// the alphabetically first value.
fn most_common_value(members: &[&EmbeddingRecord], field: &str, split: bool) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in members {
        let Some(value) = record.field(field).and_then(MetadataValue::as_str) else {
            continue;
        };
        let values: Vec<&str> = if split {
            value.split(',').map(str::trim).collect()
        } else {
            vec![value]
        };
        for v in values.into_iter().filter(|v| !v.is_empty() && *v != "Unknown") {
            *counts.entry(v).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
        .map(|(value, _)| value.to_string())
}

fn mean_of(members: &[&EmbeddingRecord], field: &str) -> Option<f64> {
    let values: Vec<f64> = members
        .iter()
        .filter_map(|r| r.field(field).and_then(MetadataValue::as_f64))
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Characteristics of one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub size: usize,
    /// Field name to its most common value within the cluster.
    pub most_common: BTreeMap<String, String>,
    /// Field name to its mean within the cluster.
    pub averages: BTreeMap<String, f64>,
    /// Labels of the first few members.
    pub samples: Vec<String>,
}

/// Everything `kindred clusters` reports for one catalog.
#[derive(Debug, Clone)]
pub struct ClusterReport {
    pub model: ClusterModel,
    pub silhouette: Option<f32>,
    /// 2-D PCA coordinates, one per record.
    pub projection: Vec<[f32; 2]>,
    pub summaries: Vec<ClusterSummary>,
}

/// Cluster a catalog's records and summarize the result.
pub fn cluster_catalog(
    domain: ContentDomain,
    records: &[EmbeddingRecord],
    kmeans: &KMeans,
) -> Result<ClusterReport> {
    let vectors: Vec<Vec<f32>> = records.iter().map(|r| r.vector.clone()).collect();
    let model = kmeans.fit(&vectors)?;
    let silhouette = silhouette_score(&vectors, &model.labels)?;
    let projection = project_2d(&vectors)?;
    let summaries = ClusterProfile::for_domain(domain).analyze(records, &model.labels, model.k())?;

    log::info!(
        "Clustered {} {} records into {} clusters",
        records.len(),
        domain,
        model.k()
    );
    Ok(ClusterReport {
        model,
        silhouette,
        projection,
        summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, genre: &str, energy: f64) -> EmbeddingRecord {
        EmbeddingRecord::new(id, vec![energy as f32, 0.0])
            .with_field("track_name", format!("Song {id}"))
            .with_field("artists", "Band")
            .with_field("genre", genre)
            .with_field("energy", energy)
            .with_field("popularity", 50_i64)
    }

    #[test]
    fn test_track_summary() {
        let records = vec![
            track("0", "rock", 0.9),
            track("1", "rock", 0.7),
            track("2", "jazz", 0.8),
            track("3", "ambient", 0.1),
        ];
        let summaries = ClusterProfile::for_domain(ContentDomain::Tracks)
            .analyze(&records, &[0, 0, 0, 1], 3)
            .unwrap();

        assert_eq!(summaries.len(), 2, "empty cluster 2 is skipped");
        let first = &summaries[0];
        assert_eq!(first.size, 3);
        assert_eq!(first.most_common["genre"], "rock");
        assert!((first.averages["energy"] - 0.8).abs() < 1e-9);
        assert_eq!(first.averages["popularity"], 50.0);
        assert_eq!(first.samples, vec!["Song 0 - Band", "Song 1 - Band", "Song 2 - Band"]);
        assert_eq!(summaries[1].cluster, 1);
    }

    #[test]
    fn test_title_genres_are_split() {
        let title = |id: &str, listed_in: &str, country: &str| {
            EmbeddingRecord::new(id, vec![1.0])
                .with_field("title", id)
                .with_field("type", "Movie")
                .with_field("listed_in", listed_in)
                .with_field("country", country)
                .with_field("release_year", 2020_i64)
        };
        let records = vec![
            title("A", "Dramas, Thrillers", "Unknown"),
            title("B", "Comedies, Dramas", "Unknown"),
            title("C", "Thrillers", "Spain"),
        ];
        let summaries = ClusterProfile::for_domain(ContentDomain::Titles)
            .analyze(&records, &[0, 0, 0], 1)
            .unwrap();

        let summary = &summaries[0];
        // Dramas and Thrillers tie at 2; alphabetical order decides.
        assert_eq!(summary.most_common["listed_in"], "Dramas");
        assert_eq!(summary.most_common["country"], "Spain");
        assert_eq!(summary.most_common["type"], "Movie");
        assert_eq!(summary.averages["release_year"], 2020.0);
    }

    #[test]
    fn test_cluster_catalog() {
        let records = vec![
            track("0", "rock", 0.9),
            track("1", "rock", 0.95),
            track("2", "ambient", -0.9),
            track("3", "ambient", -0.95),
        ];
        let report = cluster_catalog(ContentDomain::Tracks, &records, &KMeans::new(2)).unwrap();
        assert_eq!(report.summaries.len(), 2);
        assert_eq!(report.projection.len(), 4);
        assert!(report.silhouette.unwrap() > 0.5);
        assert_eq!(report.model.predict(&[1.0, 0.0]), report.model.labels[0]);
    }

    #[test]
    fn test_label_mismatch() {
        let records = vec![track("0", "rock", 0.9)];
        assert!(ClusterProfile::for_domain(ContentDomain::Tracks)
            .analyze(&records, &[], 1)
            .is_err());
    }
}
