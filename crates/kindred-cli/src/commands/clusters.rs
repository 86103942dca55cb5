use anyhow::{Context, Result};
use kindred_cluster::{cluster_catalog, find_optimal_k, ClusterReport, KMeans};
use kindred_core::{ContentDomain, EmbeddingRecord};
use kindred_etl::Config;
use kindred_search::VectorBackend;
use std::fmt::Write;

use super::load_snapshot;

/// Upper bound for `--k auto`.
const MAX_AUTO_K: usize = 10;

pub(crate) fn render(domain: ContentDomain, report: &ClusterReport) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "\n{} clusters for {}", report.model.k(), domain)?;
    match report.silhouette {
        Some(score) => {
            writeln!(out, "Silhouette score: {score:.3}")?;
        }
        None => out.push_str("Silhouette score: n/a\n"),
    }

    for summary in &report.summaries {
        writeln!(out, "\nCluster {} ({} items)", summary.cluster, summary.size)?;
        for (field, value) in &summary.most_common {
            writeln!(out, "  most common {field}: {value}")?;
        }
        for (field, mean) in &summary.averages {
            writeln!(out, "  avg {field}: {mean:.2}")?;
        }
        for sample in &summary.samples {
            writeln!(out, "  - {sample}")?;
        }
    }
    Ok(out)
}

/// One `id,cluster,x,y` line per record, from the 2-D projection.
pub(crate) fn render_points(records: &[EmbeddingRecord], report: &ClusterReport) -> Result<String> {
    let mut out = String::from("id,cluster,x,y\n");
    for ((record, label), [x, y]) in records
        .iter()
        .zip(&report.model.labels)
        .zip(&report.projection)
    {
        writeln!(out, "{},{label},{x:.4},{y:.4}", record.id)?;
    }
    Ok(out)
}

/// Cluster a collection. `k = None` picks k by silhouette score. With
/// `points`, print projected coordinates instead of summaries.
pub fn run(config: &Config, domain: ContentDomain, k: Option<usize>, points: bool) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let records = snapshot.engine().backend().all(domain.collection());

    let k = match k {
        Some(k) => k,
        None => {
            let vectors: Vec<Vec<f32>> = records.iter().map(|r| r.vector.clone()).collect();
            let k = find_optimal_k(&vectors, MAX_AUTO_K, config.seed)
                .context("Failed to choose a cluster count")?;
            log::info!("Chose k={} by silhouette score", k);
            k
        }
    };

    let kmeans = KMeans::new(k).with_seed(config.seed);
    let report = cluster_catalog(domain, &records, &kmeans)
        .with_context(|| format!("Failed to cluster {domain}"))?;
    if points {
        print!("{}", render_points(&records, &report)?);
    } else {
        print!("{}", render(domain, &report)?);
    }
    Ok(())
}
