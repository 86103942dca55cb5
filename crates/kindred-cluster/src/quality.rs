//! Cluster quality and choice of k.

use crate::error::{check_dimensions, ClusterError, Result};
use crate::kmeans::KMeans;

fn distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (f64::from(*x) - f64::from(*y)).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Mean silhouette coefficient over all points (Euclidean distance).
///
/// `None` unless there are at least 2 and at most `n - 1` distinct
/// labels. Points alone in their cluster contribute 0.
pub fn silhouette_score(vectors: &[Vec<f32>], labels: &[usize]) -> Result<Option<f32>> {
    if vectors.len() != labels.len() {
        return Err(ClusterError::LabelMismatch {
            vectors: vectors.len(),
            labels: labels.len(),
        });
    }
    if vectors.is_empty() {
        return Ok(None);
    }
    check_dimensions(vectors)?;

    let k = labels.iter().max().map_or(0, |m| m + 1);
    let mut sizes = vec![0_usize; k];
    for &label in labels {
        sizes[label] += 1;
    }
    let populated = sizes.iter().filter(|&&s| s > 0).count();
    if populated < 2 || populated >= vectors.len() {
        return Ok(None);
    }

    let mut total = 0.0;
    for (i, v) in vectors.iter().enumerate() {
        let own = labels[i];
        if sizes[own] == 1 {
            continue;
        }

        let mut sums = vec![0.0_f64; k];
        for (j, w) in vectors.iter().enumerate() {
            if i != j {
                sums[labels[j]] += distance(v, w);
            }
        }

        let a = sums[own] / (sizes[own] - 1) as f64;
        let b = (0..k)
            .filter(|&c| c != own && sizes[c] > 0)
            .map(|c| sums[c] / sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);
        let scale = a.max(b);
        if scale > 0.0 {
            total += (b - a) / scale;
        }
    }

    Ok(Some((total / vectors.len() as f64) as f32))
}

/// The k in `2..=min(max_k, n - 1)` whose clustering has the highest
/// silhouette score. Ties go to the smaller k.
pub fn find_optimal_k(vectors: &[Vec<f32>], max_k: usize, seed: u64) -> Result<usize> {
    let upper = max_k.min(vectors.len().saturating_sub(1));
    if upper < 2 {
        return Err(ClusterError::TooFewPoints(vectors.len()));
    }

    let mut best: Option<(usize, f32)> = None;
    for k in 2..=upper {
        let model = KMeans::new(k).with_seed(seed).fit(vectors)?;
        let score = silhouette_score(vectors, &model.labels)?.unwrap_or(f32::NEG_INFINITY);
        log::debug!("k={}: silhouette {:.4}, inertia {:.4}", k, score, model.inertia);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((k, score));
        }
    }

    best.map(|(k, _)| k).ok_or(ClusterError::TooFewPoints(vectors.len()))
}
