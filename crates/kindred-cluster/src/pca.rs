//! Two-component PCA for plotting embeddings.
//!
//! Components come from power iteration on the covariance of the centered
//! data, deflating after the first. Each component's sign is fixed so its
//! largest-magnitude entry is positive, which keeps projections stable
//! across runs.

use crate::error::{check_dimensions, Result};

const MAX_ITER: usize = 500;
const TOLERANCE: f64 = 1e-10;

fn covariance(centered: &[Vec<f64>], dim: usize) -> Vec<Vec<f64>> {
    let n = centered.len().saturating_sub(1).max(1) as f64;
    let mut cov = vec![vec![0.0; dim]; dim];
    for row in centered {
        for i in 0..dim {
            for j in i..dim {
                cov[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..dim {
        for j in i..dim {
            cov[i][j] /= n;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

fn multiply(matrix: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    matrix
        .iter()
        .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
        .collect()
}

fn normalize(v: &mut [f64]) -> f64 {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    norm
}

/// Leading eigenvector and eigenvalue of a symmetric positive
/// semi-definite matrix. Returns a zero vector when the matrix is zero.
fn dominant_eigenvector(matrix: &[Vec<f64>]) -> (Vec<f64>, f64) {
    let dim = matrix.len();
    // Start from the column with the most mass so the start vector is not
    // orthogonal to the dominant direction.
    let start = (0..dim)
        .max_by(|&a, &b| matrix[a][a].total_cmp(&matrix[b][b]))
        .unwrap_or(0);
    let mut v: Vec<f64> = matrix.iter().map(|row| row[start] + 1e-3).collect();
    if normalize(&mut v) == 0.0 {
        return (vec![0.0; dim], 0.0);
    }

    let mut eigenvalue = 0.0;
    for _ in 0..MAX_ITER {
        let mut next = multiply(matrix, &v);
        eigenvalue = normalize(&mut next);
        if eigenvalue == 0.0 {
            return (vec![0.0; dim], 0.0);
        }
        let delta: f64 = next.iter().zip(&v).map(|(a, b)| (a - b).abs()).sum();
        v = next;
        if delta < TOLERANCE {
            break;
        }
    }

    let pivot = v
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    if pivot < 0.0 {
        for x in &mut v {
            *x = -*x;
        }
    }
    (v, eigenvalue)
}

/// Project vectors onto their first two principal components.
///
/// One-dimensional or degenerate input yields zeros in the missing
/// coordinates.
pub fn project_2d(vectors: &[Vec<f32>]) -> Result<Vec<[f32; 2]>> {
    if vectors.is_empty() {
        return Ok(Vec::new());
    }
    let dim = check_dimensions(vectors)?;
    let n = vectors.len() as f64;

    let mut mean = vec![0.0; dim];
    for v in vectors {
        for (m, x) in mean.iter_mut().zip(v) {
            *m += f64::from(*x) / n;
        }
    }
    let centered: Vec<Vec<f64>> = vectors
        .iter()
        .map(|v| v.iter().zip(&mean).map(|(x, m)| f64::from(*x) - m).collect())
        .collect();

    let mut cov = covariance(&centered, dim);
    let (first, lambda) = dominant_eigenvector(&cov);
    for i in 0..dim {
        for j in 0..dim {
            cov[i][j] -= lambda * first[i] * first[j];
        }
    }
    let (mut second, residual) = dominant_eigenvector(&cov);

    let dot = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();
    // Deflation leaves rounding noise; anything that small is no component.
    if residual <= lambda * 1e-9 {
        second = vec![0.0; dim];
    } else {
        let overlap = dot(&second, &first);
        for (s, f) in second.iter_mut().zip(&first) {
            *s -= overlap * f;
        }
        normalize(&mut second);
    }
    Ok(centered
        .iter()
        .map(|row| [dot(row, &first) as f32, dot(row, &second) as f32])
        .collect())
}
