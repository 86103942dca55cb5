//! Lloyd's k-means with k-means++ seeding.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{check_dimensions, ClusterError, Result};

pub(crate) fn squared_distance(a: &[f32], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, c)| (f64::from(*x) - c).powi(2))
        .sum()
}

fn nearest(point: &[f32], centers: &[Vec<f64>]) -> (usize, f64) {
    centers
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_distance(point, c)))
        .fold((0, f64::INFINITY), |best, (i, d)| if d < best.1 { (i, d) } else { best })
}

/// k-means parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeans {
    pub k: usize,
    pub seed: u64,
    /// Independent restarts; the run with the lowest inertia wins.
    pub n_init: usize,
    pub max_iter: usize,
}

impl KMeans {
    #[must_use]
    pub const fn new(k: usize) -> Self {
        Self {
            k,
            seed: 42,
            n_init: 10,
            max_iter: 300,
        }
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub const fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Cluster `vectors`. `k` is reduced to the number of points when
    /// there are fewer points than clusters.
    pub fn fit(&self, vectors: &[Vec<f32>]) -> Result<ClusterModel> {
        if self.k == 0 {
            return Err(ClusterError::InvalidK(0));
        }
        check_dimensions(vectors)?;

        let k = self.k.min(vectors.len());
        if k < self.k {
            log::warn!("Only {} points, using k={} instead of {}", vectors.len(), k, self.k);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<ClusterModel> = None;
        for run in 0..self.n_init.max(1) {
            let model = self.run(vectors, k, &mut rng);
            log::debug!("k-means run {}: inertia {:.4}", run, model.inertia);
            if best.as_ref().is_none_or(|b| model.inertia < b.inertia) {
                best = Some(model);
            }
        }
        best.ok_or(ClusterError::EmptyInput)
    }

    /// Pick initial centers: the first uniformly, the rest with
    /// probability proportional to squared distance from the nearest
    /// center chosen so far.
    fn seed_centers(vectors: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
        let to_center = |v: &Vec<f32>| v.iter().map(|x| f64::from(*x)).collect::<Vec<f64>>();

        let mut centers = vec![to_center(&vectors[rng.random_range(0..vectors.len())])];
        let mut distances: Vec<f64> = vectors
            .iter()
            .map(|v| squared_distance(v, &centers[0]))
            .collect();

        while centers.len() < k {
            let total: f64 = distances.iter().sum();
            let chosen = if total > 0.0 {
                let mut target = rng.random::<f64>() * total;
                distances
                    .iter()
                    .position(|d| {
                        target -= d;
                        target < 0.0
                    })
                    .unwrap_or(vectors.len() - 1)
            } else {
                // Every point coincides with a center already.
                rng.random_range(0..vectors.len())
            };

            let center = to_center(&vectors[chosen]);
            for (d, v) in distances.iter_mut().zip(vectors) {
                *d = d.min(squared_distance(v, &center));
            }
            centers.push(center);
        }
        centers
    }

    fn run(&self, vectors: &[Vec<f32>], k: usize, rng: &mut StdRng) -> ClusterModel {
        let dim = vectors[0].len();
        let mut centers = Self::seed_centers(vectors, k, rng);
        let mut labels = vec![usize::MAX; vectors.len()];

        for _ in 0..self.max_iter {
            let mut changed = false;
            for (label, v) in labels.iter_mut().zip(vectors) {
                let (nearest, _) = nearest(v, &centers);
                if *label != nearest {
                    *label = nearest;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            let mut sums = vec![vec![0.0_f64; dim]; k];
            let mut counts = vec![0_usize; k];
            for (&label, v) in labels.iter().zip(vectors) {
                counts[label] += 1;
                for (s, x) in sums[label].iter_mut().zip(v) {
                    *s += f64::from(*x);
                }
            }
            // An emptied cluster keeps its previous center.
            for ((center, sum), count) in centers.iter_mut().zip(sums).zip(counts) {
                if count > 0 {
                    *center = sum.into_iter().map(|s| s / count as f64).collect();
                }
            }
        }

        let inertia = labels
            .iter()
            .zip(vectors)
            .map(|(&label, v)| squared_distance(v, &centers[label]))
            .sum();

        ClusterModel {
            centers,
            labels,
            inertia,
        }
    }
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(4)
    }
}

/// A fitted clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterModel {
    pub centers: Vec<Vec<f64>>,
    /// Cluster index for each input vector, in input order.
    pub labels: Vec<usize>,
    /// Sum of squared distances from each point to its center.
    pub inertia: f64,
}

impl ClusterModel {
    #[must_use]
    pub fn k(&self) -> usize {
        self.centers.len()
    }

    /// Index of the center nearest to `vector`.
    #[must_use]
    pub fn predict(&self, vector: &[f32]) -> usize {
        nearest(vector, &self.centers).0
    }

    /// Number of points assigned to each cluster.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}
