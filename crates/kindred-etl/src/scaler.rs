//! Feature scaling for numeric embeddings.

/// Rescale values in place to `[0, 1]`. A constant column becomes all zeros.
pub fn min_max_scale(values: &mut [f64]) {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    for v in values.iter_mut() {
        *v = if range > 0.0 { (*v - min) / range } else { 0.0 };
    }
}

/// Per-column z-score standardization (population standard deviation).
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Learn column means and deviations from row-major data.
    #[must_use]
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        let n = rows.len().max(1) as f64;

        let mut means = vec![0.0; width];
        for row in rows {
            for (mean, v) in means.iter_mut().zip(row) {
                *mean += v;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut stds = vec![0.0; width];
        for row in rows {
            for ((std, mean), v) in stds.iter_mut().zip(&means).zip(row) {
                *std += (v - mean).powi(2);
            }
        }
        for std in &mut stds {
            *std = (*std / n).sqrt();
        }

        Self { means, stds }
    }

    /// Standardize one row. Zero-variance columns map to 0.
    #[must_use]
    pub fn transform(&self, row: &[f64]) -> Vec<f32> {
        row.iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(v, (mean, std))| {
                if *std > 0.0 {
                    ((v - mean) / std) as f32
                } else {
                    0.0
                }
            })
            .collect()
    }

    #[must_use]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    #[must_use]
    pub fn stds(&self) -> &[f64] {
        &self.stds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_scale() {
        let mut values = vec![60.0, 120.0, 180.0];
        min_max_scale(&mut values);
        assert_eq!(values, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_min_max_constant_column() {
        let mut values = vec![-7.0, -7.0];
        min_max_scale(&mut values);
        assert_eq!(values, vec![0.0, 0.0]);
    }

    #[test]
    fn test_standard_scaler() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        let scaler = StandardScaler::fit(&rows);

        assert_eq!(scaler.means(), &[2.0, 10.0]);
        assert_eq!(scaler.stds(), &[1.0, 0.0]);
        assert_eq!(scaler.transform(&rows[0]), vec![-1.0, 0.0]);
        assert_eq!(scaler.transform(&rows[1]), vec![1.0, 0.0]);
    }

    #[test]
    fn test_standardized_columns_have_zero_mean() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![f64::from(i) * 1.5 + 2.0]).collect();
        let scaler = StandardScaler::fit(&rows);
        let sum: f32 = rows.iter().map(|r| scaler.transform(r)[0]).sum();
        assert!(sum.abs() < 1e-5);
    }
}
