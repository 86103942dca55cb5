//! Cosine similarity.

/// Cosine similarity between two vectors: `dot(a, b) / (|a| * |b|)`.
///
/// Returns 0.0 when either vector has zero magnitude or the computation is
/// not finite, so the result is never NaN. Identical non-zero vectors score
/// exactly 1.0. Vectors of different lengths are not comparable and score
/// 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        log::warn!("Cosine similarity of vectors with {} and {} dimensions", a.len(), b.len());
        return 0.0;
    }
    if a == b {
        return if a.iter().any(|x| *x != 0.0) && a.iter().all(|x| x.is_finite()) {
            1.0
        } else {
            0.0
        };
    }

    // f64 accumulators keep the result symmetric and stable for long
    // TF-IDF vectors.
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0) as f32
    } else {
        0.0
    }
}
