// Cosine similarity over dense vectors.
//
// Both the item feature vectors (binary) and the per-user genre vectors
// (mean ratings) are non-negative, so results land in [0, 1]. A zero vector
// has no direction: any comparison involving one is 0.0, including a zero
// vector compared with itself.

/// Cosine similarity between two equal-length, non-negative vectors.
///
/// Returns 0.0 when the lengths differ, either vector is empty, or either
/// vector is all zeros. The result is clamped to [0, 1] to absorb rounding.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let sq_a: f64 = a.iter().map(|x| x * x).sum();
    let sq_b: f64 = b.iter().map(|x| x * x).sum();

    // sqrt(|a|^2 * |b|^2) rather than |a| * |b|: for a == b this is exactly
    // |a|^2, so self-similarity comes out as exactly 1.0.
    let denom = (sq_a * sq_b).sqrt();
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(0.0, 1.0)
    }
}

/// Cosine similarity of two binary vectors given their overlap and their
/// set-bit counts.
pub fn binary_cosine(overlap: usize, ones_a: usize, ones_b: usize) -> f64 {
    if ones_a == 0 || ones_b == 0 {
        return 0.0;
    }
    let denom = ((ones_a * ones_b) as f64).sqrt();
    (overlap as f64 / denom).clamp(0.0, 1.0)
}
