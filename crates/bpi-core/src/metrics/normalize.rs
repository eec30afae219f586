//! Unit-sum normalization of raw index scores.

/// Scale `scores` so they sum to 1.
///
/// If every score is zero (or the slice sums to zero) each entry becomes
/// `1 / n`, so a graph with no critical groups anywhere ranks every vertex
/// equally. An empty slice is returned unchanged.
#[allow(clippy::cast_precision_loss)]
pub fn normalize_scores(scores: &mut [f64]) {
    if scores.is_empty() {
        return;
    }
    let total: f64 = scores.iter().sum();
    if total <= 0.0 {
        let share = 1.0 / scores.len() as f64;
        scores.iter_mut().for_each(|s| *s = share);
    } else {
        scores.iter_mut().for_each(|s| *s /= total);
    }
}
