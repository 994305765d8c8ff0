//! Euclidean distance for dense vectors.
//!
//! Both tiers rank by plain L2 distance. Inputs do not need to be normalized.
//!
//! ```rust
//! use tiervec::distance::l2_distance;
//!
//! let a = [0.0_f32, 0.0];
//! let b = [3.0_f32, 4.0];
//! assert_eq!(l2_distance(&a, &b), 5.0);
//! ```

/// Squared L2 distance.
///
/// If dimensions mismatch, this returns `f32::INFINITY` (so it is never selected as a
/// nearest neighbor). Callers validate dimensions before reaching this point.
#[inline]
#[must_use]
pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// L2 (Euclidean) distance.
#[inline]
#[must_use]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    l2_distance_squared(a, b).sqrt()
}
