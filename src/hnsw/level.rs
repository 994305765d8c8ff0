//! Randomized level assignment.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Samples record levels by repeated fair coin flips.
///
/// The level starts at 0 and increments while the flip succeeds, capped at
/// `max_level`, so `P(level = k) = 2^-(k+1)` below the cap and the tail mass
/// collapses onto `max_level`.
pub struct LevelSampler {
    rng: Box<dyn RngCore + Send + Sync>,
    max_level: usize,
}

impl LevelSampler {
    /// Sampler over any random source.
    pub fn with_rng(rng: impl RngCore + Send + Sync + 'static, max_level: usize) -> Self {
        Self {
            rng: Box::new(rng),
            max_level,
        }
    }

    /// Reproducible sampler.
    pub fn seeded(seed: u64, max_level: usize) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), max_level)
    }

    /// Sampler seeded from the OS.
    pub fn from_entropy(max_level: usize) -> Self {
        Self::with_rng(StdRng::from_os_rng(), max_level)
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    pub fn sample(&mut self) -> usize {
        let mut level = 0;
        while level < self.max_level && self.rng.random_bool(0.5) {
            level += 1;
        }
        level
    }
}

impl std::fmt::Debug for LevelSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelSampler")
            .field("max_level", &self.max_level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_within_bounds() {
        let mut sampler = LevelSampler::seeded(7, 2);
        for _ in 0..1000 {
            assert!(sampler.sample() <= 2);
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = LevelSampler::seeded(42, 2);
        let mut b = LevelSampler::seeded(42, 2);
        let xs: Vec<usize> = (0..64).map(|_| a.sample()).collect();
        let ys: Vec<usize> = (0..64).map(|_| b.sample()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_distribution_decays() {
        let mut sampler = LevelSampler::seeded(1, 2);
        let mut counts = [0usize; 3];
        for _ in 0..10_000 {
            counts[sampler.sample()] += 1;
        }
        // Expected ~50% / 25% / 25% (tail clamped onto the top level).
        assert!((4_500..5_500).contains(&counts[0]), "{counts:?}");
        assert!((2_000..3_000).contains(&counts[1]), "{counts:?}");
        assert!((2_000..3_000).contains(&counts[2]), "{counts:?}");
    }

    #[test]
    fn test_zero_max_level() {
        let mut sampler = LevelSampler::seeded(3, 0);
        assert!((0..100).all(|_| sampler.sample() == 0));
    }
}
