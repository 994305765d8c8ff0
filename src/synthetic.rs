//! Seedable random embeddings for synthetic load and benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates uniform random embeddings in `[0, 1)^dimension`.
#[derive(Debug, Clone)]
pub struct SyntheticLoad {
    rng: StdRng,
    dimension: usize,
}

impl SyntheticLoad {
    pub fn seeded(dimension: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            dimension,
        }
    }

    pub fn from_entropy(dimension: usize) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            dimension,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn next_embedding(&mut self) -> Vec<f32> {
        (0..self.dimension).map(|_| self.rng.random::<f32>()).collect()
    }

    /// `n` embeddings at once.
    pub fn batch(&mut self, n: usize) -> Vec<Vec<f32>> {
        (0..n).map(|_| self.next_embedding()).collect()
    }
}
