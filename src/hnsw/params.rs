//! Graph construction and search parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrieveError};

/// Fixed parameters of a [`super::LayeredGraphIndex`].
///
/// Layer count and fan-out are chosen at construction and cannot change for the
/// lifetime of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswParams {
    /// Maximum neighbors per record on layers >= 1.
    pub m: usize,
    /// Maximum neighbors per record on layer 0.
    pub m0: usize,
    /// Highest layer a record can be assigned (layers are `0..=max_level`).
    pub max_level: usize,
    /// Default search width when the caller does not supply one.
    pub ef_search: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 8,
            m0: 16,
            max_level: 2,
            ef_search: 32,
        }
    }
}

impl HnswParams {
    /// Fan-out bound at `layer`.
    #[inline]
    pub fn max_neighbors(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m0
        } else {
            self.m
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.m == 0 {
            return Err(invalid("hnsw.m", "must be at least 1"));
        }
        if self.m0 == 0 {
            return Err(invalid("hnsw.m0", "must be at least 1"));
        }
        if self.ef_search == 0 {
            return Err(invalid("hnsw.ef_search", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> RetrieveError {
    RetrieveError::InvalidConfig {
        field: field.into(),
        reason: reason.into(),
    }
}
