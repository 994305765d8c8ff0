//! Store configuration.
//!
//! Every field has a serde default, so a partial document (or `{}`) is a
//! valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrieveError};
use crate::hnsw::HnswParams;
use crate::window::{Windowing, MINUTE_MS};

/// Top-level configuration for [`crate::TieredVectorStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Fixed embedding dimension. When unset, the first insert establishes it.
    pub dimension: Option<usize>,
    /// Graph parameters for the hot tier.
    pub hnsw: HnswParams,
    /// Windowing and retention.
    pub tiering: TieringConfig,
    /// Seed for level sampling. Unset means OS entropy.
    pub seed: Option<u64>,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dimension == Some(0) {
            return Err(RetrieveError::InvalidConfig {
                field: "dimension".into(),
                reason: "must be at least 1".into(),
            });
        }
        self.hnsw.validate()?;
        self.tiering.validate()?;
        Ok(())
    }
}

/// Windowing and retention for the hot tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TieringConfig {
    /// Window length in milliseconds.
    pub window_size_ms: u64,
    /// Number of most recent windows kept in the hot tier.
    pub retain_window_count: u64,
    /// Delay after each window boundary before the automatic flush fires.
    pub flush_settle_ms: u64,
}

impl Default for TieringConfig {
    fn default() -> Self {
        Self {
            window_size_ms: MINUTE_MS,
            retain_window_count: 2,
            flush_settle_ms: 500,
        }
    }
}

impl TieringConfig {
    pub fn windowing(&self) -> Windowing {
        Windowing::new(self.window_size_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.window_size_ms == 0 {
            return Err(RetrieveError::InvalidConfig {
                field: "tiering.window_size_ms".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.retain_window_count == 0 {
            return Err(RetrieveError::InvalidConfig {
                field: "tiering.retain_window_count".into(),
                reason: "must keep at least one window resident".into(),
            });
        }
        Ok(())
    }
}
