//! Vector records and ranked search hits.

use serde::{Deserialize, Serialize};

/// Stable record identifier, assigned monotonically by the store.
pub type RecordId = u64;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// The atomic unit of both tiers.
///
/// `level` is sampled once when the record is created and never changes.
/// Graph adjacency is owned by [`crate::hnsw::LayeredGraphIndex`], not by the
/// record, so a record moved into the archive carries no references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: RecordId,
    pub embedding: Vec<f32>,
    pub timestamp: Timestamp,
    pub level: usize,
}

impl VectorRecord {
    pub fn new(id: RecordId, embedding: Vec<f32>, timestamp: Timestamp, level: usize) -> Self {
        Self {
            id,
            embedding,
            timestamp,
            level,
        }
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// Attach a distance, producing a ranked hit.
    pub fn to_hit(&self, distance: f32) -> SearchHit {
        SearchHit {
            id: self.id,
            embedding: self.embedding.clone(),
            timestamp: self.timestamp,
            distance,
        }
    }
}

/// A ranked result, identical in shape for both tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: RecordId,
    pub embedding: Vec<f32>,
    pub timestamp: Timestamp,
    pub distance: f32,
}

/// Sort hits ascending by distance, ties broken by id.
pub(crate) fn rank_hits(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
}
