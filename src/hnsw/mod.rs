//! Hierarchical Navigable Small World (HNSW) graph for the hot tier.
//!
//! # Algorithm
//!
//! HNSW constructs a multi-layer graph where:
//! - **Upper layers**: Sparse, long-range connections for fast navigation
//! - **Lower layers**: Dense, local connections for precise search
//! - **Search**: Start at top layer, navigate down to base layer, greedy search
//!
//! This variant is small and fully mutable:
//!
//! - levels come from fair coin flips capped at `max_level` (default 2, three layers)
//! - neighbor selection is pure nearest-distance, with no diversity heuristic
//! - edges are symmetric; pruning an over-full list unlinks both sides
//! - records can be evicted in bulk (by time window or predicate) with
//!   synchronous reference cleanup and entry-point re-election
//!
//! # Usage
//!
//! ```rust
//! use tiervec::hnsw::{HnswParams, LayeredGraphIndex, LevelSampler};
//! use tiervec::VectorRecord;
//!
//! # fn main() -> Result<(), tiervec::RetrieveError> {
//! let params = HnswParams::default();
//! let mut index = LayeredGraphIndex::new(params, LevelSampler::seeded(7, params.max_level));
//!
//! for id in 0..10u64 {
//!     let level = index.sample_level();
//!     index.insert(VectorRecord::new(id, vec![id as f32; 4], 0, level))?;
//! }
//!
//! let hits = index.search(&[3.0; 4], 2, 16)?;
//! assert_eq!(hits[0].id, 3);
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! - Malkov & Yashunin (2016): "Efficient and robust approximate nearest neighbor search
//!   using Hierarchical Navigable Small World graphs"

pub(crate) mod construction;
mod graph;
mod level;
mod params;
pub(crate) mod search;

pub use graph::LayeredGraphIndex;
pub use level::LevelSampler;
pub use params::HnswParams;
