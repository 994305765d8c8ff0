//! tiervec: two-tier vector storage and similarity search.
//!
//! Recent vectors live in a mutable, in-memory HNSW graph (the hot tier).
//! Once a vector's time window ages past the retention horizon it is moved
//! into an append-only archive of immutable, window-keyed partitions (the
//! cold tier). Queries name a target window and are dispatched to exactly one
//! tier.
//!
//! ```text
//! producers ──insert──▶ LayeredGraphIndex ──flush (aged windows)──▶ ArchiveStore
//!                              ▲                                        ▲
//!                              └──────────── QueryRouter ───────────────┘
//!                                     (resident window? hot : archive)
//! ```
//!
//! - [`hnsw`]: the layered graph (insert, k-NN search, windowed eviction)
//! - [`archive`]: partitions with write-once ingestion and linear-scan search
//! - [`tiering`]: the sliding-window migration policy
//! - [`router`]: window-keyed tier dispatch
//! - [`store`]: [`TieredVectorStore`], the service object holding both tiers
//! - [`scheduler`]: periodic auto-flush / auto-insert tasks on Tokio
//!
//! All distances are Euclidean.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tiervec::{ManualClock, StoreConfig, TieredVectorStore};
//!
//! # fn main() -> Result<(), tiervec::RetrieveError> {
//! let clock = ManualClock::from_millis(10 * 60_000);
//! let config = StoreConfig { dimension: Some(4), seed: Some(7), ..StoreConfig::default() };
//! let store = TieredVectorStore::with_clock(config, Arc::new(clock.clone()))?;
//!
//! let id = store.insert_now(vec![0.1, 0.2, 0.3, 0.4])?;
//! assert_eq!(store.search(&[0.1, 0.2, 0.3, 0.4], 1, None)?[0].id, id);
//!
//! // Two windows later the record's window is archived.
//! clock.advance_ms(2 * 60_000);
//! let created = store.flush_now();
//! assert_eq!(created.len(), 1);
//!
//! let hits = store.archive_query(&[0.1, 0.2, 0.3, 0.4], 10 * 60_000, 1)?.into_hits();
//! assert_eq!(hits[0].id, id);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod clock;
pub mod config;
pub mod distance;
pub mod error;
pub mod hnsw;
pub mod record;
pub mod router;
pub mod scheduler;
pub mod store;
pub mod synthetic;
pub mod tiering;
pub mod window;

// Re-exports
pub use archive::{ArchiveLookup, ArchiveStore, PartitionSummary};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{StoreConfig, TieringConfig};
pub use error::{Result, RetrieveError};
pub use record::{RecordId, SearchHit, Timestamp, VectorRecord};
pub use router::{QueryRouter, RoutedResults, Tier};
pub use store::{StoreStats, TieredVectorStore};
pub use tiering::{FlushReport, TieringController};
pub use window::{WindowStart, Windowing};
