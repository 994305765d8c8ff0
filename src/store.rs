//! The tiered store: one service object owning both tiers.
//!
//! Lock discipline: the index lock is always taken before the archive lock.
//! Inserts and flushes take the index write lock; flushes also hold the
//! archive write lock so a window is never observed half-migrated. Searches,
//! stats and routing take read locks.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::archive::{ArchiveLookup, ArchiveStore, PartitionSummary};
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::hnsw::{LayeredGraphIndex, LevelSampler};
use crate::record::{RecordId, SearchHit, Timestamp, VectorRecord};
use crate::router::{QueryRouter, RoutedResults};
use crate::tiering::{FlushReport, TieringController};
use crate::window::{WindowStart, Windowing};

/// Point-in-time counts across both tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub live_count: usize,
    pub archived_partition_count: usize,
    pub archived_record_count: usize,
    /// Records present on each layer, index 0 = base layer.
    pub per_layer_counts: Vec<usize>,
    /// Live records per resident window.
    pub per_window_counts: BTreeMap<WindowStart, usize>,
}

/// Hot graph index plus cold archive behind one API.
#[derive(Debug)]
pub struct TieredVectorStore {
    config: StoreConfig,
    index: RwLock<LayeredGraphIndex>,
    archive: RwLock<ArchiveStore>,
    tiering: TieringController,
    clock: Arc<dyn Clock>,
    next_id: AtomicU64,
}

impl TieredVectorStore {
    /// Store on the system clock.
    pub fn new(config: StoreConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let params = config.hnsw;
        let levels = match config.seed {
            Some(seed) => LevelSampler::seeded(seed, params.max_level),
            None => LevelSampler::from_entropy(params.max_level),
        };
        let index = match config.dimension {
            Some(dimension) => LayeredGraphIndex::with_dimension(params, levels, dimension),
            None => LayeredGraphIndex::new(params, levels),
        };
        let windowing = config.tiering.windowing();

        Ok(Self {
            tiering: TieringController::new(windowing, config.tiering.retain_window_count),
            archive: RwLock::new(ArchiveStore::new(windowing)),
            index: RwLock::new(index),
            clock,
            config,
            next_id: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn windowing(&self) -> Windowing {
        *self.tiering.windowing()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn tiering(&self) -> &TieringController {
        &self.tiering
    }

    /// Insert an embedding stamped with `timestamp`, returning its new id.
    pub fn insert(&self, embedding: Vec<f32>, timestamp: Timestamp) -> Result<RecordId> {
        let mut index = self.index.write();
        let level = index.sample_level();
        let id = self.next_id.load(Ordering::Relaxed);
        index.insert(VectorRecord::new(id, embedding, timestamp, level))?;
        // Ids are only consumed by successful inserts.
        self.next_id.store(id + 1, Ordering::Relaxed);
        Ok(id)
    }

    /// Insert an embedding stamped with the store clock.
    pub fn insert_now(&self, embedding: Vec<f32>) -> Result<RecordId> {
        self.insert(embedding, self.clock.now_ms())
    }

    /// k-nearest search over the hot tier. `ef` defaults to `hnsw.ef_search`.
    pub fn search(&self, query: &[f32], k: usize, ef: Option<usize>) -> Result<Vec<SearchHit>> {
        let ef = ef.unwrap_or(self.config.hnsw.ef_search);
        self.index.read().search(query, k, ef)
    }

    /// Run one tiering cycle at the current clock time.
    pub fn flush_now(&self) -> Vec<PartitionSummary> {
        self.flush_at(self.clock.now_ms()).partitions
    }

    /// Run one tiering cycle as if the time were `now`.
    pub fn flush_at(&self, now: Timestamp) -> FlushReport {
        let mut index = self.index.write();
        let mut archive = self.archive.write();
        self.tiering.flush(now, &mut index, &mut archive)
    }

    /// Exact search within one archived window.
    pub fn archive_query(
        &self,
        query: &[f32],
        window_start: WindowStart,
        k: usize,
    ) -> Result<ArchiveLookup> {
        self.archive.read().query_vectors(query, window_start, k)
    }

    /// Search whichever tier currently owns `window`.
    pub fn query_window(
        &self,
        query: &[f32],
        window: WindowStart,
        k: usize,
        ef: Option<usize>,
    ) -> Result<RoutedResults> {
        let ef = ef.unwrap_or(self.config.hnsw.ef_search);
        let index = self.index.read();
        let archive = self.archive.read();
        QueryRouter::new(&index, &archive, self.windowing()).query(query, window, k, ef)
    }

    pub fn stats(&self) -> StoreStats {
        let windowing = self.windowing();
        let index = self.index.read();
        let archive = self.archive.read();
        StoreStats {
            live_count: index.len(),
            archived_partition_count: archive.partition_count(),
            archived_record_count: archive.record_count(),
            per_layer_counts: index.per_layer_counts(),
            per_window_counts: index.per_window_counts(&windowing),
        }
    }

    /// Run a closure against the hot index under its read lock.
    pub fn with_index<T>(&self, f: impl FnOnce(&LayeredGraphIndex) -> T) -> T {
        f(&self.index.read())
    }

    /// Run a closure against the archive under its read lock.
    pub fn with_archive<T>(&self, f: impl FnOnce(&ArchiveStore) -> T) -> T {
        f(&self.archive.read())
    }
}
