//! Hot-to-cold migration by time window.
//!
//! On each flush the controller computes the current window from the flush
//! instant, keeps the newest `retain_window_count` windows resident, and moves
//! every older record into the archive, one partition per window.
//!
//! The boundary is expressed once, through the index's `<= threshold`
//! eviction primitive: evicting windows `<= retain_threshold - window_size` is
//! the same as evicting windows strictly older than `retain_threshold`, since
//! window starts are multiples of the window size.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::archive::{ArchiveStore, PartitionSummary};
use crate::hnsw::LayeredGraphIndex;
use crate::record::{Timestamp, VectorRecord};
use crate::window::{WindowStart, Windowing};

/// Result of one flush cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushReport {
    /// Window containing the flush instant.
    pub current_window: WindowStart,
    /// Oldest window that stays resident.
    pub retain_threshold: WindowStart,
    /// Partitions created by this flush, oldest window first.
    pub partitions: Vec<PartitionSummary>,
}

impl FlushReport {
    /// Records moved by this flush.
    pub fn migrated(&self) -> usize {
        self.partitions.iter().map(|p| p.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

/// Sliding-window tiering policy.
#[derive(Debug)]
pub struct TieringController {
    windowing: Windowing,
    retain_window_count: u64,
    total_flushes: AtomicU64,
    total_migrated: AtomicU64,
}

impl TieringController {
    /// `retain_window_count` is clamped to at least 1.
    pub fn new(windowing: Windowing, retain_window_count: u64) -> Self {
        Self {
            windowing,
            retain_window_count: retain_window_count.max(1),
            total_flushes: AtomicU64::new(0),
            total_migrated: AtomicU64::new(0),
        }
    }

    pub fn windowing(&self) -> &Windowing {
        &self.windowing
    }

    pub fn retain_window_count(&self) -> u64 {
        self.retain_window_count
    }

    /// Oldest window that must stay resident when flushing at `now`.
    pub fn retain_threshold(&self, now: Timestamp) -> WindowStart {
        let current = self.windowing.window_of(now);
        self.windowing
            .windows_before(current, self.retain_window_count - 1)
    }

    /// Run one tiering cycle against `now`.
    ///
    /// Evicted records are moved, not copied: they leave the index before the
    /// archive takes ownership. A flush that evicts nothing changes nothing.
    pub fn flush(
        &self,
        now: Timestamp,
        index: &mut LayeredGraphIndex,
        archive: &mut ArchiveStore,
    ) -> FlushReport {
        let current_window = self.windowing.window_of(now);
        let retain_threshold = self.retain_threshold(now);
        self.total_flushes.fetch_add(1, Ordering::Relaxed);

        let mut report = FlushReport {
            current_window,
            retain_threshold,
            partitions: Vec::new(),
        };
        if retain_threshold == 0 {
            debug!(current_window, "nothing older than the first window");
            return report;
        }

        let evict_through = self.windowing.windows_before(retain_threshold, 1);
        let evicted = index.remove_by_time_window(evict_through, &self.windowing);
        if evicted.is_empty() {
            debug!(current_window, retain_threshold, "flush found nothing to migrate");
            return report;
        }

        for (window, group) in self.group_by_window(evicted) {
            report.partitions.push(archive.put_vectors(group, window));
        }

        let migrated = report.migrated() as u64;
        self.total_migrated.fetch_add(migrated, Ordering::Relaxed);
        info!(
            current_window,
            retain_threshold,
            migrated,
            partitions = ?report.partitions.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            "migrated aged windows to archive"
        );
        report
    }

    fn group_by_window(
        &self,
        records: Vec<VectorRecord>,
    ) -> BTreeMap<WindowStart, Vec<VectorRecord>> {
        let mut groups: BTreeMap<WindowStart, Vec<VectorRecord>> = BTreeMap::new();
        for record in records {
            groups
                .entry(self.windowing.window_of(record.timestamp))
                .or_default()
                .push(record);
        }
        groups
    }

    /// Flush cycles run since creation, including empty ones.
    pub fn total_flushes(&self) -> u64 {
        self.total_flushes.load(Ordering::Relaxed)
    }

    /// Records migrated since creation.
    pub fn total_migrated(&self) -> u64 {
        self.total_migrated.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hnsw::{HnswParams, LevelSampler};

    const MIN: u64 = 60_000;

    fn populated(timestamps: &[u64]) -> LayeredGraphIndex {
        let mut index = LayeredGraphIndex::new(HnswParams::default(), LevelSampler::seeded(9, 2));
        for (i, &ts) in timestamps.iter().enumerate() {
            let level = index.sample_level();
            index
                .insert(VectorRecord::new(i as u64, vec![i as f32, 0.0], ts, level))
                .unwrap();
        }
        index
    }

    #[test]
    fn test_retain_threshold() {
        let controller = TieringController::new(Windowing::minutes(), 2);
        assert_eq!(controller.retain_threshold(10 * MIN + 5), 9 * MIN);
        let keep_one = TieringController::new(Windowing::minutes(), 1);
        assert_eq!(keep_one.retain_threshold(10 * MIN + 5), 10 * MIN);
    }

    #[test]
    fn test_flush_moves_only_old_windows() {
        let controller = TieringController::new(Windowing::minutes(), 2);
        let mut index = populated(&[
            10 * MIN + 1,
            10 * MIN + 2,
            11 * MIN + 1,
            12 * MIN + 1,
            12 * MIN + 2,
        ]);
        let mut archive = ArchiveStore::new(Windowing::minutes());

        let report = controller.flush(12 * MIN + 500, &mut index, &mut archive);
        assert_eq!(report.retain_threshold, 11 * MIN);
        assert_eq!(report.partitions.len(), 1);
        assert_eq!(report.partitions[0].window_start, 10 * MIN);
        assert_eq!(report.migrated(), 2);
        assert_eq!(index.len(), 3);
        assert!(index.validate().is_ok());
        assert_eq!(controller.total_migrated(), 2);
    }

    #[test]
    fn test_flush_groups_by_window() {
        let controller = TieringController::new(Windowing::minutes(), 1);
        let mut index = populated(&[MIN, 2 * MIN, 2 * MIN + 7, 3 * MIN, 5 * MIN]);
        let mut archive = ArchiveStore::new(Windowing::minutes());

        let report = controller.flush(5 * MIN, &mut index, &mut archive);
        let windows: Vec<_> = report.partitions.iter().map(|p| p.window_start).collect();
        assert_eq!(windows, vec![MIN, 2 * MIN, 3 * MIN]);
        assert_eq!(report.partitions[1].count, 2);
        assert_eq!(archive.record_count(), 4);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_empty_flush_changes_nothing() {
        let controller = TieringController::new(Windowing::minutes(), 2);
        let mut index = populated(&[5 * MIN]);
        let mut archive = ArchiveStore::new(Windowing::minutes());

        let report = controller.flush(6 * MIN, &mut index, &mut archive);
        assert!(report.is_empty());
        assert_eq!(archive.partition_count(), 0);
        assert_eq!(index.len(), 1);
        assert_eq!(controller.total_flushes(), 1);
    }
}
