//! Cold tier: append-only, time-windowed partitions of immutable records.
//!
//! Each call to [`ArchiveStore::put_vectors`] creates exactly one new
//! partition. Partitions are never merged, split, or mutated. Archiving the
//! same window twice creates a second partition under the same window with a
//! higher `sequence`; queries against that window rank the union of all of its
//! partitions.
//!
//! Search is a linear scan. Cold data is expected to be queried rarely, so no
//! index structure is built over it.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::distance::l2_distance;
use crate::error::{check_dimension, check_k, Result};
use crate::record::{rank_hits, SearchHit, VectorRecord};
use crate::window::{WindowStart, Windowing};

/// One immutable archive partition.
#[derive(Debug)]
pub struct Partition {
    window_start: WindowStart,
    sequence: u32,
    name: String,
    records: Box<[VectorRecord]>,
}

impl Partition {
    pub fn window_start(&self) -> WindowStart {
        self.window_start
    }

    /// 0 for the first partition of a window, 1 for the next, and so on.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> PartitionSummary {
        PartitionSummary {
            name: self.name.clone(),
            window_start: self.window_start,
            sequence: self.sequence,
            count: self.records.len(),
        }
    }
}

/// Name, window and size of a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub name: String,
    pub window_start: WindowStart,
    pub sequence: u32,
    pub count: usize,
}

/// Outcome of an archive lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveLookup {
    /// The window has at least one partition; hits are ascending by distance.
    Hits(Vec<SearchHit>),
    /// No partition exists for the requested window.
    WindowNotArchived,
}

impl ArchiveLookup {
    /// Hits, or an empty list when the window was not archived.
    pub fn into_hits(self) -> Vec<SearchHit> {
        match self {
            ArchiveLookup::Hits(hits) => hits,
            ArchiveLookup::WindowNotArchived => Vec::new(),
        }
    }

    pub fn is_archived(&self) -> bool {
        matches!(self, ArchiveLookup::Hits(_))
    }
}

/// Append-only collection of partitions.
#[derive(Debug, Default)]
pub struct ArchiveStore {
    partitions: Vec<Arc<Partition>>,
    windowing: Windowing,
}

impl ArchiveStore {
    pub fn new(windowing: Windowing) -> Self {
        Self {
            partitions: Vec::new(),
            windowing,
        }
    }

    /// Create one new partition for `window_start` holding exactly `records`.
    pub fn put_vectors(
        &mut self,
        records: Vec<VectorRecord>,
        window_start: WindowStart,
    ) -> PartitionSummary {
        let sequence = self.partitions_for(window_start).count() as u32;
        let label = self.windowing.label(window_start);
        let name = if sequence == 0 {
            format!("archive-{label}")
        } else {
            warn!(window_start, sequence, "window archived more than once");
            format!("archive-{label}#{sequence}")
        };

        let partition = Partition {
            window_start,
            sequence,
            name,
            records: records.into_boxed_slice(),
        };
        let summary = partition.summary();
        debug!(name = %summary.name, count = summary.count, "created partition");
        self.partitions.push(Arc::new(partition));
        summary
    }

    /// Exact k-nearest scan over every partition of `target_window`.
    pub fn query_vectors(
        &self,
        query: &[f32],
        target_window: WindowStart,
        k: usize,
    ) -> Result<ArchiveLookup> {
        check_k(k)?;

        let mut found = false;
        let mut hits = Vec::new();
        for partition in self.partitions_for(target_window) {
            found = true;
            for record in partition.records() {
                check_dimension(record.dimension(), query)?;
                hits.push(record.to_hit(l2_distance(query, &record.embedding)));
            }
        }
        if !found {
            return Ok(ArchiveLookup::WindowNotArchived);
        }

        rank_hits(&mut hits);
        hits.truncate(k);
        Ok(ArchiveLookup::Hits(hits))
    }

    /// Partitions of one window, oldest first.
    pub fn partitions_for(
        &self,
        window_start: WindowStart,
    ) -> impl Iterator<Item = &Arc<Partition>> + '_ {
        self.partitions
            .iter()
            .filter(move |p| p.window_start == window_start)
    }

    /// All partitions in creation order.
    pub fn partitions(&self) -> &[Arc<Partition>] {
        &self.partitions
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn record_count(&self) -> usize {
        self.partitions.iter().map(|p| p.len()).sum()
    }

    /// Distinct archived windows.
    pub fn windows(&self) -> BTreeSet<WindowStart> {
        self.partitions.iter().map(|p| p.window_start).collect()
    }

    pub fn contains_window(&self, window_start: WindowStart) -> bool {
        self.partitions_for(window_start).next().is_some()
    }
}
