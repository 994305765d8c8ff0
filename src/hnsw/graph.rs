//! The layered graph index: live records, per-layer adjacency, entry point.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use smallvec::SmallVec;
use tracing::debug;

use super::construction::{connect_layer, select_neighbors};
use super::level::LevelSampler;
use super::params::HnswParams;
use super::search::search_layer;
use crate::distance::l2_distance;
use crate::error::{check_dimension, check_k, Result, RetrieveError};
use crate::record::{RecordId, SearchHit, Timestamp, VectorRecord};
use crate::window::{WindowStart, Windowing};

/// Neighbor ids of one record at one layer.
pub(crate) type Neighbors = SmallVec<[RecordId; 16]>;

/// Arena of live records keyed by id. Ids are assigned monotonically, so
/// iteration order is insertion order.
pub(crate) type NodeMap = BTreeMap<RecordId, GraphNode>;

/// A live record plus its adjacency on layers `0..=record.level`.
#[derive(Debug, Clone)]
pub(crate) struct GraphNode {
    pub(crate) record: VectorRecord,
    pub(crate) neighbors: Vec<Neighbors>,
}

impl GraphNode {
    pub(crate) fn new(record: VectorRecord) -> Self {
        let layers = record.level + 1;
        Self {
            record,
            neighbors: vec![Neighbors::new(); layers],
        }
    }
}

/// Mutable HNSW graph holding the hot tier.
///
/// All adjacency is stored as id lists inside the index; records never hold
/// references to each other. Edges are symmetric.
///
/// # Invariants
///
/// - every neighbor id names a live record, never the owner itself
/// - a record appears in another's list at layer `l` only if both levels are `>= l`
/// - lists hold at most `m0` ids on layer 0 and `m` ids above
/// - a non-empty index has an entry point whose level equals `max_level`,
///   and `max_level` is the highest level among live records
#[derive(Debug)]
pub struct LayeredGraphIndex {
    nodes: NodeMap,
    entry_point: Option<RecordId>,
    max_level: usize,
    dimension: Option<usize>,
    params: HnswParams,
    levels: LevelSampler,
}

impl LayeredGraphIndex {
    pub fn new(params: HnswParams, levels: LevelSampler) -> Self {
        Self {
            nodes: NodeMap::new(),
            entry_point: None,
            max_level: 0,
            dimension: None,
            params,
            levels,
        }
    }

    /// Index with a fixed embedding dimension.
    pub fn with_dimension(params: HnswParams, levels: LevelSampler, dimension: usize) -> Self {
        let mut index = Self::new(params, levels);
        index.dimension = Some(dimension);
        index
    }

    pub fn params(&self) -> &HnswParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Established embedding dimension, if any record has been inserted.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn entry_point(&self) -> Option<RecordId> {
        self.entry_point
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    pub fn get(&self, id: RecordId) -> Option<&VectorRecord> {
        self.nodes.get(&id).map(|n| &n.record)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Neighbor ids of `id` at `layer`, or `None` if the record is not live on that layer.
    pub fn neighbors(&self, id: RecordId, layer: usize) -> Option<&[RecordId]> {
        self.nodes
            .get(&id)
            .and_then(|n| n.neighbors.get(layer))
            .map(|list| list.as_slice())
    }

    /// Live records in id order.
    pub fn records(&self) -> impl Iterator<Item = &VectorRecord> {
        self.nodes.values().map(|n| &n.record)
    }

    /// Draw a level for a new record.
    pub fn sample_level(&mut self) -> usize {
        self.levels.sample()
    }

    /// Insert a record whose level has already been assigned.
    pub fn insert(&mut self, record: VectorRecord) -> Result<()> {
        let dimension = self.dimension.unwrap_or(record.dimension());
        check_dimension(dimension, &record.embedding)?;
        if record.level > self.params.max_level {
            return Err(RetrieveError::InvalidParameter(format!(
                "record level {} exceeds max_level {}",
                record.level, self.params.max_level
            )));
        }
        if self.nodes.contains_key(&record.id) {
            return Err(RetrieveError::DuplicateId(record.id));
        }
        self.dimension = Some(dimension);

        let id = record.id;
        let level = record.level;

        let Some(entry) = self.entry_point else {
            self.nodes.insert(id, GraphNode::new(record));
            self.entry_point = Some(id);
            self.max_level = level;
            debug!(id, level, "first record becomes entry point");
            return Ok(());
        };

        let query = record.embedding.clone();
        let mut entry_points = vec![(entry, self.distance_to(&query, entry))];

        // Coarse descent through layers the record will not occupy.
        for layer in ((level + 1)..=self.max_level).rev() {
            entry_points = search_layer(&query, &entry_points, 1, layer, &self.nodes);
        }

        let top = level.min(self.max_level);
        let mut selections: Vec<(usize, Vec<RecordId>)> = Vec::with_capacity(top + 1);
        for layer in (0..=top).rev() {
            let m = self.params.max_neighbors(layer);
            let candidates = search_layer(&query, &entry_points, m, layer, &self.nodes);
            selections.push((layer, select_neighbors(&candidates, m)));
            entry_points = candidates;
        }

        self.nodes.insert(id, GraphNode::new(record));
        for (layer, selected) in &selections {
            connect_layer(
                &mut self.nodes,
                id,
                selected,
                *layer,
                self.params.max_neighbors(*layer),
            );
        }

        if level > self.max_level {
            self.entry_point = Some(id);
            self.max_level = level;
            debug!(id, level, "new entry point");
        } else {
            debug!(id, level, "inserted");
        }
        Ok(())
    }

    /// k-nearest search with search width `ef` (raised to `k` if smaller).
    ///
    /// Returns hits ascending by distance; an empty index yields an empty list.
    pub fn search(&self, query: &[f32], k: usize, ef: usize) -> Result<Vec<SearchHit>> {
        check_k(k)?;
        if let Some(dimension) = self.dimension {
            check_dimension(dimension, query)?;
        } else if query.is_empty() {
            return Err(RetrieveError::EmptyQuery);
        }

        let Some(entry) = self.entry_point else {
            return Ok(Vec::new());
        };

        let mut entry_points = vec![(entry, self.distance_to(query, entry))];
        for layer in (1..=self.max_level).rev() {
            entry_points = search_layer(query, &entry_points, 1, layer, &self.nodes);
        }
        let found = search_layer(query, &entry_points, ef.max(k), 0, &self.nodes);

        Ok(found
            .into_iter()
            .take(k)
            .filter_map(|(id, distance)| self.nodes.get(&id).map(|n| n.record.to_hit(distance)))
            .collect())
    }

    /// Remove every record whose window is `<= threshold`.
    ///
    /// Returns the removed records in id order.
    pub fn remove_by_time_window(
        &mut self,
        threshold: WindowStart,
        windowing: &Windowing,
    ) -> Vec<VectorRecord> {
        self.remove_where(|record| windowing.window_of(record.timestamp) <= threshold)
    }

    /// Remove every record matching `predicate`, cleaning all references to it.
    ///
    /// Kept records lose edges to removed ones; if the entry point is removed
    /// the highest-level survivor (first in id order on ties) takes over.
    pub fn remove_where(
        &mut self,
        mut predicate: impl FnMut(&VectorRecord) -> bool,
    ) -> Vec<VectorRecord> {
        let removed_ids: HashSet<RecordId> = self
            .nodes
            .values()
            .filter(|n| predicate(&n.record))
            .map(|n| n.record.id)
            .collect();
        if removed_ids.is_empty() {
            return Vec::new();
        }

        let (removed, kept): (NodeMap, NodeMap) = std::mem::take(&mut self.nodes)
            .into_iter()
            .partition(|(id, _)| removed_ids.contains(id));
        self.nodes = kept;

        for node in self.nodes.values_mut() {
            for list in node.neighbors.iter_mut() {
                list.retain(|id| !removed_ids.contains(id));
            }
        }

        let entry_removed = self
            .entry_point
            .is_some_and(|entry| removed_ids.contains(&entry));
        if entry_removed {
            self.elect_entry_point();
        }

        debug!(
            removed = removed.len(),
            remaining = self.nodes.len(),
            entry_point = ?self.entry_point,
            "evicted records"
        );
        removed.into_values().map(|n| n.record).collect()
    }

    fn elect_entry_point(&mut self) {
        let mut best: Option<(RecordId, usize)> = None;
        for node in self.nodes.values() {
            if best.map_or(true, |(_, level)| node.record.level > level) {
                best = Some((node.record.id, node.record.level));
            }
        }
        self.entry_point = best.map(|(id, _)| id);
        self.max_level = best.map_or(0, |(_, level)| level);
    }

    fn distance_to(&self, query: &[f32], id: RecordId) -> f32 {
        debug_assert!(self.nodes.contains_key(&id), "entry point {id} is not live");
        self.nodes
            .get(&id)
            .map_or(f32::INFINITY, |n| l2_distance(query, &n.record.embedding))
    }

    /// Number of records present on each layer `0..=params.max_level`.
    pub fn per_layer_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.params.max_level + 1];
        for node in self.nodes.values() {
            for count in counts.iter_mut().take(node.record.level + 1) {
                *count += 1;
            }
        }
        counts
    }

    /// Number of live records in each window.
    pub fn per_window_counts(&self, windowing: &Windowing) -> BTreeMap<WindowStart, usize> {
        let mut counts = BTreeMap::new();
        for node in self.nodes.values() {
            *counts
                .entry(windowing.window_of(node.record.timestamp))
                .or_insert(0) += 1;
        }
        counts
    }

    /// Windows that currently have at least one live record.
    pub fn resident_windows(&self, windowing: &Windowing) -> BTreeSet<WindowStart> {
        self.nodes
            .values()
            .map(|n| windowing.window_of(n.record.timestamp))
            .collect()
    }

    /// Oldest live timestamp, if any.
    pub fn oldest_timestamp(&self) -> Option<Timestamp> {
        self.nodes.values().map(|n| n.record.timestamp).min()
    }

    /// Check every structural invariant, describing the first violation found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self.entry_point {
            None if !self.nodes.is_empty() => {
                return Err("non-empty index has no entry point".into());
            }
            None if self.max_level != 0 => {
                return Err(format!("empty index has max_level {}", self.max_level));
            }
            Some(entry) => {
                let Some(node) = self.nodes.get(&entry) else {
                    return Err(format!("entry point {entry} is not live"));
                };
                if node.record.level != self.max_level {
                    return Err(format!(
                        "entry point level {} != max_level {}",
                        node.record.level, self.max_level
                    ));
                }
            }
            None => {}
        }

        let highest = self.nodes.values().map(|n| n.record.level).max().unwrap_or(0);
        if highest != self.max_level {
            return Err(format!(
                "max_level {} but highest live level is {highest}",
                self.max_level
            ));
        }

        for (id, node) in &self.nodes {
            if node.neighbors.len() != node.record.level + 1 {
                return Err(format!(
                    "record {id} has {} neighbor layers for level {}",
                    node.neighbors.len(),
                    node.record.level
                ));
            }
            for (layer, list) in node.neighbors.iter().enumerate() {
                let bound = self.params.max_neighbors(layer);
                if list.len() > bound {
                    return Err(format!(
                        "record {id} has {} neighbors at layer {layer} (bound {bound})",
                        list.len()
                    ));
                }
                for other in list {
                    if other == id {
                        return Err(format!("record {id} references itself at layer {layer}"));
                    }
                    let Some(target) = self.nodes.get(other) else {
                        return Err(format!(
                            "record {id} references missing record {other} at layer {layer}"
                        ));
                    };
                    if target.record.level < layer {
                        return Err(format!(
                            "record {id} references {other} at layer {layer} above its level {}",
                            target.record.level
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
