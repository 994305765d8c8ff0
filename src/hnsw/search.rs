//! Bounded best-first search on a single layer.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use super::graph::NodeMap;
use crate::distance::l2_distance;
use crate::record::RecordId;

/// Candidate for the expansion frontier (min-heap: closest first).
#[derive(Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) id: RecordId,
    pub(crate) distance: f32,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smaller distance = higher priority
        // Use total_cmp for IEEE 754 total ordering (NaN-safe)
        self.distance
            .total_cmp(&other.distance)
            .then(self.id.cmp(&other.id))
            .reverse()
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Entry of the bounded result set (max-heap: worst on top).
#[derive(Clone, Copy, PartialEq)]
struct Furthest {
    id: RecordId,
    distance: f32,
}

impl Eq for Furthest {}

impl Ord for Furthest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Furthest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first search restricted to edges at `layer`.
///
/// `entry_points` are `(id, distance-to-query)` pairs already known to live on
/// `layer`. The result set is capped at `ef`; expansion stops once the nearest
/// unexpanded candidate is farther than the worst member of a full result set.
///
/// Returns up to `ef` `(id, distance)` pairs sorted ascending by distance.
pub(crate) fn search_layer(
    query: &[f32],
    entry_points: &[(RecordId, f32)],
    ef: usize,
    layer: usize,
    nodes: &NodeMap,
) -> Vec<(RecordId, f32)> {
    let ef = ef.max(1);
    let mut candidates: BinaryHeap<Candidate> = BinaryHeap::with_capacity(ef * 2);
    let mut results: BinaryHeap<Furthest> = BinaryHeap::with_capacity(ef + 1);
    let mut visited: HashSet<RecordId> = HashSet::with_capacity(ef * 2);

    for &(id, distance) in entry_points {
        if !visited.insert(id) {
            continue;
        }
        candidates.push(Candidate { id, distance });
        results.push(Furthest { id, distance });
        if results.len() > ef {
            results.pop();
        }
    }

    while let Some(candidate) = candidates.pop() {
        let worst = results.peek().map_or(f32::INFINITY, |r| r.distance);
        if results.len() >= ef && candidate.distance > worst {
            break;
        }

        let Some(node) = nodes.get(&candidate.id) else {
            continue;
        };
        let Some(neighbors) = node.neighbors.get(layer) else {
            continue;
        };

        for &neighbor_id in neighbors.iter() {
            if !visited.insert(neighbor_id) {
                continue;
            }
            let Some(neighbor) = nodes.get(&neighbor_id) else {
                continue;
            };
            let distance = l2_distance(query, &neighbor.record.embedding);

            let worst = results.peek().map_or(f32::INFINITY, |r| r.distance);
            if results.len() < ef || distance < worst {
                candidates.push(Candidate {
                    id: neighbor_id,
                    distance,
                });
                results.push(Furthest {
                    id: neighbor_id,
                    distance,
                });
                if results.len() > ef {
                    results.pop();
                }
            }
        }
    }

    let mut output: Vec<(RecordId, f32)> = results.into_iter().map(|r| (r.id, r.distance)).collect();
    output.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    output
}
