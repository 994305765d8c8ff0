//! Neighbor selection and edge maintenance during insertion.
//!
//! Edges are kept symmetric: whenever a record drops a neighbor while
//! shrinking an over-full list, the dropped record loses the back-edge too.

use super::graph::NodeMap;
use crate::distance::l2_distance;
use crate::record::RecordId;

/// Select the `m` nearest candidates.
///
/// Pure distance ranking. No diversity heuristic (RND/MOND) is applied, which
/// keeps the connectivity characteristics of the simple greedy scheme.
pub(crate) fn select_neighbors(candidates: &[(RecordId, f32)], m: usize) -> Vec<RecordId> {
    let mut sorted: Vec<(RecordId, f32)> = candidates.to_vec();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    sorted.dedup_by_key(|(id, _)| *id);
    sorted.into_iter().take(m).map(|(id, _)| id).collect()
}

/// Link `id` to every record in `selected` at `layer`, in both directions.
///
/// Any neighbor pushed above `m` edges is shrunk back to its `m` nearest.
pub(crate) fn connect_layer(
    nodes: &mut NodeMap,
    id: RecordId,
    selected: &[RecordId],
    layer: usize,
    m: usize,
) {
    for &neighbor_id in selected {
        if neighbor_id == id {
            continue;
        }
        add_edge(nodes, id, neighbor_id, layer);
        add_edge(nodes, neighbor_id, id, layer);

        let over_full = nodes
            .get(&neighbor_id)
            .and_then(|n| n.neighbors.get(layer))
            .is_some_and(|list| list.len() > m);
        if over_full {
            shrink_neighbors(nodes, neighbor_id, layer, m);
        }
    }
}

fn add_edge(nodes: &mut NodeMap, from: RecordId, to: RecordId, layer: usize) {
    if let Some(list) = nodes.get_mut(&from).and_then(|n| n.neighbors.get_mut(layer)) {
        if !list.contains(&to) {
            list.push(to);
        }
    }
}

fn remove_edge(nodes: &mut NodeMap, from: RecordId, to: RecordId, layer: usize) {
    if let Some(list) = nodes.get_mut(&from).and_then(|n| n.neighbors.get_mut(layer)) {
        list.retain(|other| *other != to);
    }
}

/// Keep the `m` nearest neighbors of `owner` at `layer`; unlink the rest.
pub(crate) fn shrink_neighbors(nodes: &mut NodeMap, owner: RecordId, layer: usize, m: usize) {
    let mut ranked: Vec<(RecordId, f32)> = {
        let Some(node) = nodes.get(&owner) else {
            return;
        };
        let Some(list) = node.neighbors.get(layer) else {
            return;
        };
        list.iter()
            .filter_map(|&other| {
                nodes
                    .get(&other)
                    .map(|n| (other, l2_distance(&node.record.embedding, &n.record.embedding)))
            })
            .collect()
    };

    ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    let dropped: Vec<RecordId> = ranked.iter().skip(m).map(|(id, _)| *id).collect();
    ranked.truncate(m);

    if let Some(list) = nodes.get_mut(&owner).and_then(|n| n.neighbors.get_mut(layer)) {
        *list = ranked.iter().map(|(id, _)| *id).collect();
    }
    for other in dropped {
        remove_edge(nodes, other, owner, layer);
    }
}
