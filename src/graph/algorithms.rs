//! Shortest-path traversals.
//!
//! Both the breadth-first (hop count) and Dijkstra (weighted) variants
//! record the full shortest-path DAG: settle order, path counts and all
//! predecessors on equally short paths. Self-loops never appear here since
//! the adjacency they walk is loop-free.

use super::Network;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

/// Single-source shortest-path DAG
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    /// Source position
    pub source: usize,
    /// Settled nodes in non-decreasing distance order (source first)
    pub order: Vec<usize>,
    /// Distance from the source, `None` when unreachable
    pub distance: Vec<Option<f64>>,
    /// Number of distinct shortest paths from the source
    pub sigma: Vec<f64>,
    /// Predecessors on shortest paths
    pub predecessors: Vec<Vec<usize>>,
}

impl ShortestPathTree {
    fn empty(n: usize, source: usize) -> Self {
        let mut distance = vec![None; n];
        let mut sigma = vec![0.0; n];
        distance[source] = Some(0.0);
        sigma[source] = 1.0;
        Self {
            source,
            order: Vec::with_capacity(n),
            distance,
            sigma,
            predecessors: vec![Vec::new(); n],
        }
    }

    /// Reachable targets other than the source, with their distance
    pub fn reached(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.order
            .iter()
            .filter(move |&&v| v != self.source)
            .filter_map(move |&v| self.distance[v].map(|d| (v, d)))
    }
}

/// Build the shortest-path DAG from `source`, following edge orientation
pub fn shortest_path_tree(network: &Network, source: usize, weighted: bool) -> ShortestPathTree {
    if weighted {
        dijkstra(network, source)
    } else {
        breadth_first(network, source)
    }
}

/// Distances from `source` to every node (`None` when unreachable)
pub fn distances_from(network: &Network, source: usize, weighted: bool) -> Vec<Option<f64>> {
    shortest_path_tree(network, source, weighted).distance
}

fn breadth_first(network: &Network, source: usize) -> ShortestPathTree {
    let mut tree = ShortestPathTree::empty(network.node_count(), source);
    let mut queue = VecDeque::new();
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        tree.order.push(v);
        let next = tree.distance[v].unwrap_or_default() + 1.0;

        for link in network.successors(v) {
            let w = link.target;
            if tree.distance[w].is_none() {
                tree.distance[w] = Some(next);
                queue.push_back(w);
            }
            if tree.distance[w] == Some(next) {
                tree.sigma[w] += tree.sigma[v];
                tree.predecessors[w].push(v);
            }
        }
    }

    tree
}

/// Dijkstra distances, then path counts over the tight-edge DAG.
///
/// Path counts are accumulated only once distances are final, in a
/// topological order of the tight edges (`d(v) + w(v, u) == d(u)`), so a
/// zero-weight edge between two nodes at the same distance still carries
/// its paths forward.
fn dijkstra(network: &Network, source: usize) -> ShortestPathTree {
    let n = network.node_count();
    let (distance, settled) = settle(network, source);

    let mut rank = vec![usize::MAX; n];
    for (r, &v) in settled.iter().enumerate() {
        rank[v] = r;
    }

    let mut tight_in: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut tight_out: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &v in &settled {
        let Some(dv) = distance[v] else { continue };
        for link in network.successors(v) {
            let w = link.target;
            if w != source && distance[w] == Some(dv + link.weight) {
                tight_in[w].push(v);
                tight_out[v].push(w);
            }
        }
    }

    let mut tree = ShortestPathTree::empty(n, source);
    tree.distance = distance;
    let mut waiting: Vec<usize> = tight_in.iter().map(Vec::len).collect();
    let mut emitted = vec![false; n];
    let mut ready = BinaryHeap::new();
    ready.push(Reverse((OrderedFloat(0.0), rank[source], source)));
    let mut cursor = 0;

    loop {
        let v = match ready.pop() {
            Some(Reverse((_, _, v))) => v,
            None => {
                // Only a zero-weight cycle leaves nodes waiting here
                while cursor < settled.len() && emitted[settled[cursor]] {
                    cursor += 1;
                }
                match settled.get(cursor) {
                    Some(&v) => v,
                    None => break,
                }
            }
        };
        if emitted[v] {
            continue;
        }
        emitted[v] = true;

        if v != source {
            let predecessors: Vec<usize> =
                tight_in[v].iter().copied().filter(|&p| emitted[p]).collect();
            tree.sigma[v] = predecessors.iter().map(|&p| tree.sigma[p]).sum();
            tree.predecessors[v] = predecessors;
        }
        tree.order.push(v);

        for &w in &tight_out[v] {
            waiting[w] -= 1;
            if waiting[w] == 0 && !emitted[w] {
                let dw = tree.distance[w].unwrap_or_default();
                ready.push(Reverse((OrderedFloat(dw), rank[w], w)));
            }
        }
    }

    tree
}

/// Plain Dijkstra: final distances and the settle order
fn settle(network: &Network, source: usize) -> (Vec<Option<f64>>, Vec<usize>) {
    let n = network.node_count();
    let mut tentative: Vec<Option<f64>> = vec![None; n];
    let mut distance: Vec<Option<f64>> = vec![None; n];
    let mut order = Vec::with_capacity(n);
    tentative[source] = Some(0.0);

    let mut heap = BinaryHeap::new();
    heap.push(Reverse((OrderedFloat(0.0), source)));

    while let Some(Reverse((OrderedFloat(d), v))) = heap.pop() {
        if distance[v].is_some() {
            continue;
        }
        distance[v] = Some(d);
        order.push(v);

        for link in network.successors(v) {
            let w = link.target;
            if distance[w].is_some() {
                continue;
            }
            let candidate = d + link.weight;
            if tentative[w].map_or(true, |current| candidate < current) {
                tentative[w] = Some(candidate);
                heap.push(Reverse((OrderedFloat(candidate), w)));
            }
        }
    }

    (distance, order)
}
