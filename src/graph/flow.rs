//! Node and edge connectivity by unit-capacity maximum flow.
//!
//! Both run over the collapsed adjacency, so parallel edges count once and
//! self-loops are ignored. Undirected links become a pair of opposite arcs.

use super::Network;
use std::collections::VecDeque;

/// Capacity of arcs that must never be part of a minimum cut
const UNBOUNDED: u32 = u32::MAX / 2;

/// Residual network; arc `e` and its reverse `e ^ 1` are stored side by side
#[derive(Debug, Clone)]
struct FlowNetwork {
    head: Vec<usize>,
    capacity: Vec<u32>,
    arcs: Vec<Vec<usize>>,
}

impl FlowNetwork {
    fn new(vertices: usize) -> Self {
        Self {
            head: Vec::new(),
            capacity: Vec::new(),
            arcs: vec![Vec::new(); vertices],
        }
    }

    fn add_arc(&mut self, from: usize, to: usize, capacity: u32) {
        self.arcs[from].push(self.head.len());
        self.head.push(to);
        self.capacity.push(capacity);
        self.arcs[to].push(self.head.len());
        self.head.push(from);
        self.capacity.push(0);
    }

    /// Maximum flow from `source` to `sink`, stopping once `cutoff` is routed
    fn max_flow(&self, source: usize, sink: usize, cutoff: usize) -> usize {
        let mut residual = self.capacity.clone();
        let mut flow = 0;

        while flow < cutoff {
            let mut via = vec![usize::MAX; self.arcs.len()];
            let mut seen = vec![false; self.arcs.len()];
            let mut queue = VecDeque::new();
            seen[source] = true;
            queue.push_back(source);

            while let Some(v) = queue.pop_front() {
                if v == sink {
                    break;
                }
                for &arc in &self.arcs[v] {
                    let w = self.head[arc];
                    if residual[arc] > 0 && !seen[w] {
                        seen[w] = true;
                        via[w] = arc;
                        queue.push_back(w);
                    }
                }
            }
            if !seen[sink] {
                break;
            }

            let mut bottleneck = (cutoff - flow).min(UNBOUNDED as usize) as u32;
            let mut v = sink;
            while v != source {
                let arc = via[v];
                bottleneck = bottleneck.min(residual[arc]);
                v = self.head[arc ^ 1];
            }

            let mut v = sink;
            while v != source {
                let arc = via[v];
                residual[arc] -= bottleneck;
                residual[arc ^ 1] += bottleneck;
                v = self.head[arc ^ 1];
            }
            flow += bottleneck as usize;
        }

        flow.min(cutoff)
    }
}

fn has_arc(network: &Network, from: usize, to: usize) -> bool {
    network
        .successors(from)
        .binary_search_by_key(&to, |link| link.target)
        .is_ok()
}

/// Smallest number of links leaving or entering any single node
fn degree_bound(network: &Network) -> usize {
    (0..network.node_count())
        .map(|v| {
            network
                .successors(v)
                .len()
                .min(network.predecessors(v).len())
        })
        .min()
        .unwrap_or(0)
}

fn weakly_connected(network: &Network) -> bool {
    network.weak_components().len() == 1
}

/// Minimum number of edges whose removal disconnects the network.
///
/// Directed networks must stay strongly connected. 0 for disconnected
/// networks and for fewer than two nodes.
pub fn edge_connectivity(network: &Network) -> usize {
    let n = network.node_count();
    if n < 2 || !weakly_connected(network) {
        return 0;
    }

    let mut flows = FlowNetwork::new(n);
    for v in 0..n {
        for link in network.successors(v) {
            flows.add_arc(v, link.target, 1);
        }
    }

    let mut best = degree_bound(network);
    for t in 1..n {
        if best == 0 {
            break;
        }
        best = best.min(flows.max_flow(0, t, best));
        if network.is_directed() && best > 0 {
            best = best.min(flows.max_flow(t, 0, best));
        }
    }
    best
}

/// Minimum number of nodes whose removal disconnects the network (or
/// leaves a single node).
///
/// Every node is split into an entry and an exit joined by a unit arc.
/// Only pairs around a minimum-degree node are queried: any minimum
/// separator either spares that node, cutting it from some non-neighbor,
/// or contains it, cutting two of its non-adjacent neighbors apart.
pub fn node_connectivity(network: &Network) -> usize {
    let n = network.node_count();
    if n < 2 || !weakly_connected(network) {
        return 0;
    }

    let entry = |v: usize| 2 * v;
    let exit = |v: usize| 2 * v + 1;

    let mut flows = FlowNetwork::new(2 * n);
    for v in 0..n {
        flows.add_arc(entry(v), exit(v), 1);
        for link in network.successors(v) {
            flows.add_arc(exit(v), entry(link.target), UNBOUNDED);
        }
    }

    let mut best = degree_bound(network).min(n - 1);
    let separate = |best: &mut usize, s: usize, t: usize| {
        if *best > 0 && !has_arc(network, s, t) {
            *best = (*best).min(flows.max_flow(exit(s), entry(t), *best));
        }
    };

    let pivot = (0..n)
        .min_by_key(|&v| network.successors(v).len() + network.predecessors(v).len())
        .unwrap_or(0);

    for w in (0..n).filter(|&w| w != pivot) {
        separate(&mut best, pivot, w);
        if network.is_directed() {
            separate(&mut best, w, pivot);
        }
    }

    let neighbors = network.simple_neighbors(pivot);
    for (i, &x) in neighbors.iter().enumerate() {
        for &y in &neighbors[i + 1..] {
            separate(&mut best, x, y);
            if network.is_directed() {
                separate(&mut best, y, x);
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphKind, NetworkBuilder};

    fn undirected(edges: &[(&str, &str)]) -> Network {
        NetworkBuilder::from_edges("u", GraphKind::Undirected, edges).unwrap()
    }

    #[test]
    fn test_cycle_and_path() {
        let cycle = undirected(&[("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")]);
        assert_eq!(node_connectivity(&cycle), 2);
        assert_eq!(edge_connectivity(&cycle), 2);

        let path = undirected(&[("A", "B"), ("B", "C"), ("C", "D")]);
        assert_eq!(node_connectivity(&path), 1);
        assert_eq!(edge_connectivity(&path), 1);
    }

    #[test]
    fn test_complete_graph() {
        let k4 = undirected(&[
            ("A", "B"),
            ("A", "C"),
            ("A", "D"),
            ("B", "C"),
            ("B", "D"),
            ("C", "D"),
        ]);
        assert_eq!(node_connectivity(&k4), 3);
        assert_eq!(edge_connectivity(&k4), 3);
    }

    #[test]
    fn test_bowtie_has_cut_node_but_two_edge_paths() {
        // Two triangles sharing C
        let bowtie = undirected(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "A"),
            ("C", "D"),
            ("D", "E"),
            ("E", "C"),
        ]);
        assert_eq!(node_connectivity(&bowtie), 1);
        assert_eq!(edge_connectivity(&bowtie), 2);
    }

    #[test]
    fn test_disconnected_is_zero() {
        let split = undirected(&[("A", "B"), ("X", "Y")]);
        assert_eq!(node_connectivity(&split), 0);
        assert_eq!(edge_connectivity(&split), 0);
    }

    #[test]
    fn test_directed_needs_strong_connectivity() {
        let ring = NetworkBuilder::from_edges(
            "ring",
            GraphKind::Directed,
            &[("A", "B"), ("B", "C"), ("C", "A")],
        )
        .unwrap();
        assert_eq!(node_connectivity(&ring), 1);
        assert_eq!(edge_connectivity(&ring), 1);

        let chain =
            NetworkBuilder::from_edges("chain", GraphKind::Directed, &[("A", "B"), ("B", "C")])
                .unwrap();
        assert_eq!(node_connectivity(&chain), 0);
        assert_eq!(edge_connectivity(&chain), 0);
    }

    #[test]
    fn test_parallel_edges_count_once() {
        let net = NetworkBuilder::from_weighted_edges(
            "multi",
            GraphKind::Undirected,
            &[("A", "B", 1.0), ("A", "B", 1.0), ("B", "C", 1.0)],
        )
        .unwrap();
        assert_eq!(edge_connectivity(&net), 1);
    }
}
