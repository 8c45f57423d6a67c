//! Core graph types.

use crate::error::GraphError;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a node as it appears in the source data
pub type NodeId = String;

/// Weight of an edge (non-negative, defaults to 1.0)
pub type EdgeWeight = f64;

/// Orientation of a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    /// Edges are unordered pairs
    Undirected,
    /// Edges are ordered pairs
    Directed,
}

impl GraphKind {
    /// Kind from a `directed` flag
    pub fn from_directed(directed: bool) -> Self {
        if directed {
            GraphKind::Directed
        } else {
            GraphKind::Undirected
        }
    }

    /// True for directed networks
    pub fn is_directed(self) -> bool {
        matches!(self, GraphKind::Directed)
    }
}

impl std::fmt::Display for GraphKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphKind::Undirected => write!(f, "undirected"),
            GraphKind::Directed => write!(f, "directed"),
        }
    }
}

/// A collapsed adjacency entry.
///
/// Parallel edges between the same ordered pair are merged into one link;
/// `weight` keeps the minimum (used for shortest paths) and `total` the sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Position of the neighbor in the node order
    pub target: usize,
    /// Minimum weight among the merged edges
    pub weight: EdgeWeight,
    /// Sum of the weights of the merged edges
    pub total: EdgeWeight,
}

/// Loop-free, parallel-free neighbor lists sorted by target position
#[derive(Debug, Clone, Default)]
struct Adjacency {
    successors: Vec<Vec<Link>>,
    predecessors: Vec<Vec<Link>>,
    /// Underlying simple undirected neighbor sets
    simple: Vec<Vec<usize>>,
}

impl Adjacency {
    fn build(graph: &DiGraph<NodeId, EdgeWeight>, kind: GraphKind) -> Self {
        let n = graph.node_count();
        let mut successors: Vec<Vec<Link>> = vec![Vec::new(); n];
        let mut predecessors: Vec<Vec<Link>> = vec![Vec::new(); n];

        for edge in graph.edge_references() {
            let (s, t) = (edge.source().index(), edge.target().index());
            if s == t {
                continue;
            }
            let w = *edge.weight();
            let link = |target| Link {
                target,
                weight: w,
                total: w,
            };
            successors[s].push(link(t));
            predecessors[t].push(link(s));
            if !kind.is_directed() {
                successors[t].push(link(s));
                predecessors[s].push(link(t));
            }
        }

        let successors: Vec<Vec<Link>> = successors.into_iter().map(collapse).collect();
        let predecessors: Vec<Vec<Link>> = predecessors.into_iter().map(collapse).collect();

        let simple = (0..n)
            .map(|i| {
                let mut neighbors: Vec<usize> = successors[i]
                    .iter()
                    .chain(predecessors[i].iter())
                    .map(|l| l.target)
                    .collect();
                neighbors.sort_unstable();
                neighbors.dedup();
                neighbors
            })
            .collect();

        Self {
            successors,
            predecessors,
            simple,
        }
    }
}

/// Sort links by target and merge parallel ones
fn collapse(mut links: Vec<Link>) -> Vec<Link> {
    links.sort_by_key(|l| l.target);
    let mut merged: Vec<Link> = Vec::with_capacity(links.len());
    for link in links {
        match merged.last_mut() {
            Some(last) if last.target == link.target => {
                last.weight = last.weight.min(link.weight);
                last.total += link.total;
            }
            _ => merged.push(link),
        }
    }
    merged
}

/// An immutable network handed to the measure engine.
///
/// Nodes keep the order in which they were added; every per-node vector in
/// the crate is indexed by that position.
#[derive(Debug, Clone)]
pub struct Network {
    id: String,
    kind: GraphKind,
    graph: DiGraph<NodeId, EdgeWeight>,
    index: HashMap<NodeId, NodeIndex>,
    adjacency: Adjacency,
}

impl Network {
    pub(crate) fn from_parts(
        id: String,
        kind: GraphKind,
        graph: DiGraph<NodeId, EdgeWeight>,
        index: HashMap<NodeId, NodeIndex>,
    ) -> Self {
        let adjacency = Adjacency::build(&graph, kind);
        Self {
            id,
            kind,
            graph,
            index,
            adjacency,
        }
    }

    /// Network identifier (usually the source file stem)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Orientation flag
    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// True for directed networks
    pub fn is_directed(&self) -> bool {
        self.kind.is_directed()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges as ingested (self-loops and parallel edges included)
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of distinct non-loop node pairs joined by at least one edge
    pub fn simple_edge_count(&self) -> usize {
        let arcs: usize = self.adjacency.successors.iter().map(Vec::len).sum();
        if self.is_directed() {
            arcs
        } else {
            arcs / 2
        }
    }

    /// Identifier of the node at `position`
    pub fn node(&self, position: usize) -> &str {
        &self.graph[NodeIndex::new(position)]
    }

    /// Node identifiers in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    /// Position of a node identifier
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).map(|idx| idx.index())
    }

    /// Check whether a node exists
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Raw edges as `(source, target, weight)` positions
    pub fn edge_positions(&self) -> impl Iterator<Item = (usize, usize, EdgeWeight)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
    }

    /// Raw edges as `(source, target, weight)` identifiers
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, EdgeWeight)> + '_ {
        self.edge_positions()
            .map(move |(s, t, w)| (self.node(s), self.node(t), w))
    }

    /// Outgoing links (all incident links for undirected networks)
    pub fn successors(&self, position: usize) -> &[Link] {
        &self.adjacency.successors[position]
    }

    /// Incoming links (all incident links for undirected networks)
    pub fn predecessors(&self, position: usize) -> &[Link] {
        &self.adjacency.predecessors[position]
    }

    /// Neighbors in the underlying simple undirected graph, sorted
    pub fn simple_neighbors(&self, position: usize) -> &[usize] {
        &self.adjacency.simple[position]
    }

    /// Whether two distinct nodes are adjacent, ignoring direction
    pub fn adjacent(&self, a: usize, b: usize) -> bool {
        self.adjacency.simple[a].binary_search(&b).is_ok()
    }

    /// Summed weight between two nodes, ignoring direction.
    ///
    /// Directed networks add up both orientations. `None` when not adjacent.
    pub fn pair_weight(&self, a: usize, b: usize) -> Option<EdgeWeight> {
        let total = |from: usize, to: usize| {
            let links = &self.adjacency.successors[from];
            links
                .binary_search_by_key(&to, |link| link.target)
                .ok()
                .map(|i| links[i].total)
        };
        if !self.is_directed() {
            return total(a, b);
        }
        match (total(a, b), total(b, a)) {
            (None, None) => None,
            (forward, backward) => Some(forward.unwrap_or(0.0) + backward.unwrap_or(0.0)),
        }
    }

    /// Out-degree counting every edge (undirected: total degree)
    pub fn out_degree(&self, position: usize) -> usize {
        if !self.is_directed() {
            return self.degree(position);
        }
        self.graph
            .edges_directed(NodeIndex::new(position), petgraph::Direction::Outgoing)
            .count()
    }

    /// In-degree counting every edge (undirected: total degree)
    pub fn in_degree(&self, position: usize) -> usize {
        if !self.is_directed() {
            return self.degree(position);
        }
        self.graph
            .edges_directed(NodeIndex::new(position), petgraph::Direction::Incoming)
            .count()
    }

    /// Total degree; a self-loop contributes 2
    pub fn degree(&self, position: usize) -> usize {
        let idx = NodeIndex::new(position);
        self.graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .count()
            + self
                .graph
                .edges_directed(idx, petgraph::Direction::Incoming)
                .count()
    }

    /// Weighted degree; a self-loop contributes twice its weight
    pub fn strength(&self, position: usize) -> f64 {
        let idx = NodeIndex::new(position);
        let out: f64 = self
            .graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .map(|e| *e.weight())
            .sum();
        let inc: f64 = self
            .graph
            .edges_directed(idx, petgraph::Direction::Incoming)
            .map(|e| *e.weight())
            .sum();
        out + inc
    }

    /// Weakly connected components.
    ///
    /// Members are sorted by position; components are ordered by size
    /// (largest first), ties broken by their smallest member.
    pub fn weak_components(&self) -> Vec<Vec<usize>> {
        let n = self.node_count();
        let mut sets = UnionFind::<usize>::new(n);
        for (s, t, _) in self.edge_positions() {
            sets.union(s, t);
        }

        let mut by_root: HashMap<usize, Vec<usize>> = HashMap::new();
        for position in 0..n {
            by_root.entry(sets.find(position)).or_default().push(position);
        }
        order_components(by_root.into_values().collect())
    }

    /// Strongly connected components (weak components for undirected networks)
    pub fn strong_components(&self) -> Vec<Vec<usize>> {
        if !self.is_directed() {
            return self.weak_components();
        }
        let components = tarjan_scc(&self.graph)
            .into_iter()
            .map(|component| {
                let mut members: Vec<usize> = component.into_iter().map(|i| i.index()).collect();
                members.sort_unstable();
                members
            })
            .collect();
        order_components(components)
    }

    /// Check the graph invariants
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.index.len() != self.node_count() {
            let mut seen = std::collections::HashSet::new();
            for id in self.nodes() {
                if !seen.insert(id) {
                    return Err(GraphError::DuplicateNode(id.to_string()));
                }
            }
        }

        for (id, idx) in &self.index {
            match self.graph.node_weight(*idx) {
                Some(stored) if stored == id => {}
                _ => return Err(GraphError::UnknownNode(id.clone())),
            }
        }

        for (from, to, weight) in self.edges() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(GraphError::InvalidWeight {
                    from: from.to_string(),
                    to: to.to_string(),
                    weight,
                });
            }
        }

        Ok(())
    }
}

fn order_components(mut components: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    for component in &mut components {
        component.sort_unstable();
    }
    components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NetworkBuilder;

    fn triangle_with_tail(kind: GraphKind) -> Network {
        NetworkBuilder::from_edges("t", kind, &[("A", "B"), ("B", "C"), ("A", "C"), ("C", "D")])
            .unwrap()
    }

    #[test]
    fn test_graph_operations() {
        let net = triangle_with_tail(GraphKind::Undirected);

        assert_eq!(net.node_count(), 4);
        assert_eq!(net.edge_count(), 4);
        assert_eq!(net.simple_edge_count(), 4);
        assert!(net.adjacent(0, 1));
        assert!(!net.adjacent(0, 3));
        assert_eq!(net.degree(2), 3);
        assert_eq!(net.simple_neighbors(2), &[0, 1, 3]);
    }

    #[test]
    fn test_directed_degrees() {
        let net = triangle_with_tail(GraphKind::Directed);
        let c = net.position("C").unwrap();

        assert_eq!(net.in_degree(c), 2);
        assert_eq!(net.out_degree(c), 1);
        assert_eq!(net.degree(c), 3);
        assert_eq!(net.successors(c).len(), 1);
        assert_eq!(net.predecessors(c).len(), 2);
    }

    #[test]
    fn test_self_loop_and_parallel_edges() {
        let net = NetworkBuilder::from_weighted_edges(
            "multi",
            GraphKind::Undirected,
            &[("A", "A", 1.0), ("A", "B", 3.0), ("A", "B", 2.0)],
        )
        .unwrap();

        assert_eq!(net.edge_count(), 3);
        assert_eq!(net.simple_edge_count(), 1);
        // loop counts twice
        assert_eq!(net.degree(0), 4);
        assert_eq!(net.strength(0), 7.0);

        let link = net.successors(0)[0];
        assert_eq!(link.target, 1);
        assert_eq!(link.weight, 2.0);
        assert_eq!(link.total, 5.0);
        assert_eq!(net.pair_weight(0, 1), Some(5.0));
        assert_eq!(net.pair_weight(1, 0), Some(5.0));
    }

    #[test]
    fn test_directed_pair_weight_sums_orientations() {
        let net = NetworkBuilder::from_weighted_edges(
            "pw",
            GraphKind::Directed,
            &[("A", "B", 2.0), ("B", "A", 3.0), ("B", "C", 1.0)],
        )
        .unwrap();

        assert_eq!(net.pair_weight(0, 1), Some(5.0));
        assert_eq!(net.pair_weight(2, 1), Some(1.0));
        assert_eq!(net.pair_weight(0, 2), None);
    }

    #[test]
    fn test_components() {
        let mut builder = NetworkBuilder::new("c", GraphKind::Directed);
        builder.add_weighted_edge_auto("A", "B", None).unwrap();
        builder.add_weighted_edge_auto("B", "A", None).unwrap();
        builder.add_weighted_edge_auto("B", "C", None).unwrap();
        builder.add_node("Z").unwrap();
        let net = builder.build();

        assert_eq!(net.weak_components(), vec![vec![0, 1, 2], vec![3]]);
        assert_eq!(net.strong_components(), vec![vec![0, 1], vec![2], vec![3]]);
    }

    #[test]
    fn test_validate_ok() {
        assert!(triangle_with_tail(GraphKind::Undirected).validate().is_ok());
    }
}
