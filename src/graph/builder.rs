//! Validated construction of networks.

use super::types::{EdgeWeight, GraphKind, Network, NodeId};
use crate::error::GraphError;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Default weight for edges without one
pub const DEFAULT_WEIGHT: EdgeWeight = 1.0;

/// Builder for constructing networks.
///
/// The builder is the only way to obtain a `Network`; it enforces that every
/// edge endpoint exists and that weights are finite and non-negative.
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    id: String,
    kind: GraphKind,
    graph: DiGraph<NodeId, EdgeWeight>,
    index: HashMap<NodeId, NodeIndex>,
}

impl NetworkBuilder {
    /// Create an empty builder
    pub fn new(id: impl Into<String>, kind: GraphKind) -> Self {
        Self {
            id: id.into(),
            kind,
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Identifier of the network being built
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of nodes added so far
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Add a node; adding the same identifier twice is an error
    pub fn add_node(&mut self, id: impl Into<String>) -> Result<usize, GraphError> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        Ok(self.insert(id))
    }

    /// Add a node if it is not present yet and return its position
    pub fn ensure_node(&mut self, id: &str) -> usize {
        match self.index.get(id) {
            Some(idx) => idx.index(),
            None => self.insert(id.to_string()),
        }
    }

    fn insert(&mut self, id: String) -> usize {
        let idx = self.graph.add_node(id.clone());
        self.index.insert(id, idx);
        idx.index()
    }

    /// Add an edge between two existing nodes
    pub fn add_edge(
        &mut self,
        from: &str,
        to: &str,
        weight: Option<EdgeWeight>,
    ) -> Result<(), GraphError> {
        let weight = weight.unwrap_or(DEFAULT_WEIGHT);
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidWeight {
                from: from.to_string(),
                to: to.to_string(),
                weight,
            });
        }

        let a = *self
            .index
            .get(from)
            .ok_or_else(|| GraphError::UnknownNode(from.to_string()))?;
        let b = *self
            .index
            .get(to)
            .ok_or_else(|| GraphError::UnknownNode(to.to_string()))?;

        self.graph.add_edge(a, b, weight);
        Ok(())
    }

    /// Add an edge, creating missing endpoints (edge-list semantics)
    pub fn add_weighted_edge_auto(
        &mut self,
        from: &str,
        to: &str,
        weight: Option<EdgeWeight>,
    ) -> Result<(), GraphError> {
        self.ensure_node(from);
        self.ensure_node(to);
        self.add_edge(from, to, weight)
    }

    /// Finish construction
    pub fn build(self) -> Network {
        Network::from_parts(self.id, self.kind, self.graph, self.index)
    }

    /// Build an unweighted network from `(from, to)` pairs
    pub fn from_edges(
        id: impl Into<String>,
        kind: GraphKind,
        edges: &[(&str, &str)],
    ) -> Result<Network, GraphError> {
        let mut builder = Self::new(id, kind);
        for (from, to) in edges {
            builder.add_weighted_edge_auto(from, to, None)?;
        }
        Ok(builder.build())
    }

    /// Build a weighted network from `(from, to, weight)` triples
    pub fn from_weighted_edges(
        id: impl Into<String>,
        kind: GraphKind,
        edges: &[(&str, &str, EdgeWeight)],
    ) -> Result<Network, GraphError> {
        let mut builder = Self::new(id, kind);
        for (from, to, weight) in edges {
            builder.add_weighted_edge_auto(from, to, Some(*weight))?;
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_node_rejected() {
        let mut builder = NetworkBuilder::new("dup", GraphKind::Undirected);
        builder.add_node("A").unwrap();

        assert_eq!(
            builder.add_node("A"),
            Err(GraphError::DuplicateNode("A".to_string()))
        );
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let mut builder = NetworkBuilder::new("unknown", GraphKind::Directed);
        builder.add_node("A").unwrap();

        let err = builder.add_edge("A", "B", None).unwrap_err();
        assert_eq!(err, GraphError::UnknownNode("B".to_string()));
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let mut builder = NetworkBuilder::new("w", GraphKind::Undirected);
        builder.add_node("A").unwrap();
        builder.add_node("B").unwrap();

        assert!(builder.add_edge("A", "B", Some(-1.0)).is_err());
        assert!(builder.add_edge("A", "B", Some(f64::NAN)).is_err());
        assert!(builder.add_edge("A", "B", Some(0.0)).is_ok());
    }

    #[test]
    fn test_default_weight() {
        let net = NetworkBuilder::from_edges("d", GraphKind::Undirected, &[("A", "B")]).unwrap();
        let (_, _, w) = net.edges().next().unwrap();
        assert_eq!(w, DEFAULT_WEIGHT);
    }

    #[test]
    fn test_node_order_is_insertion_order() {
        let net = NetworkBuilder::from_edges(
            "o",
            GraphKind::Undirected,
            &[("z", "a"), ("m", "z")],
        )
        .unwrap();
        let nodes: Vec<&str> = net.nodes().collect();
        assert_eq!(nodes, vec!["z", "a", "m"]);
    }
}
