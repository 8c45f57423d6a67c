//! Node-link JSON documents.
//!
//! The layout is `{"directed", "multigraph", "nodes": [{"id"}], "links":
//! [{"source", "target", "weight"}]}`; `edges` is accepted for `links`.

use super::NODE_LINK_FILE;
use crate::error::IngestError;
use crate::graph::{GraphKind, Network, NetworkBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// File name of the node → index map written next to a node-link graph
pub const ID2IDX_FILE: &str = "id2idx.json";

/// Serialized node-link graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkGraph {
    pub directed: bool,
    #[serde(default)]
    pub multigraph: bool,
    pub nodes: Vec<NodeEntry>,
    #[serde(alias = "edges", default)]
    pub links: Vec<LinkEntry>,
}

/// A node record; ids may be strings or numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub id: Value,
}

/// A link record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub source: Value,
    pub target: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Node label of an id value; `section` and `index` locate the entry
fn label(value: &Value, section: &'static str, index: usize) -> Result<String, IngestError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(IngestError::MalformedEntry {
            section,
            index,
            reason: format!("node id must be a string or a number, found {}", other),
        }),
    }
}

impl NodeLinkGraph {
    /// Snapshot a network; node order and raw edges are preserved
    pub fn from_network(network: &Network) -> Self {
        let nodes = network
            .nodes()
            .map(|id| NodeEntry {
                id: Value::String(id.to_string()),
            })
            .collect();
        let links = network
            .edges()
            .map(|(s, t, w)| LinkEntry {
                source: Value::String(s.to_string()),
                target: Value::String(t.to_string()),
                weight: Some(w),
            })
            .collect();

        let mut seen = std::collections::HashSet::new();
        let multigraph = network.edge_positions().any(|(s, t, _)| {
            let key = if network.is_directed() || s <= t { (s, t) } else { (t, s) };
            !seen.insert(key)
        });

        Self {
            directed: network.is_directed(),
            multigraph,
            nodes,
            links,
        }
    }

    /// Build a network; node ids must be unique and links must reference them
    pub fn into_network(self, id: &str) -> Result<Network, IngestError> {
        let mut builder = NetworkBuilder::new(id, GraphKind::from_directed(self.directed));

        for (i, node) in self.nodes.iter().enumerate() {
            builder.add_node(label(&node.id, "node", i)?)?;
        }
        for (i, link) in self.links.iter().enumerate() {
            let source = label(&link.source, "link", i)?;
            let target = label(&link.target, "link", i)?;
            builder.add_edge(&source, &target, link.weight)?;
        }

        Ok(builder.build())
    }
}

/// Parse a node-link document.
///
/// The document carries its own orientation. Duplicate node ids and links
/// to unknown nodes are graph errors, not malformed rows.
pub fn parse_node_link<R: Read>(id: &str, reader: R) -> Result<Network, IngestError> {
    let document: NodeLinkGraph = serde_json::from_reader(reader)?;
    document.into_network(id)
}

/// Write `G.json` and `id2idx.json` for a network into `dir`
pub fn write_node_link(network: &Network, dir: &Path) -> Result<(), IngestError> {
    fs::create_dir_all(dir)?;

    let graph = NodeLinkGraph::from_network(network);
    let mut writer = BufWriter::new(fs::File::create(dir.join(NODE_LINK_FILE))?);
    serde_json::to_writer(&mut writer, &graph)?;
    writer.flush()?;

    let id2idx: BTreeMap<&str, usize> = network.nodes().enumerate().map(|(i, n)| (n, i)).collect();
    let mut writer = BufWriter::new(fs::File::create(dir.join(ID2IDX_FILE))?);
    serde_json::to_writer(&mut writer, &id2idx)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use std::io::Cursor;
    use tempfile::tempdir;

    const DOC: &str = r#"{
        "directed": false,
        "multigraph": false,
        "graph": {},
        "nodes": [{"id": "A"}, {"id": "B"}, {"id": 3}],
        "links": [
            {"source": "A", "target": "B", "weight": 0.5},
            {"source": "B", "target": 3}
        ]
    }"#;

    #[test]
    fn test_parse_mixed_ids() {
        let net = parse_node_link("doc", Cursor::new(DOC)).unwrap();

        assert!(!net.is_directed());
        let nodes: Vec<&str> = net.nodes().collect();
        assert_eq!(nodes, vec!["A", "B", "3"]);
        let weights: Vec<f64> = net.edges().map(|(_, _, w)| w).collect();
        assert_eq!(weights, vec![0.5, 1.0]);
    }

    #[test]
    fn test_edges_alias() {
        let doc = r#"{"directed": true, "nodes": [{"id": "x"}, {"id": "y"}],
                      "edges": [{"source": "x", "target": "y"}]}"#;
        let net = parse_node_link("alias", Cursor::new(doc)).unwrap();
        assert!(net.is_directed());
        assert_eq!(net.edge_count(), 1);
    }

    #[test]
    fn test_unknown_endpoint_is_graph_error() {
        let doc = r#"{"directed": false, "nodes": [{"id": "A"}],
                      "links": [{"source": "A", "target": "Z"}]}"#;
        let err = parse_node_link("bad", Cursor::new(doc)).unwrap_err();
        assert!(matches!(err, IngestError::Graph(GraphError::UnknownNode(_))));
    }

    #[test]
    fn test_duplicate_node_is_graph_error() {
        let doc = r#"{"directed": false, "nodes": [{"id": "A"}, {"id": "A"}], "links": []}"#;
        let err = parse_node_link("dup", Cursor::new(doc)).unwrap_err();
        assert!(matches!(err, IngestError::Graph(GraphError::DuplicateNode(_))));
    }

    #[test]
    fn test_bad_node_id_names_its_entry() {
        let doc = r#"{"directed": false, "nodes": [{"id": "A"}, {"id": true}], "links": []}"#;
        let err = parse_node_link("bad", Cursor::new(doc)).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MalformedEntry {
                section: "node",
                index: 1,
                ..
            }
        ));

        let doc = r#"{"directed": false, "nodes": [{"id": "A"}],
                      "links": [{"source": "A", "target": "A"}, {"source": null, "target": "A"}]}"#;
        let err = parse_node_link("bad", Cursor::new(doc)).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MalformedEntry {
                section: "link",
                index: 1,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "malformed link entry #1: node id must be a string or a number, found null"
        );
    }

    #[test]
    fn test_write_then_reload() {
        let original = parse_node_link("doc", Cursor::new(DOC)).unwrap();
        let dir = tempdir().unwrap();
        write_node_link(&original, dir.path()).unwrap();

        let reloaded =
            parse_node_link("doc", fs::File::open(dir.path().join(NODE_LINK_FILE)).unwrap())
                .unwrap();
        assert_eq!(reloaded.node_count(), 3);
        assert_eq!(reloaded.edge_count(), 2);

        let id2idx: BTreeMap<String, usize> = serde_json::from_reader(
            fs::File::open(dir.path().join(ID2IDX_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(id2idx["3"], 2);
    }
}
