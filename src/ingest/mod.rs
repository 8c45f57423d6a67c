//! Ingestion of source files into networks.
//!
//! Supported formats:
//! - whitespace edge lists (`.txt`, `.edgelist`, `.edgelist_weighted`)
//! - labelled adjacency matrices (`.csv`)
//! - node-link JSON (`.json`, or a directory holding `G.json` or `graph.json`)
//!
//! Malformed rows are rejected here, before a network reaches the engine.

mod adjacency;
mod edge_list;
mod node_link;

pub use adjacency::parse_adjacency_csv;
pub use edge_list::parse_edge_list;
pub use node_link::{parse_node_link, write_node_link, NodeLinkGraph, ID2IDX_FILE};

use crate::error::IngestError;
use crate::graph::{GraphKind, Network};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of a node-link graph written into a network directory
pub const NODE_LINK_FILE: &str = "G.json";

/// File names recognized as the node-link graph of a network directory,
/// in lookup order
pub const NODE_LINK_FILES: [&str; 2] = [NODE_LINK_FILE, "graph.json"];

/// The node-link graph file inside a network directory, if any
fn node_link_file(dir: &Path) -> Option<PathBuf> {
    NODE_LINK_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Format of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Whitespace separated `from to [weight]` rows
    EdgeList,
    /// Square matrix with node labels in the first row and column
    AdjacencyCsv,
    /// Node-link JSON document
    NodeLink,
}

impl SourceFormat {
    /// Detect the format from a path
    pub fn detect(path: &Path) -> Option<Self> {
        if path.is_dir() {
            return node_link_file(path).map(|_| Self::NodeLink);
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("txt") | Some("edgelist") | Some("edgelist_weighted") => Some(Self::EdgeList),
            Some("csv") => Some(Self::AdjacencyCsv),
            Some("json") => Some(Self::NodeLink),
            _ => None,
        }
    }
}

/// A discovered input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Network identifier (file stem or directory name)
    pub id: String,
    /// Location of the data
    pub path: PathBuf,
    /// Detected format
    pub format: SourceFormat,
}

impl Source {
    /// Describe a single path as a source
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, IngestError> {
        let path = path.into();
        let format = SourceFormat::detect(&path)
            .ok_or_else(|| IngestError::UnsupportedFormat(path.display().to_string()))?;
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| IngestError::UnsupportedFormat(path.display().to_string()))?;
        Ok(Self { id, path, format })
    }
}

/// Options applied while ingesting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Orientation for formats that do not carry their own
    pub kind: GraphKind,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            kind: GraphKind::Undirected,
        }
    }
}

/// List the supported sources in a directory, sorted by network id
pub fn discover(dir: &Path) -> Result<Vec<Source>, IngestError> {
    let mut sources = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        match Source::from_path(&path) {
            Ok(source) => sources.push(source),
            Err(_) => debug!(path = %path.display(), "ignoring unsupported entry"),
        }
    }

    sources.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.path.cmp(&b.path)));
    Ok(sources)
}

/// Read a source into a network
pub fn load(source: &Source, options: &IngestOptions) -> Result<Network, IngestError> {
    match source.format {
        SourceFormat::EdgeList => {
            let reader = BufReader::new(File::open(&source.path)?);
            parse_edge_list(&source.id, reader, options.kind)
        }
        SourceFormat::AdjacencyCsv => {
            let reader = BufReader::new(File::open(&source.path)?);
            parse_adjacency_csv(&source.id, reader, options.kind)
        }
        SourceFormat::NodeLink => {
            let path = if source.path.is_dir() {
                node_link_file(&source.path).ok_or_else(|| {
                    IngestError::UnsupportedFormat(source.path.display().to_string())
                })?
            } else {
                source.path.clone()
            };
            let reader = BufReader::new(File::open(path)?);
            parse_node_link(&source.id, reader)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_discover_sorts_and_filters() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "1 2\n").unwrap();
        std::fs::write(dir.path().join("a.csv"), ",x\nx,0\n").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("c")).unwrap();
        std::fs::write(dir.path().join("c").join(NODE_LINK_FILE), "{}").unwrap();

        let sources = discover(dir.path()).unwrap();
        let ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(sources[0].format, SourceFormat::AdjacencyCsv);
        assert_eq!(sources[1].format, SourceFormat::EdgeList);
        assert_eq!(sources[2].format, SourceFormat::NodeLink);
    }

    #[test]
    fn test_discover_node_link_directories() {
        let dir = tempdir().unwrap();
        let doc = r#"{"directed": false, "nodes": [{"id": "a"}, {"id": "b"}],
                      "links": [{"source": "a", "target": "b"}]}"#;
        for (net, file) in [("net", "G.json"), ("old", "graph.json")] {
            std::fs::create_dir(dir.path().join(net)).unwrap();
            std::fs::write(dir.path().join(net).join(file), doc).unwrap();
        }
        std::fs::create_dir(dir.path().join("empty")).unwrap();

        let sources = discover(dir.path()).unwrap();
        let ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["net", "old"]);

        for source in &sources {
            let net = load(source, &IngestOptions::default()).unwrap();
            assert_eq!(net.id(), source.id);
            assert_eq!(net.edge_count(), 1);
        }
    }

    #[test]
    fn test_load_edge_list_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("net.edgelist_weighted");
        std::fs::write(&path, "a b 0.5\nb c 2\n").unwrap();

        let source = Source::from_path(&path).unwrap();
        let net = load(&source, &IngestOptions::default()).unwrap();

        assert_eq!(net.id(), "net");
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 2);
    }
}
