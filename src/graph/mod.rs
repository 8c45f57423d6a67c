//! Graph module: the in-memory network model.
//!
//! This module provides:
//! - Core graph types (`Network`, `GraphKind`, `Link`)
//! - Validated construction through `NetworkBuilder`
//! - Shortest-path traversals shared by the measure suites
//! - Node and edge connectivity by maximum flow

mod algorithms;
mod builder;
mod flow;
mod types;

pub use algorithms::{distances_from, shortest_path_tree, ShortestPathTree};
pub use flow::{edge_connectivity, node_connectivity};
pub use builder::NetworkBuilder;
pub use types::{EdgeWeight, GraphKind, Link, Network, NodeId};
