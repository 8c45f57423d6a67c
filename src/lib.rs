//! # Network Measures
//!
//! A Rust library for computing global and local structural measures over
//! batches of static networks.
//!
//! ## Overview
//!
//! This library provides:
//! - Graph model with directed and undirected networks, weights and
//!   connectivity queries
//! - Global measures (density, path lengths, clustering, assortativity, ...)
//! - Local measures (degree, betweenness, closeness, eigenvector, ...)
//! - Per-measure failure isolation with explicit undefined results
//! - Ingestion of edge lists, adjacency matrices and node-link JSON
//! - CSV result tables and distribution tables for plotting
//!
//! ## Example
//!
//! ```rust,no_run
//! use network_measures::{
//!     analysis::{Analyzer, BatchRunner},
//!     ingest,
//!     sink::{CsvSink, DistributionWriter},
//! };
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let sources = ingest::discover(Path::new("data"))?;
//!
//!     let mut sink = CsvSink::new("results", DistributionWriter::new("plots"));
//!     let context = BatchRunner::new(Analyzer::standard())
//!         .workers(4)
//!         .run_sources(&sources, &mut sink)?;
//!
//!     println!("analyzed {} networks", context.analyzed.len());
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod compare;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod measures;
pub mod sink;
pub mod utils;

// Re-export main types for convenience
pub use analysis::{AnalysisRecord, AnalysisState, Analyzer, BatchRunner, RunContext};
pub use error::{Error, Result};
pub use graph::{GraphKind, Network, NetworkBuilder};
pub use measures::{MeasureConfig, MeasureRegistry, MeasureStatus, NodeValues, Outcome, Scalar, Scope};
pub use sink::{CsvSink, DistributionWriter, MemorySink, PlotCollaborator, ResultSink};
pub use utils::{Config, Stats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::analysis::{AnalysisRecord, Analyzer, BatchRunner, RunContext};
    pub use crate::graph::{GraphKind, Network, NetworkBuilder};
    pub use crate::measures::{MeasureConfig, MeasureRegistry, NodeValues, Outcome, Scalar, Scope};
    pub use crate::sink::{CsvSink, DistributionWriter, ResultSink};
    pub use crate::utils::Config;
}
