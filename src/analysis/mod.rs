//! Measure aggregation.
//!
//! The `Analyzer` turns one network into an `AnalysisRecord`; the
//! `BatchRunner` does that for a whole batch on a worker pool and streams the
//! records into a result sink.

mod aggregator;
mod record;
mod runner;

pub use aggregator::{AnalysisState, Analyzer};
pub use record::AnalysisRecord;
pub use runner::{BatchRunner, NetworkIssue, RunContext};
