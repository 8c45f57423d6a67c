//! Utilities module for common functionality.
//!
//! This module provides:
//! - Statistical helpers used by the measures
//! - Configuration handling

mod config;
mod stats;

pub use config::{AnalysisConfig, Config, IngestConfig, OutputConfig, RuntimeConfig};
pub use stats::Stats;
