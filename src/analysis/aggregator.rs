//! Per-network orchestration of the measure suites.

use super::AnalysisRecord;
use crate::error::AnalysisError;
use crate::graph::Network;
use crate::measures::{MeasureConfig, MeasureRegistry, MeasureStatus};
use tracing::{debug, info, warn};

/// Lifecycle of one network's analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Pending,
    RunningGlobal,
    RunningLocal,
    Complete,
    /// The network failed validation
    Failed,
}

impl AnalysisState {
    /// Whether `next` may follow this state
    pub fn can_advance_to(self, next: AnalysisState) -> bool {
        use AnalysisState::*;
        matches!(
            (self, next),
            (Pending, RunningGlobal)
                | (Pending, Failed)
                | (RunningGlobal, RunningLocal)
                | (RunningLocal, Complete)
        )
    }

    /// True for `Complete` and `Failed`
    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisState::Complete | AnalysisState::Failed)
    }
}

impl std::fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnalysisState::Pending => "pending",
            AnalysisState::RunningGlobal => "running_global",
            AnalysisState::RunningLocal => "running_local",
            AnalysisState::Complete => "complete",
            AnalysisState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Tracks the state of a single analysis
struct Lifecycle<'a> {
    network: &'a str,
    state: AnalysisState,
}

impl<'a> Lifecycle<'a> {
    fn new(network: &'a str) -> Self {
        Self {
            network,
            state: AnalysisState::Pending,
        }
    }

    fn advance(&mut self, next: AnalysisState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        debug!(network = self.network, from = %self.state, to = %next, "analysis state");
        self.state = next;
    }
}

/// Runs a registry of measures over networks
#[derive(Debug, Clone)]
pub struct Analyzer {
    registry: MeasureRegistry,
    config: MeasureConfig,
}

impl Analyzer {
    /// Create an analyzer
    pub fn new(registry: MeasureRegistry, config: MeasureConfig) -> Self {
        Self { registry, config }
    }

    /// Analyzer with every built-in measure and default settings
    pub fn standard() -> Self {
        Self::new(MeasureRegistry::standard(), MeasureConfig::default())
    }

    pub fn registry(&self) -> &MeasureRegistry {
        &self.registry
    }

    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }

    /// Analyze one network.
    ///
    /// Only a network that fails validation is an error; individual measures
    /// that fail or are undefined are recorded in the returned record.
    pub fn analyze(&self, network: &Network) -> Result<AnalysisRecord, AnalysisError> {
        let mut lifecycle = Lifecycle::new(network.id());

        if let Err(source) = network.validate() {
            lifecycle.advance(AnalysisState::Failed);
            warn!(network = network.id(), error = %source, "network failed validation");
            return Err(AnalysisError::MalformedGraph {
                network: network.id().to_string(),
                source,
            });
        }

        lifecycle.advance(AnalysisState::RunningGlobal);
        let global = self.registry.run_global(network, &self.config);

        lifecycle.advance(AnalysisState::RunningLocal);
        let local = self.registry.run_local(network, &self.config);

        let record = AnalysisRecord::assemble(network, global, local);
        lifecycle.advance(AnalysisState::Complete);

        info!(
            network = network.id(),
            nodes = record.node_count(),
            edges = record.edge_count(),
            undefined = record.count(MeasureStatus::Undefined),
            failed = record.count(MeasureStatus::Failure),
            "analysis complete"
        );

        Ok(record)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::standard()
    }
}
