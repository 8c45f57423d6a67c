//! Per-network analysis records.

use crate::graph::{GraphKind, Network};
use crate::measures::{MeasureStatus, NodeValues, Outcome, Scalar};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything computed for one network in one run.
///
/// Assembled once by the analyzer and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    network_id: String,
    kind: GraphKind,
    node_count: usize,
    edge_count: usize,
    global: BTreeMap<String, Outcome<Scalar>>,
    local: BTreeMap<String, Outcome<NodeValues>>,
    status: BTreeMap<String, MeasureStatus>,
}

impl AnalysisRecord {
    pub(crate) fn assemble(
        network: &Network,
        global: BTreeMap<String, Outcome<Scalar>>,
        local: BTreeMap<String, Outcome<NodeValues>>,
    ) -> Self {
        let status = global
            .iter()
            .map(|(name, outcome)| (name.clone(), outcome.status()))
            .chain(
                local
                    .iter()
                    .map(|(name, outcome)| (name.clone(), outcome.status())),
            )
            .collect();

        Self {
            network_id: network.id().to_string(),
            kind: network.kind(),
            node_count: network.node_count(),
            edge_count: network.edge_count(),
            global,
            local,
            status,
        }
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Global outcomes keyed by measure name
    pub fn global(&self) -> &BTreeMap<String, Outcome<Scalar>> {
        &self.global
    }

    /// Local outcomes keyed by measure name
    pub fn local(&self) -> &BTreeMap<String, Outcome<NodeValues>> {
        &self.local
    }

    /// Status of every measure, global and local
    pub fn status(&self) -> &BTreeMap<String, MeasureStatus> {
        &self.status
    }

    /// Value of a global measure, if it succeeded
    pub fn global_value(&self, measure: &str) -> Option<f64> {
        self.global.get(measure)?.as_value().map(|s| s.value)
    }

    /// Values of a local measure, if it succeeded
    pub fn local_values(&self, measure: &str) -> Option<&NodeValues> {
        self.local.get(measure)?.as_value()
    }

    /// Number of measures with the given status
    pub fn count(&self, status: MeasureStatus) -> usize {
        self.status.values().filter(|s| **s == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NetworkBuilder;

    #[test]
    fn test_assemble_status_map() {
        let net = NetworkBuilder::from_edges("r", GraphKind::Undirected, &[("A", "B")]).unwrap();

        let mut global = BTreeMap::new();
        global.insert("density".to_string(), Outcome::value(Scalar::whole(1.0)));
        global.insert("radius".to_string(), Outcome::undefined("no pairs"));
        let mut local = BTreeMap::new();
        local.insert("eigenvector_centrality".to_string(), Outcome::failure("non-convergent"));

        let record = AnalysisRecord::assemble(&net, global, local);

        assert_eq!(record.network_id(), "r");
        assert_eq!(record.node_count(), 2);
        assert_eq!(record.global_value("density"), Some(1.0));
        assert_eq!(record.global_value("radius"), None);
        assert_eq!(record.status()["eigenvector_centrality"], MeasureStatus::Failure);
        assert_eq!(record.count(MeasureStatus::Success), 1);
        assert_eq!(record.count(MeasureStatus::Undefined), 1);
    }
}
