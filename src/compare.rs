//! Node-pair comparison of a local measure across two networks.

use crate::error::{Error, Result};
use crate::graph::Network;
use crate::measures::{MeasureConfig, MeasureRegistry, NodeValues};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// A node of the source network matched with a node of the target network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePair {
    #[serde(rename = "source_node")]
    pub source: String,
    #[serde(rename = "target_node")]
    pub target: String,
}

/// One row of a comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairComparison {
    pub source_node: String,
    pub metric_value_source: Option<f64>,
    pub similarity: f64,
    pub metric_value_target: Option<f64>,
    pub target_node: String,
}

/// Read `source_node,target_node` rows
pub fn read_node_pairs(path: &Path) -> Result<Vec<NodePair>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut pairs = Vec::new();
    for row in reader.deserialize() {
        pairs.push(row?);
    }
    Ok(pairs)
}

/// Similarity of two measure values in `[0, 1]` for non-negative inputs.
///
/// `1 - |a - b| / max(a, b, 1e-9)`; 0 when either value is missing.
pub fn similarity(a: Option<f64>, b: Option<f64>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => 1.0 - (a - b).abs() / a.max(b).max(1e-9),
        _ => 0.0,
    }
}

fn local_values(
    registry: &MeasureRegistry,
    measure: &str,
    network: &Network,
    config: &MeasureConfig,
) -> Result<Option<NodeValues>> {
    let outcome = registry
        .evaluate_local(measure, network, config)
        .ok_or_else(|| Error::UnknownMeasure(measure.to_string()))?;

    match outcome.as_value() {
        Some(values) => Ok(Some(values.clone())),
        None => {
            warn!(
                network = network.id(),
                measure,
                status = %outcome.status(),
                "no values to compare"
            );
            Ok(None)
        }
    }
}

/// Compare a local measure between matched nodes of two networks
pub fn compare_measure(
    registry: &MeasureRegistry,
    config: &MeasureConfig,
    measure: &str,
    source: &Network,
    target: &Network,
    pairs: &[NodePair],
) -> Result<Vec<PairComparison>> {
    let source_values = local_values(registry, measure, source, config)?;
    let target_values = local_values(registry, measure, target, config)?;

    let rows: Vec<PairComparison> = pairs
        .iter()
        .map(|pair| {
            let a = source_values
                .as_ref()
                .and_then(|v| v.get(&pair.source).copied());
            let b = target_values
                .as_ref()
                .and_then(|v| v.get(&pair.target).copied());
            PairComparison {
                source_node: pair.source.clone(),
                metric_value_source: a,
                similarity: similarity(a, b),
                metric_value_target: b,
                target_node: pair.target.clone(),
            }
        })
        .collect();

    debug!(
        measure,
        source = source.id(),
        target = target.id(),
        pairs = rows.len(),
        "comparison done"
    );
    Ok(rows)
}

/// Write comparison rows as CSV; missing values are left empty
pub fn write_comparison(path: &Path, rows: &[PairComparison]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphKind, NetworkBuilder};
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    #[test]
    fn test_similarity() {
        assert_relative_eq!(similarity(Some(2.0), Some(2.0)), 1.0);
        assert_relative_eq!(similarity(Some(1.0), Some(4.0)), 0.25);
        assert_relative_eq!(similarity(Some(0.0), Some(0.0)), 1.0);
        assert_eq!(similarity(None, Some(1.0)), 0.0);
        assert_eq!(similarity(Some(1.0), None), 0.0);
    }

    #[test]
    fn test_compare_degree() {
        let source =
            NetworkBuilder::from_edges("s", GraphKind::Undirected, &[("a", "b"), ("a", "c")])
                .unwrap();
        let target = NetworkBuilder::from_edges("t", GraphKind::Undirected, &[("x", "y")]).unwrap();
        let pairs = vec![
            NodePair {
                source: "a".to_string(),
                target: "x".to_string(),
            },
            NodePair {
                source: "b".to_string(),
                target: "missing".to_string(),
            },
        ];

        let rows = compare_measure(
            &MeasureRegistry::standard(),
            &MeasureConfig::default(),
            "degree",
            &source,
            &target,
            &pairs,
        )
        .unwrap();

        assert_eq!(rows[0].metric_value_source, Some(2.0));
        assert_eq!(rows[0].metric_value_target, Some(1.0));
        assert_relative_eq!(rows[0].similarity, 0.5);
        assert_eq!(rows[1].metric_value_target, None);
        assert_eq!(rows[1].similarity, 0.0);
    }

    #[test]
    fn test_unknown_measure() {
        let net = NetworkBuilder::from_edges("s", GraphKind::Undirected, &[("a", "b")]).unwrap();
        let result = compare_measure(
            &MeasureRegistry::standard(),
            &MeasureConfig::default(),
            "density",
            &net,
            &net,
            &[],
        );
        assert!(matches!(result, Err(Error::UnknownMeasure(_))));
    }

    #[test]
    fn test_pairs_file_round_trip() {
        let dir = tempdir().unwrap();
        let pairs_path = dir.path().join("pairs.csv");
        std::fs::write(&pairs_path, "source_node,target_node\na,x\nb,y\n").unwrap();

        let pairs = read_node_pairs(&pairs_path).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].target, "y");

        let out = dir.path().join("out").join("cmp.csv");
        let rows = vec![PairComparison {
            source_node: "a".to_string(),
            metric_value_source: Some(1.0),
            similarity: 0.0,
            metric_value_target: None,
            target_node: "x".to_string(),
        }];
        write_comparison(&out, &rows).unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            content,
            "source_node,metric_value_source,similarity,metric_value_target,target_node\na,1.0,0.0,,x\n"
        );
    }
}
