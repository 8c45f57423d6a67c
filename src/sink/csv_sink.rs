//! CSV result tables.

use super::{PlotCollaborator, ResultSink};
use crate::analysis::{AnalysisRecord, RunContext};
use crate::error::SinkError;
use crate::measures::{NodeValues, Outcome};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Per-network and combined global table name
pub const GLOBAL_FILE: &str = "global_metrics.csv";
/// Per-network local table name
pub const LOCAL_FILE: &str = "local_metrics.csv";
/// Directory holding one wide table per local measure
pub const LOCAL_DIR: &str = "local";
/// Directory holding one sub-directory of tables per network
pub const NETWORKS_DIR: &str = "networks";
/// Run summary name
pub const SUMMARY_FILE: &str = "run_summary.json";

/// Writes records as CSV tables under a results directory.
///
/// Layout:
/// - `<results>/networks/<network>/global_metrics.csv`: one row per measure
/// - `<results>/networks/<network>/local_metrics.csv`: one row per node and measure
/// - `<results>/global_metrics.csv`: networks × global measures
/// - `<results>/local/<measure>.csv`: nodes × networks
/// - `<results>/run_summary.json`
///
/// Successful local vectors are also handed to the plot collaborator.
pub struct CsvSink<P: PlotCollaborator> {
    dir: PathBuf,
    missing: String,
    plots: P,
    global: BTreeMap<String, BTreeMap<String, Option<f64>>>,
    local: BTreeMap<String, BTreeMap<String, NodeValues>>,
}

impl<P: PlotCollaborator> CsvSink<P> {
    pub fn new(dir: impl Into<PathBuf>, plots: P) -> Self {
        Self {
            dir: dir.into(),
            missing: "-".to_string(),
            plots,
            global: BTreeMap::new(),
            local: BTreeMap::new(),
        }
    }

    /// Placeholder written where a value is absent
    pub fn missing_marker(mut self, marker: impl Into<String>) -> Self {
        self.missing = marker.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn plots(&self) -> &P {
        &self.plots
    }

    /// Directory of the per-network tables
    pub fn network_dir(&self, network: &str) -> PathBuf {
        self.dir.join(NETWORKS_DIR).join(network)
    }

    fn cell(&self, value: Option<f64>) -> String {
        value.map_or_else(|| self.missing.clone(), |v| v.to_string())
    }

    fn write_network_global(&self, dir: &Path, record: &AnalysisRecord) -> Result<(), SinkError> {
        let mut writer = csv::Writer::from_path(dir.join(GLOBAL_FILE))?;
        writer.write_record(["network", "measure", "status", "value", "scope", "detail"])?;

        for (measure, outcome) in record.global() {
            let (value, scope) = match outcome.as_value() {
                Some(scalar) => (Some(scalar.value), scalar.scope.to_string()),
                None => (None, String::new()),
            };
            let status = outcome.status().to_string();
            let value = self.cell(value);
            writer.write_record([
                record.network_id(),
                measure.as_str(),
                status.as_str(),
                value.as_str(),
                scope.as_str(),
                outcome.detail().unwrap_or_default(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    fn write_network_local(
        &self,
        dir: &Path,
        record: &AnalysisRecord,
        nodes: &[String],
    ) -> Result<(), SinkError> {
        let mut writer = csv::Writer::from_path(dir.join(LOCAL_FILE))?;
        writer.write_record(["network", "node", "measure", "status", "value"])?;

        for (measure, outcome) in record.local() {
            let status = outcome.status().to_string();
            let values = outcome.as_value();
            for node in nodes {
                let value = self.cell(values.and_then(|v| v.get(node).copied()));
                writer.write_record([
                    record.network_id(),
                    node.as_str(),
                    measure.as_str(),
                    status.as_str(),
                    value.as_str(),
                ])?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    fn write_combined_global(&self) -> Result<(), SinkError> {
        let measures: BTreeSet<&String> = self.global.values().flat_map(|m| m.keys()).collect();

        let mut writer = csv::Writer::from_path(self.dir.join(GLOBAL_FILE))?;
        let mut header = vec!["network".to_string()];
        header.extend(measures.iter().map(|m| m.to_string()));
        writer.write_record(&header)?;

        for (network, values) in &self.global {
            let mut row = vec![network.clone()];
            row.extend(
                measures
                    .iter()
                    .map(|m| self.cell(values.get(*m).copied().flatten())),
            );
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn write_local_matrices(&self) -> Result<(), SinkError> {
        let dir = self.dir.join(LOCAL_DIR);
        fs::create_dir_all(&dir)?;

        let networks: Vec<&String> = self.global.keys().collect();

        for (measure, by_network) in &self.local {
            let nodes: BTreeSet<&String> = by_network.values().flat_map(|v| v.keys()).collect();

            let mut writer = csv::Writer::from_path(dir.join(format!("{}.csv", measure)))?;
            let mut header = vec!["node".to_string()];
            header.extend(networks.iter().map(|n| n.to_string()));
            writer.write_record(&header)?;

            for node in nodes {
                let mut row = vec![node.clone()];
                row.extend(networks.iter().map(|network| {
                    let value = by_network
                        .get(*network)
                        .and_then(|values| values.get(node).copied());
                    self.cell(value)
                }));
                writer.write_record(&row)?;
            }
            writer.flush()?;
        }

        Ok(())
    }

    fn write_summary(&self, context: &RunContext) -> Result<(), SinkError> {
        let mut writer = BufWriter::new(fs::File::create(self.dir.join(SUMMARY_FILE))?);
        serde_json::to_writer_pretty(&mut writer, context)?;
        writer.flush()?;
        Ok(())
    }
}

impl<P: PlotCollaborator> ResultSink for CsvSink<P> {
    fn emit(&mut self, record: AnalysisRecord) -> Result<(), SinkError> {
        let dir = self.network_dir(record.network_id());
        fs::create_dir_all(&dir)?;

        let nodes: Vec<String> = {
            let mut nodes: BTreeSet<String> = BTreeSet::new();
            for outcome in record.local().values() {
                if let Outcome::Success { value } = outcome {
                    nodes.extend(value.keys().cloned());
                }
            }
            nodes.into_iter().collect()
        };

        self.write_network_global(&dir, &record)?;
        self.write_network_local(&dir, &record, &nodes)?;

        for (measure, outcome) in record.local() {
            if let Some(values) = outcome.as_value() {
                self.plots.plot(record.network_id(), measure, values)?;
            }
        }

        let id = record.network_id().to_string();
        let global = record
            .global()
            .iter()
            .map(|(measure, outcome)| (measure.clone(), outcome.as_value().map(|s| s.value)))
            .collect();
        self.global.insert(id.clone(), global);

        for (measure, outcome) in record.local() {
            if let Some(values) = outcome.as_value() {
                self.local
                    .entry(measure.clone())
                    .or_default()
                    .insert(id.clone(), values.clone());
            }
        }

        debug!(network = %id, dir = %dir.display(), "record written");
        Ok(())
    }

    fn finish(&mut self, context: &RunContext) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir)?;
        self.write_combined_global()?;
        self.write_local_matrices()?;
        self.write_summary(context)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::graph::{GraphKind, NetworkBuilder};
    use crate::sink::DistributionWriter;
    use tempfile::tempdir;

    #[test]
    fn test_tables_written() {
        let dir = tempdir().unwrap();
        let results = dir.path().join("results");
        let mut sink = CsvSink::new(&results, DistributionWriter::new(dir.path().join("plots")))
            .missing_marker("NA");

        let analyzer = Analyzer::standard();
        let first = NetworkBuilder::from_edges("n1", GraphKind::Undirected, &[("A", "B")]).unwrap();
        let second =
            NetworkBuilder::from_edges("n2", GraphKind::Undirected, &[("B", "C"), ("C", "D")])
                .unwrap();
        sink.emit(analyzer.analyze(&first).unwrap()).unwrap();
        sink.emit(analyzer.analyze(&second).unwrap()).unwrap();
        sink.finish(&RunContext::new()).unwrap();

        let global = fs::read_to_string(results.join(NETWORKS_DIR).join("n1").join(GLOBAL_FILE)).unwrap();
        assert!(global.starts_with("network,measure,status,value,scope,detail\n"));
        assert!(global.contains("n1,density,success,1,whole,"));

        let local = fs::read_to_string(results.join(NETWORKS_DIR).join("n2").join(LOCAL_FILE)).unwrap();
        assert!(local.contains("n2,C,degree,success,2"));
        assert!(local.contains("n2,C,in_degree,undefined,NA"));

        let matrix = fs::read_to_string(results.join(LOCAL_DIR).join("degree.csv")).unwrap();
        let lines: Vec<&str> = matrix.lines().collect();
        assert_eq!(lines[0], "node,n1,n2");
        assert_eq!(lines[1], "A,1,NA");
        assert_eq!(lines[3], "C,NA,2");

        let combined = fs::read_to_string(results.join(GLOBAL_FILE)).unwrap();
        assert_eq!(combined.lines().count(), 3);
        assert!(results.join(SUMMARY_FILE).is_file());
        assert!(dir.path().join("plots").join("n2_degree_distribution.csv").is_file());
    }

    #[test]
    fn test_network_named_like_an_aggregate() {
        let dir = tempdir().unwrap();
        let results = dir.path().join("results");
        let mut sink = CsvSink::new(&results, DistributionWriter::new(dir.path().join("plots")));

        let analyzer = Analyzer::standard();
        for id in [LOCAL_DIR, "global_metrics.csv"] {
            let net = NetworkBuilder::from_edges(id, GraphKind::Undirected, &[("A", "B")]).unwrap();
            sink.emit(analyzer.analyze(&net).unwrap()).unwrap();
        }
        sink.finish(&RunContext::new()).unwrap();

        assert!(results.join(NETWORKS_DIR).join(LOCAL_DIR).join(LOCAL_FILE).is_file());
        assert!(results.join(LOCAL_DIR).join("degree.csv").is_file());
        assert!(results.join(GLOBAL_FILE).is_file());

        let matrix = fs::read_to_string(results.join(LOCAL_DIR).join("degree.csv")).unwrap();
        assert_eq!(matrix.lines().next(), Some("node,global_metrics.csv,local"));
    }
}
