//! Plot collaborator interface.

use crate::error::SinkError;
use crate::measures::NodeValues;
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Receives every successful local measure vector
pub trait PlotCollaborator {
    fn plot(&mut self, network: &str, measure: &str, values: &NodeValues) -> Result<(), SinkError>;
}

/// Writes value-count tables, one per network and local measure.
///
/// `<dir>/<network>_<measure>_distribution.csv` with `value,count` rows in
/// ascending value order.
#[derive(Debug, Clone)]
pub struct DistributionWriter {
    dir: PathBuf,
}

impl DistributionWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the table for a network and measure
    pub fn path_for(&self, network: &str, measure: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}_distribution.csv", network, measure))
    }

    /// Count how many nodes share each value
    pub fn distribution(values: &NodeValues) -> BTreeMap<OrderedFloat<f64>, usize> {
        let mut counts = BTreeMap::new();
        for value in values.values() {
            *counts.entry(OrderedFloat(*value)).or_insert(0) += 1;
        }
        counts
    }
}

impl PlotCollaborator for DistributionWriter {
    fn plot(&mut self, network: &str, measure: &str, values: &NodeValues) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.dir)?;

        let mut writer = csv::Writer::from_path(self.path_for(network, measure))?;
        writer.write_record(["value", "count"])?;
        for (value, count) in Self::distribution(values) {
            writer.write_record([value.0.to_string(), count.to_string()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_distribution_table() {
        let dir = tempdir().unwrap();
        let mut writer = DistributionWriter::new(dir.path().join("plots"));

        let values: NodeValues = [("A", 1.0), ("B", 2.0), ("C", 1.0)]
            .into_iter()
            .map(|(n, v)| (n.to_string(), v))
            .collect();
        writer.plot("net", "degree", &values).unwrap();

        let content = std::fs::read_to_string(writer.path_for("net", "degree")).unwrap();
        assert_eq!(content, "value,count\n1,2\n2,1\n");
    }
}
