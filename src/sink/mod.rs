//! Persistence of analysis records.
//!
//! A `ResultSink` receives each record as it is produced and a final call
//! with the run context once the batch is over.

mod csv_sink;
mod plot;

pub use csv_sink::{CsvSink, GLOBAL_FILE, LOCAL_DIR, LOCAL_FILE, NETWORKS_DIR, SUMMARY_FILE};
pub use plot::{DistributionWriter, PlotCollaborator};

use crate::analysis::{AnalysisRecord, RunContext};
use crate::error::SinkError;

/// Destination for analysis records
pub trait ResultSink {
    /// Take ownership of one record
    fn emit(&mut self, record: AnalysisRecord) -> Result<(), SinkError>;

    /// Called once after the last record
    fn finish(&mut self, context: &RunContext) -> Result<(), SinkError>;
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<AnalysisRecord>,
    summary: Option<RunContext>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records in emission order
    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    /// Record of a network, if one was emitted
    pub fn record(&self, network: &str) -> Option<&AnalysisRecord> {
        self.records.iter().find(|r| r.network_id() == network)
    }

    /// Context passed to `finish`
    pub fn summary(&self) -> Option<&RunContext> {
        self.summary.as_ref()
    }

    pub fn into_records(self) -> Vec<AnalysisRecord> {
        self.records
    }
}

impl ResultSink for MemorySink {
    fn emit(&mut self, record: AnalysisRecord) -> Result<(), SinkError> {
        self.records.push(record);
        Ok(())
    }

    fn finish(&mut self, context: &RunContext) -> Result<(), SinkError> {
        self.summary = Some(context.clone());
        Ok(())
    }
}
