//! Batch execution over many networks.

use super::{AnalysisRecord, Analyzer};
use crate::error::{IngestError, Result};
use crate::graph::Network;
use crate::ingest::{self, IngestOptions, Source};
use crate::sink::ResultSink;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use tracing::{info, warn};

/// A network that did not produce a record, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIssue {
    pub id: String,
    pub reason: String,
}

/// Run-wide bookkeeping handed to the sink when the batch ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunContext {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Networks with a record
    pub analyzed: Vec<String>,
    /// Networks whose source could not be read
    pub skipped: Vec<NetworkIssue>,
    /// Networks that broke a graph invariant
    pub failed: Vec<NetworkIssue>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            analyzed: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Total networks seen
    pub fn total(&self) -> usize {
        self.analyzed.len() + self.skipped.len() + self.failed.len()
    }

    fn record(&mut self, item: &WorkItem) {
        match item {
            WorkItem::Analyzed(record) => self.analyzed.push(record.network_id().to_string()),
            WorkItem::Skipped(issue) => self.skipped.push(issue.clone()),
            WorkItem::Failed(issue) => self.failed.push(issue.clone()),
        }
    }

    fn close(&mut self) {
        self.analyzed.sort();
        self.skipped.sort_by(|a, b| a.id.cmp(&b.id));
        self.failed.sort_by(|a, b| a.id.cmp(&b.id));
        self.finished_at = Some(Utc::now());
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Message from a worker to the writer
#[derive(Debug)]
enum WorkItem {
    Analyzed(AnalysisRecord),
    Skipped(NetworkIssue),
    Failed(NetworkIssue),
}

impl WorkItem {
    fn issue(id: &str, reason: impl ToString) -> NetworkIssue {
        NetworkIssue {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }

    fn from_analysis(id: &str, analyzer: &Analyzer, network: &Network) -> Self {
        match analyzer.analyze(network) {
            Ok(record) => WorkItem::Analyzed(record),
            Err(e) => WorkItem::Failed(Self::issue(id, e)),
        }
    }
}

/// Analyzes batches of networks on a worker pool.
///
/// Records are sent over a channel to a single writer thread that owns the
/// sink, so output is never interleaved.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    analyzer: Analyzer,
    ingest: IngestOptions,
    workers: usize,
    progress: bool,
}

impl BatchRunner {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            ingest: IngestOptions::default(),
            workers: 1,
            progress: false,
        }
    }

    /// Set ingestion options
    pub fn ingest_options(mut self, options: IngestOptions) -> Self {
        self.ingest = options;
        self
    }

    /// Set the number of networks analyzed concurrently
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Show a progress bar
    pub fn progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Load and analyze every source.
    ///
    /// Unreadable sources are skipped and graph invariant violations fail
    /// that network; both are listed in the returned context.
    pub fn run_sources<S>(&self, sources: &[Source], sink: &mut S) -> Result<RunContext>
    where
        S: ResultSink + Send,
    {
        self.execute(sources, sink, |source| {
            match ingest::load(source, &self.ingest) {
                Ok(network) => WorkItem::from_analysis(&source.id, &self.analyzer, &network),
                Err(IngestError::Graph(e)) => WorkItem::Failed(WorkItem::issue(&source.id, e)),
                Err(e) => WorkItem::Skipped(WorkItem::issue(&source.id, e)),
            }
        })
    }

    /// Analyze networks that are already in memory
    pub fn run_networks<S>(&self, networks: &[Network], sink: &mut S) -> Result<RunContext>
    where
        S: ResultSink + Send,
    {
        self.execute(networks, sink, |network| {
            WorkItem::from_analysis(network.id(), &self.analyzer, network)
        })
    }

    fn execute<T, S, F>(&self, items: &[T], sink: &mut S, process: F) -> Result<RunContext>
    where
        T: Sync,
        S: ResultSink + Send,
        F: Fn(&T) -> WorkItem + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;
        let pb = self.progress_bar(items.len());
        let (tx, rx) = mpsc::channel::<WorkItem>();

        info!(networks = items.len(), workers = self.workers, "starting batch");

        let (mut context, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(|| {
                let mut context = RunContext::new();
                let mut written: Result<()> = Ok(());

                for item in rx {
                    context.record(&item);
                    match item {
                        WorkItem::Analyzed(record) => {
                            pb.set_message(record.network_id().to_string());
                            if written.is_ok() {
                                written = sink.emit(record).map_err(Into::into);
                            }
                        }
                        WorkItem::Skipped(issue) => {
                            warn!(network = %issue.id, reason = %issue.reason, "network skipped");
                        }
                        WorkItem::Failed(issue) => {
                            warn!(network = %issue.id, reason = %issue.reason, "network failed");
                        }
                    }
                    pb.inc(1);
                }

                (context, written)
            });

            pool.install(|| {
                items
                    .par_iter()
                    .for_each_with(tx, |tx, item| {
                        // the writer only stops once every sender is dropped
                        let _ = tx.send(process(item));
                    });
            });

            writer.join()
        })
        .unwrap_or_else(|_| (RunContext::new(), Err(writer_panicked())));

        pb.finish_and_clear();
        written?;

        context.close();
        sink.finish(&context)?;

        info!(
            analyzed = context.analyzed.len(),
            skipped = context.skipped.len(),
            failed = context.failed.len(),
            "batch complete"
        );

        Ok(context)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

fn writer_panicked() -> crate::error::Error {
    crate::error::Error::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "result writer thread panicked",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphKind, NetworkBuilder};
    use crate::sink::MemorySink;
    use tempfile::tempdir;

    fn networks() -> Vec<Network> {
        vec![
            NetworkBuilder::from_edges("b", GraphKind::Undirected, &[("A", "B"), ("B", "C")])
                .unwrap(),
            NetworkBuilder::from_edges("a", GraphKind::Directed, &[("A", "B")]).unwrap(),
        ]
    }

    #[test]
    fn test_run_networks() {
        let mut sink = MemorySink::new();
        let context = BatchRunner::new(Analyzer::standard())
            .workers(2)
            .run_networks(&networks(), &mut sink)
            .unwrap();

        assert_eq!(context.analyzed, vec!["a", "b"]);
        assert!(context.finished_at.is_some());
        assert_eq!(sink.records().len(), 2);
        assert!(sink.record("a").is_some());
        assert_eq!(sink.summary(), Some(&context));
    }

    #[test]
    fn test_run_sources_skips_and_fails() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("good.txt"), "1 2\n2 3\n").unwrap();
        std::fs::write(dir.path().join("bad.txt"), "1 2 heavy\n").unwrap();
        std::fs::write(
            dir.path().join("dup.json"),
            r#"{"directed": false, "nodes": [{"id": 1}, {"id": 1}], "links": []}"#,
        )
        .unwrap();

        let sources = ingest::discover(dir.path()).unwrap();
        let mut sink = MemorySink::new();
        let context = BatchRunner::new(Analyzer::standard())
            .run_sources(&sources, &mut sink)
            .unwrap();

        assert_eq!(context.analyzed, vec!["good"]);
        assert_eq!(context.skipped.len(), 1);
        assert_eq!(context.skipped[0].id, "bad");
        assert_eq!(context.failed.len(), 1);
        assert_eq!(context.failed[0].id, "dup");
        assert_eq!(context.total(), 3);
    }
}
