//! Error types for the network measures library

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Graph model invariant violations.
///
/// These are fatal for the affected network: its analysis is aborted and the
/// reason is surfaced in the run summary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A node identifier was added twice
    #[error("duplicate node '{0}'")]
    DuplicateNode(String),

    /// An edge references a node that is not in the node set
    #[error("edge references unknown node '{0}'")]
    UnknownNode(String),

    /// Edge weight is negative, NaN or infinite
    #[error("invalid weight {weight} on edge {from} -> {to}")]
    InvalidWeight { from: String, to: String, weight: f64 },
}

/// Errors raised while turning a source file into a network
#[derive(Error, Debug)]
pub enum IngestError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A row could not be turned into an edge
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// A node or link entry of a node-link document is unusable
    #[error("malformed {section} entry #{index}: {reason}")]
    MalformedEntry {
        section: &'static str,
        index: usize,
        reason: String,
    },

    /// File extension is not one of the supported formats
    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),

    /// The rows were valid but broke a graph invariant
    #[error("invalid graph: {0}")]
    Graph(#[from] GraphError),
}

/// Error raised inside a single measure computation.
///
/// Always isolated to that measure by the registry wrapper.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    /// Numerical problem not covered by an explicit undefined rule
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Power iteration hit the iteration cap
    #[error("non-convergent after {iterations} iterations")]
    NonConvergent { iterations: usize },

    /// A derived measure depends on another measure that failed
    #[error("depends on failed measure '{measure}': {cause}")]
    Dependency { measure: String, cause: String },
}

/// Catastrophic analysis errors (the whole network fails)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Graph did not pass validation
    #[error("malformed graph '{network}': {source}")]
    MalformedGraph {
        network: String,
        #[source]
        source: GraphError,
    },
}

/// Errors raised while persisting results
#[derive(Error, Debug)]
pub enum SinkError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Worker pool could not be created
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Measure name registered twice
    #[error("measure '{0}' is already registered")]
    DuplicateMeasure(String),

    /// Unknown measure name requested
    #[error("unknown measure '{0}'")]
    UnknownMeasure(String),

    /// Network id not present in a lookup
    #[error("unknown network '{0}'")]
    UnknownNetwork(String),

    /// IO error outside the sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error outside the sink
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl IngestError {
    /// Build a malformed-row error
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        IngestError::MalformedRow {
            line,
            reason: reason.into(),
        }
    }
}
