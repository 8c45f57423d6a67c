//! Configuration handling.

use crate::error::ConfigError;
use crate::measures::{MeasureConfig, MeasureRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Measure computation settings
    pub analysis: AnalysisConfig,
    /// Source reading settings
    pub ingest: IngestConfig,
    /// Worker pool settings
    pub runtime: RuntimeConfig,
    /// Output locations
    pub output: OutputConfig,
}

/// Measure computation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Use edge weights as path lengths and in eigenvector iteration
    pub use_weights: bool,
    /// Count strong components on directed networks
    pub strong_components: bool,
    /// Iteration cap for eigenvector centrality
    pub eigenvector_max_iter: usize,
    /// Convergence tolerance for eigenvector centrality
    pub eigenvector_tolerance: f64,
    /// Global measures to run (all when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_measures: Option<Vec<String>>,
    /// Local measures to run (all when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_measures: Option<Vec<String>>,
}

/// Source reading settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Read edge lists and matrices as directed networks
    pub directed: bool,
}

/// Worker pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Number of graphs analyzed concurrently (available cores when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Show a progress bar
    pub progress: bool,
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated node-link graphs
    pub graphs_dir: PathBuf,
    /// Directory for metric tables
    pub results_dir: PathBuf,
    /// Directory for distribution tables
    pub plots_dir: PathBuf,
    /// Placeholder for absent values in wide tables
    pub missing_marker: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let measures = MeasureConfig::default();
        Self {
            use_weights: measures.use_weights,
            strong_components: measures.strong_components,
            eigenvector_max_iter: measures.eigenvector_max_iter,
            eigenvector_tolerance: measures.eigenvector_tolerance,
            global_measures: None,
            local_measures: None,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: None,
            progress: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            graphs_dir: PathBuf::from("graphs"),
            results_dir: PathBuf::from("results"),
            plots_dir: PathBuf::from("plots"),
            missing_marker: "-".to_string(),
        }
    }
}

impl Config {
    /// Create new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from a file when it exists, defaults otherwise
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.is_file() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override settings from `<PREFIX>_*` environment variables
    pub fn with_env_overrides(mut self, prefix: &str) -> Self {
        let var = |name: &str| std::env::var(format!("{}_{}", prefix, name)).ok();

        if let Some(v) = var("USE_WEIGHTS").and_then(|v| v.parse().ok()) {
            self.analysis.use_weights = v;
        }
        if let Some(v) = var("STRONG_COMPONENTS").and_then(|v| v.parse().ok()) {
            self.analysis.strong_components = v;
        }
        if let Some(v) = var("EIGENVECTOR_MAX_ITER").and_then(|v| v.parse().ok()) {
            self.analysis.eigenvector_max_iter = v;
        }
        if let Some(v) = var("EIGENVECTOR_TOLERANCE").and_then(|v| v.parse().ok()) {
            self.analysis.eigenvector_tolerance = v;
        }
        if let Some(v) = var("DIRECTED").and_then(|v| v.parse().ok()) {
            self.ingest.directed = v;
        }
        if let Some(v) = var("WORKERS").and_then(|v| v.parse().ok()) {
            self.runtime.workers = Some(v);
        }
        if let Some(dir) = var("GRAPHS_DIR") {
            self.output.graphs_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("RESULTS_DIR") {
            self.output.results_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("PLOTS_DIR") {
            self.output.plots_dir = PathBuf::from(dir);
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.analysis.eigenvector_tolerance > 0.0) {
            return Err(ConfigError::Validation(
                "Eigenvector tolerance must be positive".to_string(),
            ));
        }

        if self.analysis.eigenvector_max_iter == 0 {
            return Err(ConfigError::Validation(
                "Eigenvector iteration cap must be at least 1".to_string(),
            ));
        }

        if self.runtime.workers == Some(0) {
            return Err(ConfigError::Validation(
                "Worker count must be at least 1".to_string(),
            ));
        }

        for (name, dir) in [
            ("graphs_dir", &self.output.graphs_dir),
            ("results_dir", &self.output.results_dir),
            ("plots_dir", &self.output.plots_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{} must not be empty", name)));
            }
        }

        let registry = MeasureRegistry::standard();
        let requested = self
            .analysis
            .global_measures
            .iter()
            .chain(self.analysis.local_measures.iter())
            .flatten();
        for name in requested {
            if !registry.contains(name) {
                return Err(ConfigError::Validation(format!("Unknown measure '{}'", name)));
            }
        }

        Ok(())
    }

    /// Settings handed to every measure function
    pub fn measure_config(&self) -> MeasureConfig {
        MeasureConfig {
            use_weights: self.analysis.use_weights,
            strong_components: self.analysis.strong_components,
            eigenvector_max_iter: self.analysis.eigenvector_max_iter,
            eigenvector_tolerance: self.analysis.eigenvector_tolerance,
        }
    }

    /// Number of workers, falling back to the available parallelism
    pub fn workers(&self) -> usize {
        self.runtime.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.missing_marker, "-");
        assert_eq!(config.measure_config(), MeasureConfig::default());
        assert!(config.workers() >= 1);
    }

    #[test]
    fn test_config_validation() {
        let mut invalid = Config::default();
        invalid.analysis.eigenvector_tolerance = 0.0;
        assert!(invalid.validate().is_err());

        let mut invalid = Config::default();
        invalid.runtime.workers = Some(0);
        assert!(invalid.validate().is_err());

        let mut invalid = Config::default();
        invalid.analysis.local_measures = Some(vec!["pagerank".to_string()]);
        assert!(invalid.validate().is_err());

        let mut invalid = Config::default();
        invalid.output.results_dir = PathBuf::new();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[analysis]\nuse_weights = true\n").unwrap();
        assert!(config.analysis.use_weights);
        assert_eq!(config.analysis.eigenvector_max_iter, 1000);
        assert_eq!(config.output.results_dir, PathBuf::from("results"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.analysis.global_measures = Some(vec!["density".to_string()]);
        config.runtime.workers = Some(2);
        config.to_file(&path).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), config);
        assert_eq!(
            Config::load_or_default(dir.path().join("missing.toml")).unwrap(),
            Config::default()
        );
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("NETMEASURES_CFGTEST_WORKERS", "3");
        std::env::set_var("NETMEASURES_CFGTEST_DIRECTED", "true");
        std::env::set_var("NETMEASURES_CFGTEST_USE_WEIGHTS", "not-a-bool");

        let config = Config::default().with_env_overrides("NETMEASURES_CFGTEST");

        assert_eq!(config.runtime.workers, Some(3));
        assert!(config.ingest.directed);
        assert!(!config.analysis.use_weights);
    }
}
