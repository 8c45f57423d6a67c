//! Registry of measure functions.

use super::{global, local};
use super::{Finite, MeasureConfig, MeasureResult, NodeValues, Outcome, Scalar};
use crate::error::{Error, Result};
use crate::graph::Network;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Global measure function type: network → scalar outcome
pub type GlobalMeasureFn = fn(&Network, &MeasureConfig) -> MeasureResult<Scalar>;

/// Local measure function type: network → per-node outcome
pub type LocalMeasureFn = fn(&Network, &MeasureConfig) -> MeasureResult<NodeValues>;

/// Registry of global and local measures, keyed by name.
///
/// Names are unique across both suites so a single status map can describe
/// a whole analysis.
#[derive(Debug, Clone, Default)]
pub struct MeasureRegistry {
    global: BTreeMap<String, GlobalMeasureFn>,
    local: BTreeMap<String, LocalMeasureFn>,
}

impl MeasureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in measure
    pub fn standard() -> Self {
        let mut registry = Self::new();

        let globals: [(&str, GlobalMeasureFn); 17] = [
            ("num_nodes", global::num_nodes),
            ("num_edges", global::num_edges),
            ("avg_degree", global::avg_degree),
            ("density", global::density),
            ("average_shortest_path", global::average_shortest_path),
            ("diameter", global::diameter),
            ("radius", global::radius),
            ("global_clustering", global::global_clustering),
            ("avg_clustering", global::avg_clustering),
            ("connected_components", global::connected_components),
            ("node_connectivity", global::node_connectivity),
            ("edge_connectivity", global::edge_connectivity),
            ("degree_assortativity", global::degree_assortativity),
            ("avg_degree_centrality", global::avg_degree_centrality),
            ("avg_betweenness_centrality", global::avg_betweenness_centrality),
            ("avg_closeness_centrality", global::avg_closeness_centrality),
            ("avg_eigenvector_centrality", global::avg_eigenvector_centrality),
        ];

        let locals: [(&str, LocalMeasureFn); 10] = [
            ("degree", local::degree),
            ("strength", local::strength),
            ("in_degree", local::in_degree),
            ("out_degree", local::out_degree),
            ("degree_centrality", local::degree_centrality),
            ("betweenness_centrality", local::betweenness_centrality),
            ("closeness_centrality", local::closeness_centrality),
            ("eigenvector_centrality", local::eigenvector_centrality),
            ("local_clustering", local::local_clustering),
            ("eccentricity", local::eccentricity),
        ];

        for (name, f) in globals {
            registry.global.insert(name.to_string(), f);
        }
        for (name, f) in locals {
            registry.local.insert(name.to_string(), f);
        }

        registry
    }

    /// Register a global measure
    pub fn register_global(&mut self, name: impl Into<String>, f: GlobalMeasureFn) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(Error::DuplicateMeasure(name));
        }
        self.global.insert(name, f);
        Ok(())
    }

    /// Register a local measure
    pub fn register_local(&mut self, name: impl Into<String>, f: LocalMeasureFn) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(Error::DuplicateMeasure(name));
        }
        self.local.insert(name, f);
        Ok(())
    }

    /// Check whether a measure name is registered in either suite
    pub fn contains(&self, name: &str) -> bool {
        self.global.contains_key(name) || self.local.contains_key(name)
    }

    /// Keep only the named measures.
    ///
    /// `None` keeps the whole suite; an unknown name is an error.
    pub fn select(mut self, global: Option<&[String]>, local: Option<&[String]>) -> Result<Self> {
        if let Some(names) = global {
            if let Some(unknown) = names.iter().find(|n| !self.global.contains_key(*n)) {
                return Err(Error::UnknownMeasure(unknown.clone()));
            }
            self.global.retain(|name, _| names.contains(name));
        }
        if let Some(names) = local {
            if let Some(unknown) = names.iter().find(|n| !self.local.contains_key(*n)) {
                return Err(Error::UnknownMeasure(unknown.clone()));
            }
            self.local.retain(|name, _| names.contains(name));
        }
        Ok(self)
    }

    /// Names of the global measures, sorted
    pub fn global_names(&self) -> Vec<&str> {
        self.global.keys().map(String::as_str).collect()
    }

    /// Names of the local measures, sorted
    pub fn local_names(&self) -> Vec<&str> {
        self.local.keys().map(String::as_str).collect()
    }

    /// Evaluate one global measure, `None` if it is not registered
    pub fn evaluate_global(
        &self,
        name: &str,
        network: &Network,
        config: &MeasureConfig,
    ) -> Option<Outcome<Scalar>> {
        let f = self.global.get(name)?;
        Some(guard(network.id(), name, f(network, config)))
    }

    /// Evaluate one local measure, `None` if it is not registered
    pub fn evaluate_local(
        &self,
        name: &str,
        network: &Network,
        config: &MeasureConfig,
    ) -> Option<Outcome<NodeValues>> {
        let f = self.local.get(name)?;
        Some(guard(network.id(), name, f(network, config)))
    }

    /// Run every global measure independently
    pub fn run_global(
        &self,
        network: &Network,
        config: &MeasureConfig,
    ) -> BTreeMap<String, Outcome<Scalar>> {
        self.global
            .par_iter()
            .map(|(name, f)| (name.clone(), guard(network.id(), name, f(network, config))))
            .collect()
    }

    /// Run every local measure independently
    pub fn run_local(
        &self,
        network: &Network,
        config: &MeasureConfig,
    ) -> BTreeMap<String, Outcome<NodeValues>> {
        self.local
            .par_iter()
            .map(|(name, f)| (name.clone(), guard(network.id(), name, f(network, config))))
            .collect()
    }
}

/// Uniform failure wrapper shared by every measure.
///
/// Errors become `Failure` outcomes and so do non-finite values, which
/// would otherwise slip through as numbers.
fn guard<T: Finite>(network: &str, measure: &str, result: MeasureResult<T>) -> Outcome<T> {
    match result {
        Ok(Outcome::Success { value }) => match value.non_finite() {
            Some(cause) => {
                warn!(network, measure, %cause, "measure produced a non-finite value");
                Outcome::failure(cause)
            }
            None => Outcome::value(value),
        },
        Ok(Outcome::Undefined { reason }) => {
            debug!(network, measure, %reason, "measure undefined");
            Outcome::undefined(reason)
        }
        Ok(Outcome::Failure { cause }) => {
            warn!(network, measure, %cause, "measure failed");
            Outcome::failure(cause)
        }
        Err(e) => {
            warn!(network, measure, error = %e, "measure failed");
            Outcome::failure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeasureError;
    use crate::graph::{GraphKind, NetworkBuilder};

    fn broken(_: &Network, _: &MeasureConfig) -> MeasureResult<Scalar> {
        Err(MeasureError::Numerical("division by zero".to_string()))
    }

    fn infinite(_: &Network, _: &MeasureConfig) -> MeasureResult<Scalar> {
        Ok(Outcome::value(Scalar::whole(f64::INFINITY)))
    }

    fn path() -> Network {
        NetworkBuilder::from_edges("p", GraphKind::Undirected, &[("A", "B"), ("B", "C")]).unwrap()
    }

    #[test]
    fn test_standard_registry() {
        let registry = MeasureRegistry::standard();
        assert!(registry.contains("density"));
        assert!(registry.contains("betweenness_centrality"));
        assert!(registry.contains("node_connectivity"));
        assert!(registry.contains("edge_connectivity"));
        assert!(!registry.contains("pagerank"));
    }

    #[test]
    fn test_failure_is_isolated() {
        let mut registry = MeasureRegistry::standard();
        registry.register_global("broken", broken).unwrap();
        registry.register_global("infinite", infinite).unwrap();

        let results = registry.run_global(&path(), &MeasureConfig::default());

        assert!(matches!(results["broken"], Outcome::Failure { .. }));
        assert!(matches!(results["infinite"], Outcome::Failure { .. }));
        assert!(matches!(results["density"], Outcome::Success { .. }));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = MeasureRegistry::standard();
        assert!(registry.register_global("degree", broken).is_err());
    }

    #[test]
    fn test_select() {
        let only_density = vec!["density".to_string()];
        let no_locals: Vec<String> = Vec::new();
        let registry = MeasureRegistry::standard()
            .select(Some(only_density.as_slice()), Some(no_locals.as_slice()))
            .unwrap();
        assert_eq!(registry.global_names(), vec!["density"]);
        assert!(registry.local_names().is_empty());

        let nope = vec!["nope".to_string()];
        let unknown = MeasureRegistry::standard().select(Some(nope.as_slice()), None);
        assert!(matches!(unknown, Err(Error::UnknownMeasure(_))));
    }
}
