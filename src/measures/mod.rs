//! Measure computation engine.
//!
//! Every measure is a plain function from a read-only `Network` (plus the
//! measure configuration) to an `Outcome`. Global measures yield a `Scalar`,
//! local measures yield a value for every node. Measures are collected in a
//! `MeasureRegistry`, which runs them independently and turns errors into
//! per-measure failures.

pub mod global;
pub mod local;
mod registry;

pub use registry::{GlobalMeasureFn, LocalMeasureFn, MeasureRegistry};

use crate::error::MeasureError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-node values keyed by node identifier
pub type NodeValues = BTreeMap<String, f64>;

/// What a measure function returns
pub type MeasureResult<T> = Result<Outcome<T>, MeasureError>;

/// Result of one measure on one network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The measure was computed
    Success { value: T },
    /// The measure has no meaningful value for this network
    Undefined { reason: String },
    /// The measure could not be computed
    Failure { cause: String },
}

impl<T> Outcome<T> {
    /// Successful outcome
    pub fn value(value: T) -> Self {
        Outcome::Success { value }
    }

    /// Undefined outcome with a reason
    pub fn undefined(reason: impl Into<String>) -> Self {
        Outcome::Undefined {
            reason: reason.into(),
        }
    }

    /// Failed outcome with a cause
    pub fn failure(cause: impl Into<String>) -> Self {
        Outcome::Failure {
            cause: cause.into(),
        }
    }

    /// Computed value, if any
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Outcome::Success { value } => Some(value),
            _ => None,
        }
    }

    /// Status of this outcome
    pub fn status(&self) -> MeasureStatus {
        match self {
            Outcome::Success { .. } => MeasureStatus::Success,
            Outcome::Undefined { .. } => MeasureStatus::Undefined,
            Outcome::Failure { .. } => MeasureStatus::Failure,
        }
    }

    /// Reason or cause for non-successful outcomes
    pub fn detail(&self) -> Option<&str> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Undefined { reason } => Some(reason),
            Outcome::Failure { cause } => Some(cause),
        }
    }

    /// Map the successful value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success { value } => Outcome::Success { value: f(value) },
            Outcome::Undefined { reason } => Outcome::Undefined { reason },
            Outcome::Failure { cause } => Outcome::Failure { cause },
        }
    }
}

/// Per-measure status recorded in an analysis record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureStatus {
    Success,
    Undefined,
    Failure,
}

impl std::fmt::Display for MeasureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasureStatus::Success => write!(f, "success"),
            MeasureStatus::Undefined => write!(f, "undefined"),
            MeasureStatus::Failure => write!(f, "failure"),
        }
    }
}

/// Node set a global value was computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// Every node of the network
    #[default]
    Whole,
    /// Only the largest (weakly) connected component
    LargestComponent { nodes: usize, total: usize },
}

impl Scope {
    pub fn is_whole(&self) -> bool {
        matches!(self, Scope::Whole)
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Whole => write!(f, "whole"),
            Scope::LargestComponent { nodes, total } => {
                write!(f, "largest_component({}/{})", nodes, total)
            }
        }
    }
}

/// A global measure value together with its scope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scalar {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Scope::is_whole")]
    pub scope: Scope,
}

impl Scalar {
    /// Value computed over the whole network
    pub fn whole(value: f64) -> Self {
        Self {
            value,
            scope: Scope::Whole,
        }
    }

    /// Value computed over a restricted node set
    pub fn scoped(value: f64, scope: Scope) -> Self {
        Self { value, scope }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::whole(value)
    }
}

/// Values that must be finite to be recorded as a success
pub trait Finite {
    /// Description of the first non-finite value, if any
    fn non_finite(&self) -> Option<String>;
}

impl Finite for Scalar {
    fn non_finite(&self) -> Option<String> {
        (!self.value.is_finite()).then(|| format!("non-finite value {}", self.value))
    }
}

impl Finite for NodeValues {
    fn non_finite(&self) -> Option<String> {
        self.iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(node, v)| format!("non-finite value {} at node '{}'", v, node))
    }
}

/// Parameters shared by all measure functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureConfig {
    /// Use edge weights for path lengths and eigenvector centrality
    pub use_weights: bool,
    /// Count strongly instead of weakly connected components (directed only)
    pub strong_components: bool,
    /// Iteration cap for eigenvector power iteration
    pub eigenvector_max_iter: usize,
    /// Relative convergence tolerance for eigenvector power iteration
    pub eigenvector_tolerance: f64,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            use_weights: false,
            strong_components: false,
            eigenvector_max_iter: 1000,
            eigenvector_tolerance: 1e-6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_status() {
        assert_eq!(Outcome::value(1.0).status(), MeasureStatus::Success);
        assert_eq!(Outcome::<f64>::undefined("x").status(), MeasureStatus::Undefined);
        assert_eq!(Outcome::<f64>::failure("y").detail(), Some("y"));
    }

    #[test]
    fn test_scalar_serialization_hides_whole_scope() {
        let whole = serde_json::to_string(&Scalar::whole(0.5)).unwrap();
        assert_eq!(whole, r#"{"value":0.5}"#);

        let scoped = Scalar::scoped(2.0, Scope::LargestComponent { nodes: 3, total: 5 });
        let json = serde_json::to_string(&scoped).unwrap();
        assert!(json.contains("largest_component"));
        let parsed: Scalar = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, scoped);
    }

    #[test]
    fn test_non_finite_detection() {
        let mut values = NodeValues::new();
        values.insert("A".to_string(), 1.0);
        assert!(values.non_finite().is_none());
        values.insert("B".to_string(), f64::NAN);
        assert!(values.non_finite().unwrap().contains("'B'"));
    }
}
