//! Global (whole-network) measures.

use super::local;
use super::{MeasureConfig, MeasureResult, NodeValues, Outcome, Scalar, Scope};
use crate::error::MeasureError;
use crate::graph::{distances_from, Network};
use crate::utils::Stats;

/// Number of nodes
pub fn num_nodes(network: &Network, _config: &MeasureConfig) -> MeasureResult<Scalar> {
    Ok(Outcome::value(Scalar::whole(network.node_count() as f64)))
}

/// Number of edges as ingested
pub fn num_edges(network: &Network, _config: &MeasureConfig) -> MeasureResult<Scalar> {
    Ok(Outcome::value(Scalar::whole(network.edge_count() as f64)))
}

/// Mean degree
pub fn avg_degree(network: &Network, _config: &MeasureConfig) -> MeasureResult<Scalar> {
    let degrees: Vec<f64> = (0..network.node_count())
        .map(|i| network.degree(i) as f64)
        .collect();
    Ok(match Stats::mean(&degrees) {
        Some(mean) => Outcome::value(Scalar::whole(mean)),
        None => Outcome::undefined("empty graph"),
    })
}

/// Density = |E| / (n(n-1)), doubled numerator for undirected networks
pub fn density(network: &Network, _config: &MeasureConfig) -> MeasureResult<Scalar> {
    let n = network.node_count();
    if n < 2 {
        return Ok(Outcome::undefined("density is undefined for fewer than 2 nodes"));
    }

    let edges = network.simple_edge_count() as f64;
    let possible = (n * (n - 1)) as f64;
    let value = if network.is_directed() {
        edges / possible
    } else {
        2.0 * edges / possible
    };
    Ok(Outcome::value(Scalar::whole(value)))
}

/// Reachable-pair statistics over the path scope
struct PathProfile {
    scope: Scope,
    pairs: usize,
    total: f64,
    longest: f64,
    /// Eccentricity of every scoped node that reaches at least one other node
    eccentricities: Vec<f64>,
}

/// Walk all ordered reachable pairs inside the path scope.
///
/// The scope is the whole network when it is (weakly) connected and the
/// largest weak component otherwise. Unreachable pairs are skipped, never
/// counted as infinite or zero.
fn path_profile(network: &Network, config: &MeasureConfig) -> Option<PathProfile> {
    let components = network.weak_components();
    let members = components.first()?;
    let scope = if components.len() > 1 {
        Scope::LargestComponent {
            nodes: members.len(),
            total: network.node_count(),
        }
    } else {
        Scope::Whole
    };

    let mut profile = PathProfile {
        scope,
        pairs: 0,
        total: 0.0,
        longest: 0.0,
        eccentricities: Vec::new(),
    };

    for &source in members {
        let distances = distances_from(network, source, config.use_weights);
        let mut eccentricity: Option<f64> = None;

        for &target in members {
            if target == source {
                continue;
            }
            if let Some(d) = distances[target] {
                profile.pairs += 1;
                profile.total += d;
                profile.longest = profile.longest.max(d);
                eccentricity = Some(eccentricity.map_or(d, |e: f64| e.max(d)));
            }
        }

        if let Some(e) = eccentricity {
            profile.eccentricities.push(e);
        }
    }

    Some(profile)
}

/// Mean shortest-path distance over ordered reachable pairs
pub fn average_shortest_path(network: &Network, config: &MeasureConfig) -> MeasureResult<Scalar> {
    let profile = match path_profile(network, config) {
        Some(p) if p.pairs > 0 => p,
        _ => return Ok(Outcome::undefined("no reachable node pairs")),
    };
    Ok(Outcome::value(Scalar::scoped(
        profile.total / profile.pairs as f64,
        profile.scope,
    )))
}

/// Longest shortest path over ordered reachable pairs
pub fn diameter(network: &Network, config: &MeasureConfig) -> MeasureResult<Scalar> {
    let profile = match path_profile(network, config) {
        Some(p) if p.pairs > 0 => p,
        _ => return Ok(Outcome::undefined("no reachable node pairs")),
    };
    Ok(Outcome::value(Scalar::scoped(profile.longest, profile.scope)))
}

/// Smallest eccentricity among scoped nodes that reach another node
pub fn radius(network: &Network, config: &MeasureConfig) -> MeasureResult<Scalar> {
    let profile = match path_profile(network, config) {
        Some(p) if !p.eccentricities.is_empty() => p,
        _ => return Ok(Outcome::undefined("no reachable node pairs")),
    };
    let radius = profile
        .eccentricities
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    Ok(Outcome::value(Scalar::scoped(radius, profile.scope)))
}

/// Transitivity: closed triplets over all connected triplets
pub fn global_clustering(network: &Network, _config: &MeasureConfig) -> MeasureResult<Scalar> {
    let (closed, triplets) = (0..network.node_count())
        .map(|v| local::neighbor_pairs(network, v))
        .fold((0usize, 0usize), |(c, t), (closed, pairs)| {
            (c + closed, t + pairs)
        });

    let value = if triplets == 0 {
        0.0
    } else {
        closed as f64 / triplets as f64
    };
    Ok(Outcome::value(Scalar::whole(value)))
}

/// Number of connected components (weak unless strong ones are requested)
pub fn connected_components(network: &Network, config: &MeasureConfig) -> MeasureResult<Scalar> {
    let count = if config.strong_components {
        network.strong_components().len()
    } else {
        network.weak_components().len()
    };
    Ok(Outcome::value(Scalar::whole(count as f64)))
}

/// Minimum number of nodes whose removal disconnects the network.
///
/// 0 when disconnected (not strongly connected, for directed networks).
pub fn node_connectivity(network: &Network, _config: &MeasureConfig) -> MeasureResult<Scalar> {
    if network.node_count() < 2 {
        return Ok(Outcome::undefined(
            "node connectivity is undefined for fewer than 2 nodes",
        ));
    }
    let value = crate::graph::node_connectivity(network);
    Ok(Outcome::value(Scalar::whole(value as f64)))
}

/// Minimum number of edges whose removal disconnects the network
pub fn edge_connectivity(network: &Network, _config: &MeasureConfig) -> MeasureResult<Scalar> {
    if network.node_count() < 2 {
        return Ok(Outcome::undefined(
            "edge connectivity is undefined for fewer than 2 nodes",
        ));
    }
    let value = crate::graph::edge_connectivity(network);
    Ok(Outcome::value(Scalar::whole(value as f64)))
}

/// Degree assortativity coefficient.
///
/// Undirected networks pair the degrees at both ends of every edge in both
/// orientations; directed networks pair the source's out-degree with the
/// target's in-degree.
pub fn degree_assortativity(network: &Network, _config: &MeasureConfig) -> MeasureResult<Scalar> {
    let mut xs = Vec::with_capacity(network.edge_count() * 2);
    let mut ys = Vec::with_capacity(network.edge_count() * 2);

    for (s, t, _) in network.edge_positions() {
        if network.is_directed() {
            xs.push(network.out_degree(s) as f64);
            ys.push(network.in_degree(t) as f64);
        } else {
            let (ds, dt) = (network.degree(s) as f64, network.degree(t) as f64);
            xs.extend([ds, dt]);
            ys.extend([dt, ds]);
        }
    }

    if xs.is_empty() {
        return Ok(Outcome::undefined("assortativity is undefined without edges"));
    }

    Ok(match Stats::pearson(&xs, &ys) {
        Some(r) => Outcome::value(Scalar::whole(r)),
        None => Outcome::undefined("zero degree variance"),
    })
}

/// Mean local clustering coefficient
pub fn avg_clustering(network: &Network, config: &MeasureConfig) -> MeasureResult<Scalar> {
    mean_of("local_clustering", local::local_clustering(network, config))
}

/// Mean degree centrality
pub fn avg_degree_centrality(network: &Network, config: &MeasureConfig) -> MeasureResult<Scalar> {
    mean_of("degree_centrality", local::degree_centrality(network, config))
}

/// Mean betweenness centrality
pub fn avg_betweenness_centrality(
    network: &Network,
    config: &MeasureConfig,
) -> MeasureResult<Scalar> {
    mean_of(
        "betweenness_centrality",
        local::betweenness_centrality(network, config),
    )
}

/// Mean closeness centrality
pub fn avg_closeness_centrality(
    network: &Network,
    config: &MeasureConfig,
) -> MeasureResult<Scalar> {
    mean_of(
        "closeness_centrality",
        local::closeness_centrality(network, config),
    )
}

/// Mean eigenvector centrality
pub fn avg_eigenvector_centrality(
    network: &Network,
    config: &MeasureConfig,
) -> MeasureResult<Scalar> {
    mean_of(
        "eigenvector_centrality",
        local::eigenvector_centrality(network, config),
    )
}

/// Average a local measure, carrying its undefined or failed state over
fn mean_of(measure: &str, result: MeasureResult<NodeValues>) -> MeasureResult<Scalar> {
    let outcome = result.map_err(|e| MeasureError::Dependency {
        measure: measure.to_string(),
        cause: e.to_string(),
    })?;

    match outcome {
        Outcome::Success { value } => {
            let values: Vec<f64> = value.into_values().collect();
            Ok(match Stats::mean(&values) {
                Some(mean) => Outcome::value(Scalar::whole(mean)),
                None => Outcome::undefined("empty graph"),
            })
        }
        Outcome::Undefined { reason } => Ok(Outcome::undefined(reason)),
        Outcome::Failure { cause } => Err(MeasureError::Dependency {
            measure: measure.to_string(),
            cause,
        }),
    }
}
