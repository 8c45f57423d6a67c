//! Local (per-node) measures.
//!
//! Every function returns a value for every node of the network, isolated
//! nodes included, so tabulated output is never ragged.

use super::{MeasureConfig, MeasureResult, NodeValues, Outcome};
use crate::error::MeasureError;
use crate::graph::{distances_from, shortest_path_tree, Network};

/// Collect `f(position)` for every node into a map keyed by node identifier
fn per_node(network: &Network, f: impl Fn(usize) -> f64) -> NodeValues {
    (0..network.node_count())
        .map(|i| (network.node(i).to_string(), f(i)))
        .collect()
}

fn from_vector(network: &Network, values: &[f64]) -> NodeValues {
    per_node(network, |i| values[i])
}

/// Degree, counting every edge (self-loops twice)
pub fn degree(network: &Network, _config: &MeasureConfig) -> MeasureResult<NodeValues> {
    Ok(Outcome::value(per_node(network, |i| network.degree(i) as f64)))
}

/// Weighted degree
pub fn strength(network: &Network, _config: &MeasureConfig) -> MeasureResult<NodeValues> {
    Ok(Outcome::value(per_node(network, |i| network.strength(i))))
}

/// In-degree of directed networks
pub fn in_degree(network: &Network, _config: &MeasureConfig) -> MeasureResult<NodeValues> {
    if !network.is_directed() {
        return Ok(Outcome::undefined("in-degree is undefined for undirected graph"));
    }
    Ok(Outcome::value(per_node(network, |i| network.in_degree(i) as f64)))
}

/// Out-degree of directed networks
pub fn out_degree(network: &Network, _config: &MeasureConfig) -> MeasureResult<NodeValues> {
    if !network.is_directed() {
        return Ok(Outcome::undefined("out-degree is undefined for undirected graph"));
    }
    Ok(Outcome::value(per_node(network, |i| network.out_degree(i) as f64)))
}

/// Degree centrality = degree / (n - 1)
///
/// All zeros for networks with fewer than two nodes.
pub fn degree_centrality(network: &Network, _config: &MeasureConfig) -> MeasureResult<NodeValues> {
    let n = network.node_count();
    if n <= 1 {
        return Ok(Outcome::value(per_node(network, |_| 0.0)));
    }

    let max_degree = (n - 1) as f64;
    Ok(Outcome::value(per_node(network, |i| {
        network.degree(i) as f64 / max_degree
    })))
}

/// Betweenness centrality (Brandes).
///
/// Each shortest path between a pair of other nodes contributes
/// `sigma_sv * sigma_vt / sigma_st` to `v`, so ties are shared fractionally
/// instead of picking one path. Normalized by `1 / ((n-1)(n-2))`.
pub fn betweenness_centrality(
    network: &Network,
    config: &MeasureConfig,
) -> MeasureResult<NodeValues> {
    let n = network.node_count();
    if n <= 2 {
        return Ok(Outcome::value(per_node(network, |_| 0.0)));
    }

    let mut centrality = vec![0.0; n];

    for source in 0..n {
        let tree = shortest_path_tree(network, source, config.use_weights);
        let mut dependency = vec![0.0; n];

        // Process nodes in order of decreasing distance
        for &w in tree.order.iter().rev() {
            let coefficient = (1.0 + dependency[w]) / tree.sigma[w];
            for &v in &tree.predecessors[w] {
                dependency[v] += tree.sigma[v] * coefficient;
            }
            if w != source {
                centrality[w] += dependency[w];
            }
        }
    }

    let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
    for value in &mut centrality {
        *value *= scale;
    }

    Ok(Outcome::value(from_vector(network, &centrality)))
}

/// Closeness centrality with the disconnected-graph correction.
///
/// For a node reaching `r - 1` other nodes at total distance `s`:
/// `((r-1)/s) * ((r-1)/(n-1))`. Nodes that reach nothing score 0.
pub fn closeness_centrality(
    network: &Network,
    config: &MeasureConfig,
) -> MeasureResult<NodeValues> {
    let n = network.node_count();
    if n <= 1 {
        return Ok(Outcome::value(per_node(network, |_| 0.0)));
    }

    let values: Vec<f64> = (0..n)
        .map(|source| {
            let distances = distances_from(network, source, config.use_weights);
            let (reached, total) = distances
                .iter()
                .enumerate()
                .filter(|&(v, _)| v != source)
                .filter_map(|(_, d)| *d)
                .fold((0usize, 0.0), |(count, sum), d| (count + 1, sum + d));

            if reached == 0 || total <= 0.0 {
                return 0.0;
            }

            let reached = reached as f64;
            (reached / total) * (reached / (n - 1) as f64)
        })
        .collect();

    Ok(Outcome::value(from_vector(network, &values)))
}

/// Eccentricity: greatest distance to any node reachable from the node.
///
/// Nodes that reach nothing score 0.
pub fn eccentricity(network: &Network, config: &MeasureConfig) -> MeasureResult<NodeValues> {
    Ok(Outcome::value(per_node(network, |source| {
        distances_from(network, source, config.use_weights)
            .iter()
            .enumerate()
            .filter(|&(v, _)| v != source)
            .filter_map(|(_, d)| *d)
            .fold(0.0, f64::max)
    })))
}

/// Eigenvector centrality by shifted power iteration.
///
/// Iterates `x <- (A + I)^T x` with L2 normalization separately on every
/// weakly connected component, so a small component is never drowned out
/// by a larger one. Directed networks use in-links (a node is central when
/// central nodes point to it). Edgeless components score 0 next to a
/// component with edges; a network without any edge is undefined.
pub fn eigenvector_centrality(
    network: &Network,
    config: &MeasureConfig,
) -> MeasureResult<NodeValues> {
    let n = network.node_count();
    let mut centrality = vec![0.0; n];
    let mut local_index = vec![usize::MAX; n];
    let mut iterated = false;

    for component in network.weak_components() {
        let has_links = component
            .iter()
            .any(|&v| !network.predecessors(v).is_empty());
        if !has_links {
            continue;
        }

        for (k, &v) in component.iter().enumerate() {
            local_index[v] = k;
        }

        let values = power_iteration(network, &component, &local_index, config)?;
        for (k, &v) in component.iter().enumerate() {
            centrality[v] = values[k];
        }
        iterated = true;
    }

    if !iterated {
        return Ok(Outcome::undefined(
            "eigenvector centrality is undefined for a graph without edges",
        ));
    }
    Ok(Outcome::value(from_vector(network, &centrality)))
}

fn power_iteration(
    network: &Network,
    component: &[usize],
    local_index: &[usize],
    config: &MeasureConfig,
) -> Result<Vec<f64>, MeasureError> {
    let size = component.len();
    let mut x = vec![1.0 / size as f64; size];

    for _ in 0..config.eigenvector_max_iter {
        let previous = x.clone();

        for (k, &v) in component.iter().enumerate() {
            let incoming: f64 = network
                .predecessors(v)
                .iter()
                .map(|link| {
                    let w = if config.use_weights { link.total } else { 1.0 };
                    previous[local_index[link.target]] * w
                })
                .sum();
            x[k] = previous[k] + incoming;
        }

        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(MeasureError::Numerical(format!(
                "power iteration norm is {}",
                norm
            )));
        }
        for value in &mut x {
            *value /= norm;
        }

        let diff: f64 = x.iter().zip(&previous).map(|(a, b)| (a - b).abs()).sum();
        if diff < size as f64 * config.eigenvector_tolerance {
            return Ok(x);
        }
    }

    Err(MeasureError::NonConvergent {
        iterations: config.eigenvector_max_iter,
    })
}

/// Fraction of a node's neighbor pairs that are linked.
///
/// Computed on the underlying simple undirected graph; 0 below degree 2.
/// With `use_weights` each closed pair counts the geometric mean of its
/// three normalized edge weights instead of 1.
pub fn local_clustering(network: &Network, config: &MeasureConfig) -> MeasureResult<NodeValues> {
    if config.use_weights {
        return Ok(Outcome::value(weighted_clustering(network)));
    }
    Ok(Outcome::value(per_node(network, |v| {
        let (closed, pairs) = neighbor_pairs(network, v);
        if pairs == 0 {
            0.0
        } else {
            closed as f64 / pairs as f64
        }
    })))
}

/// Weighted clustering with weights scaled by the heaviest pair weight
fn weighted_clustering(network: &Network) -> NodeValues {
    let max_weight = (0..network.node_count())
        .flat_map(|v| {
            network
                .simple_neighbors(v)
                .iter()
                .filter_map(move |&u| network.pair_weight(v, u))
        })
        .fold(0.0, f64::max);

    per_node(network, |v| {
        let neighbors = network.simple_neighbors(v);
        let k = neighbors.len();
        if k < 2 || max_weight <= 0.0 {
            return 0.0;
        }

        let scaled = |a: usize, b: usize| network.pair_weight(a, b).unwrap_or(0.0) / max_weight;
        let mut sum = 0.0;
        for i in 0..k {
            for j in (i + 1)..k {
                let (x, y) = (neighbors[i], neighbors[j]);
                if network.adjacent(x, y) {
                    sum += (scaled(v, x) * scaled(v, y) * scaled(x, y)).cbrt();
                }
            }
        }
        sum / (k * (k - 1) / 2) as f64
    })
}

/// `(linked neighbor pairs, all neighbor pairs)` around a node
pub(crate) fn neighbor_pairs(network: &Network, v: usize) -> (usize, usize) {
    let neighbors = network.simple_neighbors(v);
    let k = neighbors.len();
    if k < 2 {
        return (0, 0);
    }

    let mut closed = 0;
    for i in 0..k {
        for j in (i + 1)..k {
            if network.adjacent(neighbors[i], neighbors[j]) {
                closed += 1;
            }
        }
    }

    (closed, k * (k - 1) / 2)
}
