//! Global categorical and scalar assortativity.
//!
//! For directed networks the two ends of a tie are counted separately:
//! sources by out-degree, targets by in-degree. On an undirected network
//! both reduce to the ordinary degree.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};
use crate::network::SocialNetwork;
use crate::population::AgentType;

/// Per-type degree shares and the normalising constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalAssortValues {
    /// Share of outgoing tie ends held by each type, indexed by [`AgentType::index`]
    pub a_g: [f64; 2],
    /// Share of incoming tie ends held by each type (equals `a_g` when undirected)
    pub b_g: [f64; 2],
    /// `1 − Σ a_g·b_g`, the largest attainable modularity
    pub q_max: f64,
}

impl GlobalAssortValues {
    /// Expected same-type share under random mixing, `Σ a_g·b_g`.
    pub fn expected(&self) -> f64 {
        self.a_g.iter().zip(&self.b_g).map(|(a, b)| a * b).sum()
    }
}

pub(crate) fn check_len(network: &SocialNetwork, len: usize, what: &str) -> Result<()> {
    if network.len() != len {
        return Err(CascadeError::DimensionMismatch(format!(
            "network has {} agents, {what} has {len}",
            network.len()
        )));
    }
    Ok(())
}

fn type_shares(degrees: &Array1<f64>, types: &[AgentType], total: f64) -> [f64; 2] {
    let mut shares = [0.0; 2];
    for (degree, t) in degrees.iter().zip(types) {
        shares[t.index()] += degree / total;
    }
    shares
}

/// Degree share of each type over all tie ends.
pub fn global_assort_values(network: &SocialNetwork, types: &[AgentType]) -> Result<GlobalAssortValues> {
    check_len(network, types.len(), "types")?;
    let total = network.total_weight();
    if total <= 0.0 {
        return Err(CascadeError::EmptyNetwork);
    }

    let a_g = type_shares(&network.degrees(), types, total);
    let b_g = if network.is_directed() {
        type_shares(&network.in_degrees(), types, total)
    } else {
        a_g
    };
    let mut values = GlobalAssortValues { a_g, b_g, q_max: 0.0 };
    values.q_max = 1.0 - values.expected();
    Ok(values)
}

/// Row-wise share of each agent's tie weight going to each type.
///
/// `normalized_network` must already be row-normalised (see
/// [`SocialNetwork::transition_matrix`]). Returns an `n × 2` matrix.
pub fn connections_by_type(normalized_network: &Array2<f64>, types: &[AgentType]) -> Array2<f64> {
    let n = normalized_network.nrows();
    let mut by_type = Array2::zeros((n, AgentType::ALL.len()));
    for (i, row) in normalized_network.rows().into_iter().enumerate() {
        for (w, t) in row.iter().zip(types) {
            by_type[[i, t.index()]] += w;
        }
    }
    by_type
}

/// Newman's categorical assortativity coefficient.
///
/// `r = (Σ_g e_gg − Σ_g a_g·b_g) / Q_max`, where `e_gg` is the fraction of
/// ties joining two agents of type `g`. Lies in `[-1, 1]`.
pub fn global_assortativity(network: &SocialNetwork, types: &[AgentType]) -> Result<f64> {
    let values = global_assort_values(network, types)?;
    if values.q_max <= f64::EPSILON {
        return Err(CascadeError::DegenerateTypes);
    }

    let total = network.total_weight();
    let mut e_gg = 0.0;
    for ((i, j), w) in network.adjacency().indexed_iter() {
        if *w > 0.0 && types[i] == types[j] {
            e_gg += w / total;
        }
    }
    Ok((e_gg - values.expected()) / values.q_max)
}

fn standardize(weights: &Array1<f64>, values: &[f64]) -> Result<Vec<f64>> {
    let total = weights.sum();
    if total <= 0.0 {
        return Err(CascadeError::EmptyNetwork);
    }

    let mean = weights.iter().zip(values).map(|(d, x)| d * x).sum::<f64>() / total;
    let variance = weights
        .iter()
        .zip(values)
        .map(|(d, x)| d * (x - mean).powi(2))
        .sum::<f64>()
        / total;
    if variance <= f64::EPSILON * f64::EPSILON {
        return Err(CascadeError::DegenerateTrait);
    }

    let sd = variance.sqrt();
    Ok(values.iter().map(|x| (x - mean) / sd).collect())
}

/// Trait standardised as seen from each end of a tie.
///
/// Sources are weighted by out-degree and targets by in-degree, so the
/// weighted mean of each is zero and its variance one over the ties. The
/// two coincide on an undirected network.
pub(crate) struct Standardized {
    pub(crate) source: Vec<f64>,
    pub(crate) target: Vec<f64>,
}

pub(crate) fn standardize_by_degree(network: &SocialNetwork, values: &[f64]) -> Result<Standardized> {
    check_len(network, values.len(), "trait")?;
    let source = standardize(&network.degrees(), values)?;
    let target = if network.is_directed() {
        standardize(&network.in_degrees(), values)?
    } else {
        source.clone()
    };
    Ok(Standardized { source, target })
}

/// Pearson assortativity of a scalar trait over ties.
pub fn global_trait_assortativity(network: &SocialNetwork, values: &[f64]) -> Result<f64> {
    let z = standardize_by_degree(network, values)?;
    let total = network.total_weight();
    let sum: f64 = network
        .adjacency()
        .indexed_iter()
        .map(|((i, j), w)| w * z.source[i] * z.target[j])
        .sum();
    Ok(sum / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use AgentType::{A, B};

    fn two_cliques_bridged() -> SocialNetwork {
        // 0-1-2 triangle of A, 3-4-5 triangle of B, bridge 2-3
        let mut net = SocialNetwork::empty(6, false);
        for (a, b) in [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)] {
            net.add_tie(a, b).unwrap();
        }
        net
    }

    #[test]
    fn test_assort_values() {
        let net = two_cliques_bridged();
        let types = [A, A, A, B, B, B];
        let v = global_assort_values(&net, &types).unwrap();
        assert!((v.a_g[0] - 0.5).abs() < 1e-12);
        assert!((v.a_g[1] - 0.5).abs() < 1e-12);
        assert!((v.q_max - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_segregated_network_is_assortative() {
        let net = two_cliques_bridged();
        let r = global_assortativity(&net, &[A, A, A, B, B, B]).unwrap();
        // e_gg = 12/14
        assert!((r - (12.0 / 14.0 - 0.5) / 0.5).abs() < 1e-12);
        assert!(r > 0.0 && r <= 1.0);
    }

    #[test]
    fn test_bipartite_is_disassortative() {
        let mut net = SocialNetwork::empty(4, false);
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
            net.add_tie(a, b).unwrap();
        }
        let r = global_assortativity(&net, &[A, B, A, B]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        let net = two_cliques_bridged();
        assert!(matches!(
            global_assortativity(&net, &[A; 6]),
            Err(CascadeError::DegenerateTypes)
        ));
        assert!(matches!(
            global_assort_values(&SocialNetwork::empty(4, false), &[A, A, B, B]),
            Err(CascadeError::EmptyNetwork)
        ));
        assert!(matches!(
            global_trait_assortativity(&net, &[0.5; 6]),
            Err(CascadeError::DegenerateTrait)
        ));
    }

    #[test]
    fn test_connections_by_type_rows_sum_to_one() {
        let net = two_cliques_bridged();
        let by_type = connections_by_type(&net.transition_matrix(), &[A, A, A, B, B, B]);
        assert_eq!(by_type.dim(), (6, 2));
        for row in by_type.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
        assert!((by_type[[2, 1]] - 1.0 / 3.0).abs() < 1e-12);
    }

    fn sparse_directed() -> SocialNetwork {
        let mut net = SocialNetwork::empty(4, true);
        for (a, b) in [(0, 2), (0, 3), (1, 2), (2, 0)] {
            net.add_tie(a, b).unwrap();
        }
        net
    }

    #[test]
    fn test_directed_uses_in_degree_shares() {
        let v = global_assort_values(&sparse_directed(), &[A, A, B, B]).unwrap();
        assert_eq!(v.a_g, [0.75, 0.25]);
        assert_eq!(v.b_g, [0.25, 0.75]);
        assert!((v.q_max - 0.625).abs() < 1e-12);
    }

    #[test]
    fn test_directed_cross_type_ties_stay_bounded() {
        // Every tie crosses types: r = -0.375 / 0.625
        let r = global_assortativity(&sparse_directed(), &[A, A, B, B]).unwrap();
        assert!((r + 0.6).abs() < 1e-12);
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn test_directed_trait_assortativity_bounded() {
        let net = sparse_directed();
        for values in [[0.1, 0.2, 0.9, 0.8], [0.9, 0.1, 0.5, 0.3], [0.2, 0.2, 0.7, 0.1]] {
            let r = global_trait_assortativity(&net, &values).unwrap();
            assert!(r.abs() <= 1.0 + 1e-12, "{values:?}: {r}");
        }
    }

    #[test]
    fn test_undirected_shares_match() {
        let v = global_assort_values(&two_cliques_bridged(), &[A, A, A, B, B, B]).unwrap();
        assert_eq!(v.a_g, v.b_g);
    }

    #[test]
    fn test_trait_assortativity_bounds() {
        let net = two_cliques_bridged();
        let r = global_trait_assortativity(&net, &[0.1, 0.2, 0.15, 0.8, 0.9, 0.85]).unwrap();
        assert!(r > 0.0 && r <= 1.0 + 1e-12);
    }
}
