//! Local assortativity weighted by personalized PageRank.

use super::global::{check_len, connections_by_type, global_assort_values, standardize_by_degree};
use super::pagerank::{personalized_pagerank_with, PageRankSettings};
use crate::error::{CascadeError, Result};
use crate::network::SocialNetwork;
use crate::population::AgentType;

/// Local categorical assortativity of every agent.
///
/// `r_i = Σ_g (Σ_{j ∈ g} kernel[i, j] · by_type[j, g] − a_g·b_g) / Q_max`,
/// with `b_g` the in-degree share on directed networks.
/// Zero-degree agents have no neighbourhood and get `NaN`.
pub fn local_assortativity(network: &SocialNetwork, types: &[AgentType], alpha: f64) -> Result<Vec<f64>> {
    local_assortativity_with(network, types, PageRankSettings::with_alpha(alpha))
}

/// [`local_assortativity`] with explicit PageRank settings.
pub fn local_assortativity_with(
    network: &SocialNetwork,
    types: &[AgentType],
    settings: PageRankSettings,
) -> Result<Vec<f64>> {
    let values = global_assort_values(network, types)?;
    if values.q_max <= f64::EPSILON {
        return Err(CascadeError::DegenerateTypes);
    }

    let by_type = connections_by_type(&network.transition_matrix(), types);
    let kernel = personalized_pagerank_with(network, settings)?;
    let degrees = network.degrees();

    Ok((0..network.len())
        .map(|i| {
            if degrees[i] == 0.0 {
                return f64::NAN;
            }
            let deviation: f64 = AgentType::ALL
                .iter()
                .map(|g| {
                    let e_gg: f64 = types
                        .iter()
                        .enumerate()
                        .filter(|(_, t)| *t == g)
                        .map(|(j, _)| kernel[[i, j]] * by_type[[j, g.index()]])
                        .sum();
                    e_gg - values.a_g[g.index()] * values.b_g[g.index()]
                })
                .sum();
            deviation / values.q_max
        })
        .collect())
}

/// Local assortativity of a scalar trait such as the threshold.
///
/// Traits are standardised with degree-weighted mean and deviation (in-degree
/// for the target end of a directed tie). Each agent's correlation with its
/// direct neighbours, `c_i = Σ_j (A_ij / k_i) · x̂_i · x̂_j`, is then averaged over its
/// PageRank neighbourhood. Zero-degree agents get `NaN`.
pub fn local_assortativity_continuous(
    network: &SocialNetwork,
    values: &[f64],
    alpha: f64,
) -> Result<Vec<f64>> {
    local_assortativity_continuous_with(network, values, PageRankSettings::with_alpha(alpha))
}

/// [`local_assortativity_continuous`] with explicit PageRank settings.
pub fn local_assortativity_continuous_with(
    network: &SocialNetwork,
    values: &[f64],
    settings: PageRankSettings,
) -> Result<Vec<f64>> {
    check_len(network, values.len(), "trait")?;
    let z = standardize_by_degree(network, values)?;
    let normalized = network.transition_matrix();

    let neighbour_corr: Vec<f64> = normalized
        .rows()
        .into_iter()
        .zip(&z.source)
        .map(|(row, xi)| row.iter().zip(&z.target).map(|(w, xj)| w * xi * xj).sum())
        .collect();

    let kernel = personalized_pagerank_with(network, settings)?;
    let degrees = network.degrees();

    Ok(kernel
        .rows()
        .into_iter()
        .enumerate()
        .map(|(i, weights)| {
            if degrees[i] == 0.0 {
                f64::NAN
            } else {
                weights.iter().zip(&neighbour_corr).map(|(w, c)| w * c).sum()
            }
        })
        .collect())
}

/// Degree-weighted mean of `local`, skipping `NaN` entries.
pub fn degree_weighted_mean(network: &SocialNetwork, local: &[f64]) -> Result<f64> {
    check_len(network, local.len(), "local values")?;
    let (weighted, total) = network
        .degrees()
        .iter()
        .zip(local)
        .filter(|(_, r)| !r.is_nan())
        .fold((0.0, 0.0), |(sum, total), (d, r)| (sum + d * r, total + d));
    if total <= 0.0 {
        return Err(CascadeError::EmptyNetwork);
    }
    Ok(weighted / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assortativity::{global_assortativity, global_trait_assortativity};
    use AgentType::{A, B};

    fn two_cliques_bridged() -> SocialNetwork {
        let mut net = SocialNetwork::empty(6, false);
        for (a, b) in [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)] {
            net.add_tie(a, b).unwrap();
        }
        net
    }

    #[test]
    fn test_global_limit_matches_newman() {
        let net = two_cliques_bridged();
        let types = [A, A, A, B, B, B];
        let local = local_assortativity(&net, &types, 1.0).unwrap();
        let global = global_assortativity(&net, &types).unwrap();
        for r in &local {
            assert!((r - global).abs() < 1e-4);
        }
        assert!((degree_weighted_mean(&net, &local).unwrap() - global).abs() < 1e-4);
    }

    #[test]
    fn test_zero_degree_is_nan() {
        let mut net = SocialNetwork::empty(5, false);
        for (a, b) in [(0, 1), (1, 2), (0, 2), (2, 3)] {
            net.add_tie(a, b).unwrap();
        }
        let local = local_assortativity(&net, &[A, A, B, B, A], 0.85).unwrap();
        assert!(local[4].is_nan());
        assert!(local[..4].iter().all(|r| r.is_finite()));

        let cont =
            local_assortativity_continuous(&net, &[0.1, 0.2, 0.7, 0.9, 0.5], 0.85).unwrap();
        assert!(cont[4].is_nan());
    }

    #[test]
    fn test_local_separates_cliques() {
        let net = two_cliques_bridged();
        let local = local_assortativity(&net, &[A, A, A, B, B, B], 0.1).unwrap();
        // Bridge agents see a mixed neighbourhood.
        assert!(local[0] > local[2]);
        assert!((local[0] - local[5]).abs() < 1e-9);
    }

    #[test]
    fn test_continuous_global_limit() {
        let net = two_cliques_bridged();
        let values = [0.1, 0.2, 0.15, 0.8, 0.9, 0.85];
        let local = local_assortativity_continuous(&net, &values, 1.0).unwrap();
        let global = global_trait_assortativity(&net, &values).unwrap();
        for r in &local {
            assert!((r - global).abs() < 1e-4);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let net = two_cliques_bridged();
        assert!(matches!(
            local_assortativity(&net, &[A, B], 0.5),
            Err(CascadeError::DimensionMismatch(_))
        ));
    }
}
