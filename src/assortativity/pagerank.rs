//! Personalized PageRank kernel.
//!
//! Row `i` of the kernel is the stationary distribution of a walker that,
//! at each step, follows a random tie with probability `alpha` and jumps
//! back to `i` otherwise. `alpha = 0` keeps all mass on the seed; `alpha → 1`
//! approaches the global stationary distribution (degree / 2m on a connected,
//! non-bipartite undirected network).

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};
use crate::network::SocialNetwork;

/// Power-iteration settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRankSettings {
    /// Walk continuation probability in `[0, 1]`
    pub alpha: f64,
    /// Per-node L1 tolerance; iteration stops when `Σ|Δx| < n · tol`
    pub tol: f64,
    /// Iteration cap per seed
    pub max_iter: usize,
}

impl Default for PageRankSettings {
    fn default() -> Self {
        Self {
            alpha: 0.85,
            tol: 1e-6,
            max_iter: 1000,
        }
    }
}

impl PageRankSettings {
    /// Default tolerances with the given `alpha`.
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }
}

/// Kernel with default tolerances.
pub fn personalized_pagerank(network: &SocialNetwork, alpha: f64) -> Result<Array2<f64>> {
    personalized_pagerank_with(network, PageRankSettings::with_alpha(alpha))
}

/// Kernel with explicit settings. Seeds are solved in parallel.
///
/// Zero-degree seeds get a one-hot row. Mass reaching a zero-degree node
/// during a walk is returned to the seed.
pub fn personalized_pagerank_with(
    network: &SocialNetwork,
    settings: PageRankSettings,
) -> Result<Array2<f64>> {
    if !(0.0..=1.0).contains(&settings.alpha) {
        return Err(CascadeError::InvalidParameter(format!(
            "pagerank alpha = {} must lie in [0, 1]",
            settings.alpha
        )));
    }

    let n = network.len();
    let transitions: Vec<Vec<(usize, f64)>> = (0..n)
        .map(|i| {
            let degree = network.degree(i);
            network
                .neighbors(i)
                .map(|j| (j, network.weight(i, j) / degree))
                .collect()
        })
        .collect();

    let rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|seed| {
            if transitions[seed].is_empty() {
                let mut one_hot = vec![0.0; n];
                one_hot[seed] = 1.0;
                Ok(one_hot)
            } else {
                seeded_walk(&transitions, seed, settings)
            }
        })
        .collect::<Result<_>>()?;

    let mut kernel = Array2::zeros((n, n));
    for (i, row) in rows.into_iter().enumerate() {
        for (j, value) in row.into_iter().enumerate() {
            kernel[[i, j]] = value;
        }
    }
    Ok(kernel)
}

fn seeded_walk(
    transitions: &[Vec<(usize, f64)>],
    seed: usize,
    settings: PageRankSettings,
) -> Result<Vec<f64>> {
    let n = transitions.len();
    let alpha = settings.alpha;
    let mut x = vec![1.0 / n as f64; n];
    let mut next = vec![0.0; n];

    for _ in 0..settings.max_iter {
        next.iter_mut().for_each(|v| *v = 0.0);
        let mut dangling = 0.0;
        for (i, out) in transitions.iter().enumerate() {
            if out.is_empty() {
                dangling += x[i];
            } else {
                for &(j, p) in out {
                    next[j] += alpha * x[i] * p;
                }
            }
        }
        next[seed] += alpha * dangling + (1.0 - alpha);

        let err: f64 = next.iter().zip(&x).map(|(a, b)| (a - b).abs()).sum();
        std::mem::swap(&mut x, &mut next);
        if err < n as f64 * settings.tol {
            return Ok(x);
        }
    }

    Err(CascadeError::PageRankDiverged {
        node: seed,
        iterations: settings.max_iter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_with_tail() -> SocialNetwork {
        let mut net = SocialNetwork::empty(5, false);
        for (a, b) in [(0, 1), (1, 2), (0, 2), (2, 3)] {
            net.add_tie(a, b).unwrap();
        }
        net
    }

    #[test]
    fn test_rows_are_distributions() {
        let kernel = personalized_pagerank(&triangle_with_tail(), 0.85).unwrap();
        for row in kernel.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-6);
            assert!(row.iter().all(|v| *v >= 0.0));
        }
    }

    #[test]
    fn test_zero_degree_one_hot() {
        let kernel = personalized_pagerank(&triangle_with_tail(), 0.85).unwrap();
        assert_eq!(kernel[[4, 4]], 1.0);
        assert_eq!(kernel.row(4).sum(), 1.0);
        // Agent 4 is unreachable from the others.
        assert!(kernel.column(4).iter().take(4).all(|v| *v == 0.0));
    }

    #[test]
    fn test_alpha_zero_stays_on_seed() {
        let kernel = personalized_pagerank(&triangle_with_tail(), 0.0).unwrap();
        for i in 0..5 {
            assert!((kernel[[i, i]] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_alpha_one_is_degree_distribution() {
        let mut net = SocialNetwork::empty(4, false);
        for (a, b) in [(0, 1), (1, 2), (0, 2), (2, 3)] {
            net.add_tie(a, b).unwrap();
        }
        let kernel = personalized_pagerank(&net, 1.0).unwrap();
        let expected = [2.0 / 8.0, 2.0 / 8.0, 3.0 / 8.0, 1.0 / 8.0];
        for i in 0..4 {
            for (j, e) in expected.iter().enumerate() {
                assert!((kernel[[i, j]] - e).abs() < 1e-4, "kernel[{i},{j}]");
            }
        }
    }

    #[test]
    fn test_seed_gets_most_mass() {
        let kernel = personalized_pagerank(&triangle_with_tail(), 0.5).unwrap();
        assert!(kernel[[3, 3]] > kernel[[3, 0]]);
        assert!(kernel[[3, 2]] > kernel[[3, 0]]);
    }

    #[test]
    fn test_bipartite_at_alpha_one_diverges() {
        let mut net = SocialNetwork::empty(2, false);
        net.add_tie(0, 1).unwrap();
        let err = personalized_pagerank_with(
            &net,
            PageRankSettings {
                alpha: 1.0,
                tol: 1e-9,
                max_iter: 50,
            },
        );
        // Uniform start is already stationary for a single edge.
        assert!(err.is_ok());

        let mut path = SocialNetwork::empty(3, false);
        path.add_tie(0, 1).unwrap();
        path.add_tie(1, 2).unwrap();
        let err = personalized_pagerank_with(
            &path,
            PageRankSettings {
                alpha: 1.0,
                tol: 1e-9,
                max_iter: 50,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CascadeError::PageRankDiverged { .. }));
    }

    #[test]
    fn test_invalid_alpha() {
        assert!(personalized_pagerank(&triangle_with_tail(), 1.5).is_err());
    }
}
