//! Social network storage and generation.
//!
//! The network is a dense `n × n` adjacency matrix addressed by agent index.
//! Entries are `0.0` (no tie) or a positive weight; generators and the
//! rewiring policies only ever write `1.0`.
//!
//! # Invariants
//!
//! - The diagonal is zero at all times (no self-loops).
//! - For an undirected network, `adjacency[[a, b]] == adjacency[[b, a]]`
//!   after every mutation. [`SocialNetwork::add_tie`] and
//!   [`SocialNetwork::remove_tie`] mirror the write themselves.
//!
//! Degree always means the row sum, i.e. the out-degree of a directed
//! network. This is the denominator of the social stimulus.

mod paths;
mod topology;

pub use paths::{connected_components, distance_matrix, to_graph};
pub use topology::{repair_isolated, seed_social_network, Topology};

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};

/// Adjacency-matrix social network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialNetwork {
    adjacency: Array2<f64>,
    directed: bool,
}

impl SocialNetwork {
    /// Network of `n` agents with no ties.
    pub fn empty(n: usize, directed: bool) -> Self {
        Self {
            adjacency: Array2::zeros((n, n)),
            directed,
        }
    }

    /// Fully connected network without self-loops.
    pub fn complete(n: usize, directed: bool) -> Self {
        let mut adjacency = Array2::ones((n, n));
        adjacency.diag_mut().fill(0.0);
        Self {
            adjacency,
            directed,
        }
    }

    /// Wrap an existing matrix, checking every structural invariant.
    pub fn from_adjacency(adjacency: Array2<f64>, directed: bool) -> Result<Self> {
        let (rows, cols) = adjacency.dim();
        if rows != cols {
            return Err(CascadeError::DimensionMismatch(format!(
                "adjacency must be square, got {rows}x{cols}"
            )));
        }
        if adjacency.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(CascadeError::InvalidParameter(
                "adjacency weights must be finite and non-negative".to_string(),
            ));
        }

        let network = Self {
            adjacency,
            directed,
        };
        if network.has_self_loops() {
            return Err(CascadeError::InvalidParameter(
                "adjacency has a non-zero diagonal".to_string(),
            ));
        }
        if !directed && !network.is_symmetric() {
            return Err(CascadeError::InvalidParameter(
                "undirected adjacency must be symmetric".to_string(),
            ));
        }
        Ok(network)
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.adjacency.nrows()
    }

    /// Check if the network has no agents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether ties are one-way.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Borrow the adjacency matrix.
    pub fn adjacency(&self) -> &Array2<f64> {
        &self.adjacency
    }

    /// Consume the network, returning the adjacency matrix.
    pub fn into_adjacency(self) -> Array2<f64> {
        self.adjacency
    }

    /// Weight of the tie `from → to`.
    pub fn weight(&self, from: usize, to: usize) -> f64 {
        self.adjacency[[from, to]]
    }

    /// Check if `from` is tied to `to`.
    pub fn has_tie(&self, from: usize, to: usize) -> bool {
        self.adjacency[[from, to]] > 0.0
    }

    /// Row sum for one agent.
    pub fn degree(&self, agent: usize) -> f64 {
        self.adjacency.row(agent).sum()
    }

    /// Row sums for every agent.
    pub fn degrees(&self) -> Array1<f64> {
        self.adjacency.sum_axis(Axis(1))
    }

    /// Column sums for every agent; equal to [`Self::degrees`] when undirected.
    pub fn in_degrees(&self) -> Array1<f64> {
        self.adjacency.sum_axis(Axis(0))
    }

    /// Number of agents `agent` is tied to.
    pub fn tie_count_of(&self, agent: usize) -> usize {
        self.adjacency.row(agent).iter().filter(|w| **w > 0.0).count()
    }

    /// Agents `agent` is tied to, in index order.
    pub fn neighbors(&self, agent: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .row(agent)
            .into_iter()
            .enumerate()
            .filter(|(_, w)| **w > 0.0)
            .map(|(j, _)| j)
    }

    /// Agents `agent` could still form a tie with (excludes itself).
    pub fn non_neighbors(&self, agent: usize) -> Vec<usize> {
        self.adjacency
            .row(agent)
            .iter()
            .enumerate()
            .filter(|(j, w)| *j != agent && **w == 0.0)
            .map(|(j, _)| j)
            .collect()
    }

    /// True when `agent` is already tied to every other agent.
    pub fn is_saturated(&self, agent: usize) -> bool {
        self.tie_count_of(agent) + 1 >= self.len()
    }

    /// Add a unit tie `from → to`, mirrored for undirected networks.
    pub fn add_tie(&mut self, from: usize, to: usize) -> Result<()> {
        self.set_tie(from, to, 1.0)
    }

    /// Remove the tie `from → to`, mirrored for undirected networks.
    pub fn remove_tie(&mut self, from: usize, to: usize) -> Result<()> {
        self.set_tie(from, to, 0.0)
    }

    fn set_tie(&mut self, from: usize, to: usize, weight: f64) -> Result<()> {
        let n = self.len();
        if from >= n || to >= n {
            return Err(CascadeError::DimensionMismatch(format!(
                "tie ({from}, {to}) outside network of {n} agents"
            )));
        }
        if from == to {
            return Err(CascadeError::InvalidParameter(format!(
                "self-loop on agent {from} is not allowed"
            )));
        }
        self.adjacency[[from, to]] = weight;
        if !self.directed {
            self.adjacency[[to, from]] = weight;
        }
        Ok(())
    }

    /// Number of distinct ties (unordered pairs when undirected).
    pub fn tie_count(&self) -> usize {
        let entries = self.adjacency.iter().filter(|w| **w > 0.0).count();
        if self.directed {
            entries
        } else {
            entries / 2
        }
    }

    /// Sum of every matrix entry (`2m` for an undirected unit network).
    pub fn total_weight(&self) -> f64 {
        self.adjacency.sum()
    }

    /// Check for non-zero diagonal entries.
    pub fn has_self_loops(&self) -> bool {
        self.adjacency.diag().iter().any(|w| *w != 0.0)
    }

    /// Check `adjacency == adjacencyᵀ`.
    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| (i + 1..n).all(|j| self.adjacency[[i, j]] == self.adjacency[[j, i]]))
    }

    /// Agents with zero degree.
    pub fn isolated(&self) -> Vec<usize> {
        self.degrees()
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Row-normalised adjacency; zero-degree rows stay zero.
    pub fn transition_matrix(&self) -> Array2<f64> {
        let mut normalized = self.adjacency.clone();
        for mut row in normalized.rows_mut() {
            let degree = row.sum();
            if degree > 0.0 {
                row /= degree;
            }
        }
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_undirected_ties_are_mirrored() {
        let mut net = SocialNetwork::empty(4, false);
        net.add_tie(0, 2).unwrap();
        assert!(net.has_tie(2, 0));
        assert_eq!(net.tie_count(), 1);
        net.remove_tie(2, 0).unwrap();
        assert!(!net.has_tie(0, 2));
        assert_eq!(net.tie_count(), 0);
    }

    #[test]
    fn test_directed_ties_are_one_way() {
        let mut net = SocialNetwork::empty(3, true);
        net.add_tie(0, 1).unwrap();
        assert!(!net.has_tie(1, 0));
        assert!(!net.is_symmetric());
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut net = SocialNetwork::empty(3, false);
        assert!(net.add_tie(1, 1).is_err());
        assert!(!net.has_self_loops());
    }

    #[test]
    fn test_from_adjacency_validates() {
        let asym = array![[0.0, 1.0], [0.0, 0.0]];
        assert!(SocialNetwork::from_adjacency(asym.clone(), false).is_err());
        assert!(SocialNetwork::from_adjacency(asym, true).is_ok());

        let looped = array![[1.0, 0.0], [0.0, 0.0]];
        assert!(SocialNetwork::from_adjacency(looped, true).is_err());
    }

    #[test]
    fn test_complete_network() {
        let net = SocialNetwork::complete(5, false);
        assert_eq!(net.tie_count(), 10);
        assert!((0..5).all(|i| net.is_saturated(i)));
        assert!(net.non_neighbors(3).is_empty());
    }

    #[test]
    fn test_transition_matrix_rows() {
        let mut net = SocialNetwork::empty(3, false);
        net.add_tie(0, 1).unwrap();
        net.add_tie(0, 2).unwrap();
        let p = net.transition_matrix();
        assert_eq!(p.row(0).sum(), 1.0);
        assert_eq!(p[[0, 1]], 0.5);
        assert_eq!(p[[1, 0]], 1.0);
    }
}
