//! Assortativity diagnostics.
//!
//! Global (Newman) assortativity and its PageRank-localised counterpart,
//! for the categorical agent type and for scalar traits such as the
//! threshold.
//!
//! | Function | Trait | Scope |
//! |----------|-------|-------|
//! | [`global_assortativity`] | type | network |
//! | [`global_trait_assortativity`] | scalar | network |
//! | [`local_assortativity`] | type | per agent |
//! | [`local_assortativity_continuous`] | scalar | per agent |
//! | [`threshold_differences`] | threshold gap | per agent, direct ties |
//!
//! `alpha` sets the neighbourhood size: `0` is the agent's own ties only,
//! `1` is the whole network. On a connected, non-bipartite undirected
//! network the degree-weighted mean of the local values at `alpha = 1`
//! equals the global coefficient.
//!
//! Diagnostics run on snapshots (initial and final network), not every
//! round.

mod global;
mod local;
mod pagerank;
mod sorting;

pub use global::{
    connections_by_type, global_assort_values, global_assortativity, global_trait_assortativity,
    GlobalAssortValues,
};
pub use local::{
    degree_weighted_mean, local_assortativity, local_assortativity_continuous,
    local_assortativity_continuous_with, local_assortativity_with,
};
pub use pagerank::{personalized_pagerank, personalized_pagerank_with, PageRankSettings};
pub use sorting::{threshold_differences, ThresholdSorting};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::network::SocialNetwork;
use crate::population::AgentType;

/// Every diagnostic for one network snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssortativitySnapshot {
    /// Neighbourhood size used for the local values
    pub alpha: f64,
    /// Newman type assortativity
    pub global: f64,
    /// Local type assortativity (`NaN` for zero-degree agents)
    pub local: Vec<f64>,
    /// Pearson threshold assortativity
    pub global_threshold: f64,
    /// Local threshold assortativity (`NaN` for zero-degree agents)
    pub local_threshold: Vec<f64>,
    /// Threshold gap to direct neighbours
    pub threshold_sorting: ThresholdSorting,
}

impl AssortativitySnapshot {
    /// Compute type and threshold diagnostics for one snapshot.
    pub fn compute(
        network: &SocialNetwork,
        types: &[AgentType],
        thresholds: &[f64],
        alpha: f64,
    ) -> Result<Self> {
        Ok(Self {
            alpha,
            global: global_assortativity(network, types)?,
            local: local_assortativity(network, types, alpha)?,
            global_threshold: global_trait_assortativity(network, thresholds)?,
            local_threshold: local_assortativity_continuous(network, thresholds, alpha)?,
            threshold_sorting: threshold_differences(network, thresholds)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AgentType::{A, B};

    #[test]
    fn test_snapshot_includes_threshold_sorting() {
        let mut net = SocialNetwork::empty(4, false);
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)] {
            net.add_tie(a, b).unwrap();
        }
        let thresholds = [0.1, 0.3, 0.6, 0.8];
        let snapshot = AssortativitySnapshot::compute(&net, &[A, A, B, B], &thresholds, 0.5).unwrap();

        assert_eq!(snapshot.local.len(), 4);
        assert_eq!(snapshot.threshold_sorting.distance.len(), 4);
        // agent 1 neighbours 0 and 2
        assert!((snapshot.threshold_sorting.difference[1] - 0.05).abs() < 1e-12);
        assert!((snapshot.threshold_sorting.distance[1] - 0.25).abs() < 1e-12);
    }
}
