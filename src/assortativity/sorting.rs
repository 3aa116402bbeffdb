//! Threshold sorting between agents and their direct neighbours.

use serde::{Deserialize, Serialize};

use super::global::check_len;
use crate::error::Result;
use crate::network::SocialNetwork;

/// Per-agent threshold gap to direct neighbours.
///
/// Every neighbour counts once, whatever the tie weight. Agents with no
/// neighbours get `NaN` in both vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSorting {
    /// Mean of `threshold_j − threshold_i` over neighbours `j`
    pub difference: Vec<f64>,
    /// Mean of `|threshold_j − threshold_i|` over neighbours `j`
    pub distance: Vec<f64>,
}

impl ThresholdSorting {
    /// Mean neighbour distance over agents that have neighbours.
    pub fn mean_distance(&self) -> Option<f64> {
        let defined: Vec<f64> = self.distance.iter().copied().filter(|d| !d.is_nan()).collect();
        if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum::<f64>() / defined.len() as f64)
        }
    }
}

/// Mean signed difference and mean distance between each agent's threshold
/// and those of its (out-)neighbours.
pub fn threshold_differences(network: &SocialNetwork, thresholds: &[f64]) -> Result<ThresholdSorting> {
    check_len(network, thresholds.len(), "thresholds")?;

    let (difference, distance) = thresholds
        .iter()
        .enumerate()
        .map(|(i, own)| {
            let gaps: Vec<f64> = network.neighbors(i).map(|j| thresholds[j] - own).collect();
            if gaps.is_empty() {
                return (f64::NAN, f64::NAN);
            }
            let count = gaps.len() as f64;
            (
                gaps.iter().sum::<f64>() / count,
                gaps.iter().map(|g| g.abs()).sum::<f64>() / count,
            )
        })
        .unzip();

    Ok(ThresholdSorting {
        difference,
        distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CascadeError;

    #[test]
    fn test_path_differences() {
        // 0 - 1 - 2, plus isolated 3
        let mut net = SocialNetwork::empty(4, false);
        net.add_tie(0, 1).unwrap();
        net.add_tie(1, 2).unwrap();
        let sorting = threshold_differences(&net, &[0.2, 0.5, 0.6, 0.9]).unwrap();

        assert!((sorting.difference[0] - 0.3).abs() < 1e-12);
        assert!((sorting.distance[0] - 0.3).abs() < 1e-12);
        // neighbours 0.2 and 0.6 around 0.5
        assert!((sorting.difference[1] - (-0.3 + 0.1) / 2.0).abs() < 1e-12);
        assert!((sorting.distance[1] - 0.2).abs() < 1e-12);
        assert!((sorting.difference[2] + 0.1).abs() < 1e-12);
        assert!(sorting.difference[3].is_nan());
        assert!(sorting.distance[3].is_nan());

        let mean = sorting.mean_distance().unwrap();
        assert!((mean - (0.3 + 0.2 + 0.1) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_directed_uses_out_neighbours() {
        let mut net = SocialNetwork::empty(2, true);
        net.add_tie(0, 1).unwrap();
        let sorting = threshold_differences(&net, &[0.1, 0.4]).unwrap();
        assert!((sorting.difference[0] - 0.3).abs() < 1e-12);
        assert!(sorting.difference[1].is_nan());
    }

    #[test]
    fn test_length_mismatch() {
        let net = SocialNetwork::complete(3, false);
        assert!(matches!(
            threshold_differences(&net, &[0.1, 0.2]),
            Err(CascadeError::DimensionMismatch(_))
        ));
    }
}
