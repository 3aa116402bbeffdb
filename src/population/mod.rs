//! Agent population: thresholds and type labels.
//!
//! A population is created once per replicate and owned by the replicate
//! driver for its whole life. Thresholds may be adjusted in place by the
//! threshold-adjustment policy; types never change.

mod agent;
mod thresholds;

pub use agent::{count_by_type, AgentType};
pub use thresholds::{clamp_thresholds, seed_thresholds};
pub(crate) use thresholds::validate_bounds;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};

/// Split `n` agents into two equal type groups by random permutation.
///
/// Agents at the first `n / 2` positions of a shuffled index order become
/// [`AgentType::A`], the rest [`AgentType::B`]. Odd `n` is rejected rather
/// than silently truncated.
pub fn assign_type<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Vec<AgentType>> {
    if n % 2 != 0 {
        return Err(CascadeError::OddPopulation(n));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let mut types = vec![AgentType::A; n];
    for &agent in &order[n / 2..] {
        types[agent] = AgentType::B;
    }
    Ok(types)
}

/// Thresholds and types of every agent in a replicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    /// Response threshold per agent
    pub thresholds: Vec<f64>,
    /// Type label per agent
    pub types: Vec<AgentType>,
}

impl Population {
    /// Seed thresholds on `(low, high)`, then assign balanced types.
    ///
    /// The draw order (thresholds first, then types) is part of the
    /// reproducibility contract of a replicate seed.
    pub fn seed<R: Rng + ?Sized>(n: usize, low: f64, high: f64, rng: &mut R) -> Result<Self> {
        let thresholds = seed_thresholds(n, low, high, rng)?;
        let types = assign_type(n, rng)?;
        Ok(Self { thresholds, types })
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the population is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
