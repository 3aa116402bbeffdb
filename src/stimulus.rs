//! Correlated information sources.
//!
//! Each round the two sources emit a pair of values drawn from a bivariate
//! normal with unit variances and correlation `γ`, then mapped into `[0, 1]`
//! by the standard normal CDF. The CDF is centred on zero, so a positive
//! `mean` skews both sources towards `1`.

use std::f64::consts::SQRT_2;

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};
use crate::population::AgentType;

/// Values of the two sources for one round, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StimulusPair {
    /// First source (privileged by type A)
    pub first: f64,
    /// Second source (privileged by type B)
    pub second: f64,
}

impl StimulusPair {
    /// Create a pair.
    pub fn new(first: f64, second: f64) -> Self {
        Self { first, second }
    }

    /// Stimulus as perceived by an agent of type `agent_type` (`type · stimulus`).
    pub fn perceived_by(&self, agent_type: AgentType) -> f64 {
        let [wa, wb] = agent_type.weights();
        wa * self.first + wb * self.second
    }
}

/// Draw a correlated stimulus pair.
pub fn generate_stimulus<R: Rng + ?Sized>(
    correlation: f64,
    mean: f64,
    rng: &mut R,
) -> Result<StimulusPair> {
    if !(-1.0..=1.0).contains(&correlation) {
        return Err(CascadeError::InvalidCorrelation(correlation));
    }

    let z1: f64 = rng.sample(StandardNormal);
    let z2: f64 = rng.sample(StandardNormal);
    let x1 = mean + z1;
    let x2 = mean + correlation * z1 + (1.0 - correlation * correlation).sqrt() * z2;

    Ok(StimulusPair::new(normal_cdf(x1), normal_cdf(x2)))
}

/// Standard normal cumulative distribution function.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / SQRT_2))
}
