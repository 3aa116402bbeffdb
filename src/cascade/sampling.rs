//! Direct sampling of the information sources.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};
use crate::population::AgentType;
use crate::stimulus::{generate_stimulus, StimulusPair};

/// Start-of-round state after samplers observe the sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sampling {
    /// Stimulus pair drawn this round
    pub stimulus: StimulusPair,
    /// Initial activation: only reacting samplers are on
    pub state: Vec<bool>,
    /// Agents who observed the sources directly, in draw order
    pub samplers: Vec<usize>,
    /// Samplers whose perceived stimulus exceeded their threshold
    pub samplers_active: Vec<usize>,
}

/// Number of samplers for population `n` and sampling fraction `psi`.
pub fn sampler_count(n: usize, psi: f64) -> usize {
    ((psi * n as f64).round() as usize).min(n)
}

/// Draw a stimulus pair and let `round(ψ·n)` random samplers react to it.
pub fn sample_stimulus<R: Rng + ?Sized>(
    gamma: f64,
    psi: f64,
    mean: f64,
    types: &[AgentType],
    thresholds: &[f64],
    rng: &mut R,
) -> Result<Sampling> {
    let n = types.len();
    if thresholds.len() != n {
        return Err(CascadeError::DimensionMismatch(format!(
            "{n} types but {} thresholds",
            thresholds.len()
        )));
    }
    if !(psi > 0.0 && psi <= 1.0) {
        return Err(CascadeError::InvalidParameter(format!(
            "sampling fraction psi = {psi} must lie in (0, 1]"
        )));
    }

    let stimulus = generate_stimulus(gamma, mean, rng)?;
    let samplers = index::sample(rng, n, sampler_count(n, psi)).into_vec();

    let mut state = vec![false; n];
    let mut samplers_active = Vec::new();
    for &agent in &samplers {
        if stimulus.perceived_by(types[agent]) > thresholds[agent] {
            state[agent] = true;
            samplers_active.push(agent);
        }
    }

    Ok(Sampling {
        stimulus,
        state,
        samplers,
        samplers_active,
    })
}
