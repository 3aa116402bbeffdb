//! Synchronous threshold propagation.

use crate::error::{CascadeError, Result};
use crate::network::SocialNetwork;

/// Final state of one cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Activation per agent at the fixpoint
    pub state: Vec<bool>,
    /// Update sweeps performed, including the final one that changed nothing
    pub iterations: usize,
}

impl CascadeOutcome {
    /// Number of active agents.
    pub fn active_count(&self) -> usize {
        self.state.iter().filter(|s| **s).count()
    }
}

/// Weighted fraction of active neighbours for every agent.
///
/// Zero-degree agents receive `0.0`, never `NaN`.
pub fn social_stimulus(network: &SocialNetwork, state: &[bool]) -> Vec<f64> {
    network
        .adjacency()
        .rows()
        .into_iter()
        .map(|row| {
            let (active, degree) = row
                .iter()
                .zip(state)
                .fold((0.0, 0.0), |(active, degree), (&w, &on)| {
                    (if on { active + w } else { active }, degree + w)
                });
            if degree > 0.0 {
                active / degree
            } else {
                0.0
            }
        })
        .collect()
}

/// Run a cascade from `initial_state` to its fixpoint.
///
/// Each sweep activates every agent whose social stimulus strictly exceeds
/// its threshold, then re-pins `frozen_samplers` to their initial state so a
/// sampler who did not react to direct observation is never swept in.
/// Agents only ever switch on, so every sweep that changes the state adds at
/// least one active agent and the loop ends within `n + 1` sweeps.
pub fn propagate(
    network: &SocialNetwork,
    initial_state: &[bool],
    thresholds: &[f64],
    frozen_samplers: &[usize],
) -> Result<CascadeOutcome> {
    run_sweeps(network, initial_state, thresholds, frozen_samplers, |_| {})
}

/// [`propagate`], also returning the state after every sweep.
///
/// The first entry is `initial_state`; the last is the fixpoint.
pub fn propagate_trace(
    network: &SocialNetwork,
    initial_state: &[bool],
    thresholds: &[f64],
    frozen_samplers: &[usize],
) -> Result<(CascadeOutcome, Vec<Vec<bool>>)> {
    let mut trace = vec![initial_state.to_vec()];
    let outcome = run_sweeps(network, initial_state, thresholds, frozen_samplers, |state| {
        trace.push(state.to_vec());
    })?;
    Ok((outcome, trace))
}

fn run_sweeps<F>(
    network: &SocialNetwork,
    initial_state: &[bool],
    thresholds: &[f64],
    frozen_samplers: &[usize],
    mut on_change: F,
) -> Result<CascadeOutcome>
where
    F: FnMut(&[bool]),
{
    let n = network.len();
    if initial_state.len() != n || thresholds.len() != n {
        return Err(CascadeError::DimensionMismatch(format!(
            "network has {n} agents, state has {}, thresholds have {}",
            initial_state.len(),
            thresholds.len()
        )));
    }
    if let Some(&bad) = frozen_samplers.iter().find(|&&s| s >= n) {
        return Err(CascadeError::DimensionMismatch(format!(
            "sampler {bad} outside population of {n}"
        )));
    }

    let mut state = initial_state.to_vec();
    for iteration in 1..=n + 1 {
        let stimulus = social_stimulus(network, &state);

        let mut next = state.clone();
        for (i, on) in next.iter_mut().enumerate() {
            if stimulus[i] > thresholds[i] {
                *on = true;
            }
        }
        for &sampler in frozen_samplers {
            next[sampler] = initial_state[sampler];
        }

        if next == state {
            return Ok(CascadeOutcome { state, iterations: iteration });
        }
        debug_assert!(state.iter().zip(&next).all(|(before, after)| !before || *after));
        on_change(&next);
        state = next;
    }

    Err(CascadeError::CascadeDiverged(n + 1))
}
