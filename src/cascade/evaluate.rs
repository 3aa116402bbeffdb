//! Behaviour evaluation against the ground truth.
//!
//! The ground truth for agent `i` is what it would have done had it observed
//! both sources itself: `type_i · stimulus > threshold_i`. Behaviour is
//! correct when the realised activation matches it.

use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};
use crate::population::AgentType;
use crate::stimulus::StimulusPair;

/// Reaction every agent would have with direct access to the sources.
pub fn ground_truth(
    thresholds: &[f64],
    stimulus: &StimulusPair,
    types: &[AgentType],
) -> Result<Vec<bool>> {
    if thresholds.len() != types.len() {
        return Err(CascadeError::DimensionMismatch(format!(
            "{} thresholds but {} types",
            thresholds.len(),
            types.len()
        )));
    }
    Ok(types
        .iter()
        .zip(thresholds)
        .map(|(&t, &threshold)| stimulus.perceived_by(t) > threshold)
        .collect())
}

/// Per-agent correctness of the realised state.
pub fn evaluate(
    state: &[bool],
    thresholds: &[f64],
    stimulus: &StimulusPair,
    types: &[AgentType],
) -> Result<Vec<bool>> {
    let truth = ground_truth(thresholds, stimulus, types)?;
    if state.len() != truth.len() {
        return Err(CascadeError::DimensionMismatch(format!(
            "state has {} agents, population has {}",
            state.len(),
            truth.len()
        )));
    }
    Ok(state.iter().zip(&truth).map(|(s, t)| s == t).collect())
}

/// Evaluate a cascade and record it in `ledger`.
///
/// Used both for replicate rounds and for fitness trials.
pub fn evaluate_fitness_trial(
    state: &[bool],
    thresholds: &[f64],
    stimulus: &StimulusPair,
    types: &[AgentType],
    ledger: &mut BehaviorLedger,
) -> Result<Vec<bool>> {
    let truth = ground_truth(thresholds, stimulus, types)?;
    ledger.record(state, &truth)?;
    Ok(state.iter().zip(&truth).map(|(s, t)| s == t).collect())
}

/// Confusion-matrix counts for one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    /// Active and should have been
    pub true_positive: u64,
    /// Inactive and should not have been active
    pub true_negative: u64,
    /// Active but should not have been
    pub false_positive: u64,
    /// Inactive but should have been active
    pub false_negative: u64,
}

impl ConfusionCounts {
    /// Cascades recorded for this agent.
    pub fn total(&self) -> u64 {
        self.true_positive + self.true_negative + self.false_positive + self.false_negative
    }

    /// Share of correct outcomes; `None` before anything is recorded.
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| (self.true_positive + self.true_negative) as f64 / total as f64)
    }

    fn add(&mut self, active: bool, should: bool) {
        match (active, should) {
            (true, true) => self.true_positive += 1,
            (false, false) => self.true_negative += 1,
            (true, false) => self.false_positive += 1,
            (false, true) => self.false_negative += 1,
        }
    }
}

/// Running confusion counts for every agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorLedger {
    agents: Vec<ConfusionCounts>,
    cascades: u64,
}

impl BehaviorLedger {
    /// Empty ledger for `n` agents.
    pub fn new(n: usize) -> Self {
        Self {
            agents: vec![ConfusionCounts::default(); n],
            cascades: 0,
        }
    }

    /// Add one cascade outcome.
    pub fn record(&mut self, state: &[bool], truth: &[bool]) -> Result<()> {
        let n = self.agents.len();
        if state.len() != n || truth.len() != n {
            return Err(CascadeError::DimensionMismatch(format!(
                "ledger tracks {n} agents, got state {} and truth {}",
                state.len(),
                truth.len()
            )));
        }
        for ((counts, &active), &should) in self.agents.iter_mut().zip(state).zip(truth) {
            counts.add(active, should);
        }
        self.cascades += 1;
        Ok(())
    }

    /// Counts for one agent.
    pub fn agent(&self, agent: usize) -> Option<&ConfusionCounts> {
        self.agents.get(agent)
    }

    /// Counts for every agent.
    pub fn agents(&self) -> &[ConfusionCounts] {
        &self.agents
    }

    /// Number of cascades recorded.
    pub fn cascades(&self) -> u64 {
        self.cascades
    }

    /// Counts summed over all agents.
    pub fn totals(&self) -> ConfusionCounts {
        self.agents.iter().fold(ConfusionCounts::default(), |acc, c| ConfusionCounts {
            true_positive: acc.true_positive + c.true_positive,
            true_negative: acc.true_negative + c.true_negative,
            false_positive: acc.false_positive + c.false_positive,
            false_negative: acc.false_negative + c.false_negative,
        })
    }
}
