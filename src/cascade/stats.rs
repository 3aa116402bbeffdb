//! Per-round cascade ledger rows.

use serde::{Deserialize, Serialize};

use super::Sampling;
use crate::population::AgentType;

/// Size and type composition of one cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeRecord {
    /// Round (or fitness-trial index)
    pub round: usize,
    /// Agents who sampled directly
    pub samplers: usize,
    /// Samplers who reacted
    pub samplers_active: usize,
    /// Reacting samplers by type, indexed by [`AgentType::index`]
    pub samplers_active_by_type: [usize; 2],
    /// Active agents at the fixpoint
    pub total_active: usize,
    /// Active agents at the fixpoint by type
    pub active_by_type: [usize; 2],
}

impl CascadeRecord {
    /// Summarise a finished cascade.
    pub fn capture(round: usize, sampling: &Sampling, state: &[bool], types: &[AgentType]) -> Self {
        let mut samplers_active_by_type = [0usize; 2];
        for &agent in &sampling.samplers_active {
            samplers_active_by_type[types[agent].index()] += 1;
        }

        let mut active_by_type = [0usize; 2];
        for (&on, t) in state.iter().zip(types) {
            if on {
                active_by_type[t.index()] += 1;
            }
        }

        Self {
            round,
            samplers: sampling.samplers.len(),
            samplers_active: sampling.samplers_active.len(),
            samplers_active_by_type,
            total_active: active_by_type[0] + active_by_type[1],
            active_by_type,
        }
    }

    /// Share of active agents that are type `agent_type`; `None` for an empty cascade.
    pub fn type_bias(&self, agent_type: AgentType) -> Option<f64> {
        (self.total_active > 0)
            .then(|| self.active_by_type[agent_type.index()] as f64 / self.total_active as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stimulus::StimulusPair;

    #[test]
    fn test_capture_counts() {
        let types = [AgentType::A, AgentType::B, AgentType::B, AgentType::A];
        let sampling = Sampling {
            stimulus: StimulusPair::new(0.5, 0.5),
            state: vec![false, true, false, false],
            samplers: vec![1, 3],
            samplers_active: vec![1],
        };
        let record = CascadeRecord::capture(7, &sampling, &[true, true, true, false], &types);
        assert_eq!(record.round, 7);
        assert_eq!(record.samplers, 2);
        assert_eq!(record.samplers_active, 1);
        assert_eq!(record.samplers_active_by_type, [0, 1]);
        assert_eq!(record.total_active, 3);
        assert_eq!(record.active_by_type, [1, 2]);
        assert!((record.type_bias(AgentType::B).unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }
}
