//! Fitness trials: cascades on a frozen network.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cascade::{
    evaluate_fitness_trial, propagate, sample_stimulus, BehaviorLedger, CascadeRecord,
};
use crate::error::{CascadeError, Result};
use crate::network::SocialNetwork;
use crate::population::AgentType;

/// Stimulus settings for a batch of trials.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialSettings {
    /// Source correlation
    pub gamma: f64,
    /// Sampling fraction
    pub psi: f64,
    /// Mean of the stimulus draw
    pub stimulus_mean: f64,
    /// Number of cascades
    pub trials: usize,
}

/// Outcome of a batch of fitness trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessReport {
    /// Per-agent confusion counts over every trial
    pub behavior: BehaviorLedger,
    /// One record per trial, `round` being the trial index
    pub cascades: Vec<CascadeRecord>,
}

impl FitnessReport {
    /// Mean per-agent accuracy; `None` before any trial.
    pub fn mean_accuracy(&self) -> Option<f64> {
        let accuracies: Vec<f64> = self
            .behavior
            .agents()
            .iter()
            .filter_map(|c| c.accuracy())
            .collect();
        (!accuracies.is_empty()).then(|| accuracies.iter().sum::<f64>() / accuracies.len() as f64)
    }

    /// Mean number of active agents per cascade.
    pub fn mean_cascade_size(&self) -> f64 {
        if self.cascades.is_empty() {
            return 0.0;
        }
        self.cascades.iter().map(|c| c.total_active).sum::<usize>() as f64
            / self.cascades.len() as f64
    }
}

/// Run `settings.trials` cascades against a fixed network.
///
/// Neither the network nor the thresholds are touched; only the ledgers
/// accumulate.
pub fn assess_fitness<R: Rng + ?Sized>(
    network: &SocialNetwork,
    thresholds: &[f64],
    types: &[AgentType],
    settings: &TrialSettings,
    rng: &mut R,
) -> Result<FitnessReport> {
    let n = network.len();
    if thresholds.len() != n || types.len() != n {
        return Err(CascadeError::DimensionMismatch(format!(
            "network has {n} agents, thresholds {}, types {}",
            thresholds.len(),
            types.len()
        )));
    }

    let mut behavior = BehaviorLedger::new(n);
    let mut cascades = Vec::with_capacity(settings.trials);

    for trial in 0..settings.trials {
        let sampling = sample_stimulus(
            settings.gamma,
            settings.psi,
            settings.stimulus_mean,
            types,
            thresholds,
            rng,
        )?;
        let outcome = propagate(network, &sampling.state, thresholds, &sampling.samplers)?;
        cascades.push(CascadeRecord::capture(trial, &sampling, &outcome.state, types));
        evaluate_fitness_trial(
            &outcome.state,
            thresholds,
            &sampling.stimulus,
            types,
            &mut behavior,
        )?;
    }

    let report = FitnessReport { behavior, cascades };
    debug!(
        trials = settings.trials,
        mean_size = report.mean_cascade_size(),
        mean_accuracy = report.mean_accuracy().unwrap_or(f64::NAN),
        "Fitness trials complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{seed_social_network, Topology};
    use crate::population::Population;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_ledger_conservation() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let pop = Population::seed(30, 0.0, 1.0, &mut rng).unwrap();
        let net = seed_social_network(30, 4, Topology::Random, false, &mut rng).unwrap();
        let before = net.clone();
        let settings = TrialSettings {
            gamma: 0.3,
            psi: 0.1,
            stimulus_mean: 0.0,
            trials: 50,
        };

        let report = assess_fitness(&net, &pop.thresholds, &pop.types, &settings, &mut rng).unwrap();
        assert_eq!(report.cascades.len(), 50);
        assert_eq!(report.behavior.cascades(), 50);
        for counts in report.behavior.agents() {
            assert_eq!(counts.total(), 50);
        }
        assert_eq!(net, before);
        let accuracy = report.mean_accuracy().unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
    }

    #[test]
    fn test_zero_trials() {
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        let net = SocialNetwork::complete(4, false);
        let types = [AgentType::A, AgentType::B, AgentType::A, AgentType::B];
        let settings = TrialSettings {
            gamma: 0.0,
            psi: 0.5,
            stimulus_mean: 0.0,
            trials: 0,
        };
        let report = assess_fitness(&net, &[0.5; 4], &types, &settings, &mut rng).unwrap();
        assert!(report.cascades.is_empty());
        assert_eq!(report.mean_accuracy(), None);
        assert_eq!(report.mean_cascade_size(), 0.0);
    }
}
