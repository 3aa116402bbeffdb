//! Threshold reinforcement without rewiring.

use rand::seq::SliceRandom;
use rand::RngCore;
use tracing::trace;

use super::{AdaptationContext, AdaptationOutcome, AdaptationPolicy};
use crate::error::Result;
use crate::population::{clamp_thresholds, validate_bounds};

/// Lowers one correct active agent's threshold by `phi` and raises one
/// incorrect active agent's threshold by `omega`, then clamps every
/// threshold to `[low, high]`.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdAdjustment {
    phi: f64,
    omega: f64,
    low: f64,
    high: f64,
}

impl ThresholdAdjustment {
    /// Create a policy with reinforcement steps and clamp bounds.
    pub fn new(phi: f64, omega: f64, low: f64, high: f64) -> Result<Self> {
        validate_bounds(low, high)?;
        Ok(Self {
            phi,
            omega,
            low,
            high,
        })
    }
}

impl AdaptationPolicy for ThresholdAdjustment {
    fn adapt(&self, ctx: AdaptationContext<'_>, rng: &mut dyn RngCore) -> Result<AdaptationOutcome> {
        ctx.check_dimensions()?;
        let actives = ctx.active_agents();
        if actives.is_empty() {
            return Ok(AdaptationOutcome::NoActiveAgents);
        }

        let (correct, incorrect): (Vec<usize>, Vec<usize>) =
            actives.into_iter().partition(|&i| ctx.correct[i]);

        let lowered = correct.choose(rng).copied();
        if let Some(agent) = lowered {
            ctx.thresholds[agent] -= self.phi;
        }
        let raised = incorrect.choose(rng).copied();
        if let Some(agent) = raised {
            ctx.thresholds[agent] += self.omega;
        }
        clamp_thresholds(ctx.thresholds, self.low, self.high);

        trace!(?lowered, ?raised, "thresholds adjusted");
        Ok(AdaptationOutcome::ThresholdsAdjusted { lowered, raised })
    }

    fn name(&self) -> &'static str {
        "threshold"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::SocialNetwork;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_adjusts_and_clamps() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut net = SocialNetwork::complete(4, false);
        let before = net.clone();
        let mut thresholds = vec![0.05, 0.95, 0.5, 0.5];
        let policy = ThresholdAdjustment::new(0.1, 0.1, 0.0, 1.0).unwrap();

        let outcome = policy
            .adapt(
                AdaptationContext {
                    network: &mut net,
                    thresholds: &mut thresholds,
                    state: &[true, true, false, false],
                    correct: &[true, false, true, true],
                },
                &mut rng,
            )
            .unwrap();

        assert_eq!(
            outcome,
            AdaptationOutcome::ThresholdsAdjusted {
                lowered: Some(0),
                raised: Some(1)
            }
        );
        assert_eq!(thresholds, vec![0.0, 1.0, 0.5, 0.5]);
        assert_eq!(net, before);
    }

    #[test]
    fn test_only_correct_actives() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let mut net = SocialNetwork::complete(3, false);
        let mut thresholds = vec![0.5; 3];
        let policy = ThresholdAdjustment::new(0.2, 0.3, 0.0, 1.0).unwrap();

        let outcome = policy
            .adapt(
                AdaptationContext {
                    network: &mut net,
                    thresholds: &mut thresholds,
                    state: &[false, true, false],
                    correct: &[true, true, true],
                },
                &mut rng,
            )
            .unwrap();

        assert_eq!(
            outcome,
            AdaptationOutcome::ThresholdsAdjusted {
                lowered: Some(1),
                raised: None
            }
        );
        assert!((thresholds[1] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_no_actives() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut net = SocialNetwork::complete(3, false);
        let mut thresholds = vec![0.5; 3];
        let policy = ThresholdAdjustment::new(0.2, 0.3, 0.0, 1.0).unwrap();
        let outcome = policy
            .adapt(
                AdaptationContext {
                    network: &mut net,
                    thresholds: &mut thresholds,
                    state: &[false; 3],
                    correct: &[true; 3],
                },
                &mut rng,
            )
            .unwrap();
        assert_eq!(outcome, AdaptationOutcome::NoActiveAgents);
        assert_eq!(thresholds, vec![0.5; 3]);
    }
}
