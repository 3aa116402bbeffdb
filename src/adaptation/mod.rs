//! Network adaptation after each cascade.
//!
//! Provides pluggable policies that mutate the network or the thresholds
//! in place, using the per-agent correctness produced by the evaluator:
//! - **Paired**: an incorrect active agent drops an active neighbour and
//!   exactly one replacement tie is formed elsewhere
//! - **Homophilous**: as paired, but the replacement tie prefers agents
//!   whose state matches the forming agent's inferred importance flag
//! - **Probabilistic**: break and form are independent; a tie is formed
//!   with probability `p` each round
//! - **Threshold**: no rewiring; thresholds move by `phi` / `omega`
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            Replicate Driver              │
//! │      (owns Box<dyn AdaptationPolicy>)    │
//! └────────────────────┬─────────────────────┘
//!                      │ AdaptationContext
//!       ┌──────────────┼───────────────┐
//!       ▼              ▼               ▼
//! ┌───────────┐ ┌─────────────┐ ┌────────────────────┐
//! │  Paired / │ │Probabilistic│ │ThresholdAdjustment │
//! │Homophilous│ │  Rewiring   │ │                    │
//! └───────────┘ └─────────────┘ └────────────────────┘
//! ```
//!
//! A round with no active agents is an [`AdaptationOutcome::NoActiveAgents`]
//! no-op. An empty candidate pool for a required step is an error.

mod rewire;
mod threshold;

pub use rewire::{HomophilousRewiring, PairedRewiring, ProbabilisticRewiring};
pub use threshold::ThresholdAdjustment;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};
use crate::network::SocialNetwork;

/// Mutable replicate state handed to a policy once per round.
#[derive(Debug)]
pub struct AdaptationContext<'a> {
    /// Network to rewire
    pub network: &'a mut SocialNetwork,
    /// Thresholds to adjust
    pub thresholds: &'a mut [f64],
    /// Activation at the cascade fixpoint
    pub state: &'a [bool],
    /// Per-agent correctness of `state`
    pub correct: &'a [bool],
}

impl AdaptationContext<'_> {
    /// Indices of active agents.
    pub fn active_agents(&self) -> Vec<usize> {
        self.state
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(i, _)| i)
            .collect()
    }

    fn check_dimensions(&self) -> Result<()> {
        let n = self.network.len();
        if self.thresholds.len() != n || self.state.len() != n || self.correct.len() != n {
            return Err(CascadeError::DimensionMismatch(format!(
                "network has {n} agents, thresholds {}, state {}, correct {}",
                self.thresholds.len(),
                self.state.len(),
                self.correct.len()
            )));
        }
        Ok(())
    }
}

/// What a policy did this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdaptationOutcome {
    /// Nobody was active, so nothing could be evaluated
    NoActiveAgents,
    /// The policy ran but left everything as it was
    Unchanged,
    /// Ties were removed and/or added, as `(from, to)` pairs
    Rewired {
        /// Tie removed this round
        broken: Option<(usize, usize)>,
        /// Tie added this round
        formed: Option<(usize, usize)>,
    },
    /// Thresholds were moved
    ThresholdsAdjusted {
        /// Correct active agent whose threshold fell by `phi`
        lowered: Option<usize>,
        /// Incorrect active agent whose threshold rose by `omega`
        raised: Option<usize>,
    },
}

impl AdaptationOutcome {
    /// Ties removed this round (0 or 1).
    pub fn ties_broken(&self) -> usize {
        match self {
            Self::Rewired { broken: Some(_), .. } => 1,
            _ => 0,
        }
    }

    /// Ties added this round (0 or 1).
    pub fn ties_formed(&self) -> usize {
        match self {
            Self::Rewired { formed: Some(_), .. } => 1,
            _ => 0,
        }
    }
}

/// Pluggable adaptation strategy.
pub trait AdaptationPolicy: Send + Sync {
    /// Apply one round of adaptation.
    fn adapt(&self, ctx: AdaptationContext<'_>, rng: &mut dyn RngCore)
        -> Result<AdaptationOutcome>;

    /// Get descriptive name.
    fn name(&self) -> &'static str;
}

/// Serializable policy selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum AdaptationConfig {
    /// Coupled break and form (default)
    #[default]
    Paired,
    /// Coupled break and homophilous form
    Homophilous,
    /// Independent break and form with probability `p`
    Probabilistic {
        /// Probability that a tie is formed in a round
        p: f64,
    },
    /// Threshold reinforcement
    Threshold {
        /// Decrease applied to a correct active agent
        phi: f64,
        /// Increase applied to an incorrect active agent
        omega: f64,
    },
}

impl AdaptationConfig {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Paired | Self::Homophilous => Ok(()),
            Self::Probabilistic { p } => {
                if (0.0..=1.0).contains(&p) {
                    Ok(())
                } else {
                    Err(CascadeError::InvalidParameter(format!(
                        "tie formation probability p = {p} must lie in [0, 1]"
                    )))
                }
            }
            Self::Threshold { phi, omega } => {
                if phi >= 0.0 && omega >= 0.0 {
                    Ok(())
                } else {
                    Err(CascadeError::InvalidParameter(format!(
                        "phi = {phi} and omega = {omega} must be non-negative"
                    )))
                }
            }
        }
    }

    /// Instantiate the policy; `low`/`high` bound adjusted thresholds.
    pub fn build(&self, low: f64, high: f64) -> Result<Box<dyn AdaptationPolicy>> {
        self.validate()?;
        Ok(match *self {
            Self::Paired => Box::new(PairedRewiring),
            Self::Homophilous => Box::new(HomophilousRewiring),
            Self::Probabilistic { p } => Box::new(ProbabilisticRewiring::new(p)),
            Self::Threshold { phi, omega } => {
                Box::new(ThresholdAdjustment::new(phi, omega, low, high)?)
            }
        })
    }

    /// Whether the policy rewires ties.
    pub fn rewires(&self) -> bool {
        !matches!(self, Self::Threshold { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_counts() {
        let outcome = AdaptationOutcome::Rewired {
            broken: Some((0, 1)),
            formed: None,
        };
        assert_eq!(outcome.ties_broken(), 1);
        assert_eq!(outcome.ties_formed(), 0);
        assert_eq!(AdaptationOutcome::NoActiveAgents.ties_broken(), 0);
    }

    #[test]
    fn test_config_from_toml() {
        let config: AdaptationConfig = toml::from_str(
            r#"
            policy = "threshold"
            phi = 0.01
            omega = 0.02
        "#,
        )
        .unwrap();
        assert_eq!(
            config,
            AdaptationConfig::Threshold {
                phi: 0.01,
                omega: 0.02
            }
        );
        assert!(!config.rewires());

        let config: AdaptationConfig = toml::from_str(r#"policy = "homophilous""#).unwrap();
        assert_eq!(config, AdaptationConfig::Homophilous);
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        assert!(AdaptationConfig::Probabilistic { p: 1.5 }.validate().is_err());
        assert!(AdaptationConfig::Threshold {
            phi: -0.1,
            omega: 0.1
        }
        .validate()
        .is_err());
        assert!(AdaptationConfig::Paired.build(0.0, 1.0).is_ok());
    }

    #[test]
    fn test_build_names() {
        let names: Vec<&str> = [
            AdaptationConfig::Paired,
            AdaptationConfig::Homophilous,
            AdaptationConfig::Probabilistic { p: 0.5 },
            AdaptationConfig::Threshold {
                phi: 0.1,
                omega: 0.1,
            },
        ]
        .iter()
        .map(|c| c.build(0.0, 1.0).unwrap().name())
        .collect();
        assert_eq!(names, vec!["paired", "homophilous", "probabilistic", "threshold"]);
    }
}
