//! Tie-breaking and tie-forming policies.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tracing::trace;

use super::{AdaptationContext, AdaptationOutcome, AdaptationPolicy};
use crate::error::{CascadeError, Result};
use crate::network::SocialNetwork;

/// Result of the break step shared by every rewiring policy.
enum BreakStep {
    NoActiveAgents,
    Correct,
    Broken(usize, usize),
}

/// Pick a random active agent; if it behaved incorrectly, drop its tie to a
/// random active neighbour.
fn break_tie(ctx: &mut AdaptationContext<'_>, rng: &mut dyn RngCore) -> Result<BreakStep> {
    let actives = ctx.active_agents();
    let Some(&breaker) = actives.choose(rng) else {
        return Ok(BreakStep::NoActiveAgents);
    };
    if ctx.correct[breaker] {
        return Ok(BreakStep::Correct);
    }

    let active_neighbors: Vec<usize> = ctx
        .network
        .neighbors(breaker)
        .filter(|&j| ctx.state[j])
        .collect();
    let &dropped = active_neighbors
        .choose(rng)
        .ok_or(CascadeError::NoActiveNeighbor(breaker))?;

    ctx.network.remove_tie(breaker, dropped)?;
    trace!(breaker, dropped, "tie broken");
    Ok(BreakStep::Broken(breaker, dropped))
}

/// Agents that still have at least one possible new tie.
fn unsaturated(network: &SocialNetwork) -> Vec<usize> {
    (0..network.len()).filter(|&i| !network.is_saturated(i)).collect()
}

/// Tie a random unsaturated agent to one of `choose_partner`'s picks.
fn form_tie<F>(
    network: &mut SocialNetwork,
    rng: &mut dyn RngCore,
    choose_partner: F,
) -> Result<(usize, usize)>
where
    F: FnOnce(&SocialNetwork, usize, &mut dyn RngCore) -> Option<usize>,
{
    let former = *unsaturated(network)
        .choose(rng)
        .ok_or(CascadeError::GraphComplete)?;
    let partner = choose_partner(network, former, rng).ok_or(CascadeError::GraphComplete)?;
    network.add_tie(former, partner)?;
    trace!(former, partner, "tie formed");
    Ok((former, partner))
}

fn random_partner(network: &SocialNetwork, former: usize, rng: &mut dyn RngCore) -> Option<usize> {
    network.non_neighbors(former).choose(rng).copied()
}

/// Break-and-form with exactly one replacement tie per broken tie.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairedRewiring;

impl AdaptationPolicy for PairedRewiring {
    fn adapt(
        &self,
        mut ctx: AdaptationContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<AdaptationOutcome> {
        ctx.check_dimensions()?;
        match break_tie(&mut ctx, rng)? {
            BreakStep::NoActiveAgents => Ok(AdaptationOutcome::NoActiveAgents),
            BreakStep::Correct => Ok(AdaptationOutcome::Unchanged),
            BreakStep::Broken(a, b) => {
                let formed = form_tie(ctx.network, rng, random_partner)?;
                Ok(AdaptationOutcome::Rewired {
                    broken: Some((a, b)),
                    formed: Some(formed),
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "paired"
    }
}

/// Break-and-form where the replacement tie prefers like-minded agents.
///
/// Agents cannot see types. The forming agent infers whether the last
/// stimulus mattered from its own behaviour: it was important if the agent
/// was active and correct, or inactive and incorrect. It then prefers
/// non-neighbours whose activation equals that flag, falling back to any
/// non-neighbour when there is none.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomophilousRewiring;

impl AdaptationPolicy for HomophilousRewiring {
    fn adapt(
        &self,
        mut ctx: AdaptationContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<AdaptationOutcome> {
        ctx.check_dimensions()?;
        match break_tie(&mut ctx, rng)? {
            BreakStep::NoActiveAgents => Ok(AdaptationOutcome::NoActiveAgents),
            BreakStep::Correct => Ok(AdaptationOutcome::Unchanged),
            BreakStep::Broken(a, b) => {
                let state = ctx.state;
                let correct = ctx.correct;
                let formed = form_tie(ctx.network, rng, |network, former, rng| {
                    let important = state[former] == correct[former];
                    let candidates = network.non_neighbors(former);
                    let like_minded: Vec<usize> = candidates
                        .iter()
                        .copied()
                        .filter(|&j| state[j] == important)
                        .collect();
                    if like_minded.is_empty() {
                        candidates.choose(rng).copied()
                    } else {
                        like_minded.choose(rng).copied()
                    }
                })?;
                Ok(AdaptationOutcome::Rewired {
                    broken: Some((a, b)),
                    formed: Some(formed),
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "homophilous"
    }
}

/// Independent break and form.
///
/// The break step is the same as [`PairedRewiring`]. Separately, with
/// probability `p`, a random unsaturated agent forms a tie to a random
/// non-neighbour, whether or not anything was broken.
#[derive(Debug, Clone, Copy)]
pub struct ProbabilisticRewiring {
    p: f64,
}

impl ProbabilisticRewiring {
    /// Create a policy forming ties with probability `p`.
    pub fn new(p: f64) -> Self {
        Self { p: p.clamp(0.0, 1.0) }
    }

    /// Tie formation probability.
    pub fn probability(&self) -> f64 {
        self.p
    }
}

impl AdaptationPolicy for ProbabilisticRewiring {
    fn adapt(
        &self,
        mut ctx: AdaptationContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<AdaptationOutcome> {
        ctx.check_dimensions()?;
        let step = break_tie(&mut ctx, rng)?;

        let formed = if rng.gen_bool(self.p) {
            Some(form_tie(ctx.network, rng, random_partner)?)
        } else {
            None
        };

        Ok(match (step, formed) {
            (BreakStep::Broken(a, b), formed) => AdaptationOutcome::Rewired {
                broken: Some((a, b)),
                formed,
            },
            (_, Some(formed)) => AdaptationOutcome::Rewired {
                broken: None,
                formed: Some(formed),
            },
            (BreakStep::NoActiveAgents, None) => AdaptationOutcome::NoActiveAgents,
            (BreakStep::Correct, None) => AdaptationOutcome::Unchanged,
        })
    }

    fn name(&self) -> &'static str {
        "probabilistic"
    }
}
