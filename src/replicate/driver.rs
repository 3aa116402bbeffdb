//! Single-replicate simulation loop.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::fitness::{assess_fitness, FitnessReport, TrialSettings};
use super::replicate_seed;
use crate::adaptation::{AdaptationContext, AdaptationOutcome, AdaptationPolicy};
use crate::assortativity::global_assortativity;
use crate::cascade::{evaluate_fitness_trial, propagate, sample_stimulus, BehaviorLedger, CascadeRecord};
use crate::config::Config;
use crate::error::Result;
use crate::network::{seed_social_network, SocialNetwork};
use crate::population::{AgentType, Population};

/// Everything that happened in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Cascade size and composition
    pub record: CascadeRecord,
    /// Propagation sweeps until the fixpoint
    pub iterations: usize,
    /// Agents whose behaviour matched the ground truth
    pub correct: usize,
    /// What the adaptation policy did
    pub outcome: AdaptationOutcome,
}

/// Tie changes over a window of rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieWindow {
    /// First round of the window
    pub start: usize,
    /// One past the last round of the window
    pub end: usize,
    /// Ties removed in the window
    pub broken: usize,
    /// Ties added in the window
    pub formed: usize,
}

/// Global type assortativity after `round` rounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssortPoint {
    /// Rounds completed
    pub round: usize,
    /// `None` when undefined for the network at that point
    pub global: Option<f64>,
}

/// Fitness of the initial and final configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessComparison {
    /// Trials on the initial network and thresholds
    pub initial: FitnessReport,
    /// Trials on the final network and thresholds
    pub last: FitnessReport,
}

/// Plain arrays and tables produced by one replicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateOutput {
    /// Replicate id
    pub replicate: usize,
    /// Source correlation
    pub gamma: f64,
    /// Seed the replicate RNG was built from
    pub seed: u64,
    /// Rounds run
    pub timesteps: usize,
    /// Adaptation policy name
    pub policy: String,
    /// Network before the first round
    pub initial_network: SocialNetwork,
    /// Network after the last round
    pub final_network: SocialNetwork,
    /// Thresholds before the first round
    pub initial_thresholds: Vec<f64>,
    /// Thresholds after the last round
    pub final_thresholds: Vec<f64>,
    /// Type labels
    pub types: Vec<AgentType>,
    /// Cascade ledger (possibly windowed to the first and last rounds)
    pub cascades: Vec<CascadeRecord>,
    /// Per-agent confusion counts over every round
    pub behavior: BehaviorLedger,
    /// Tie changes per diagnostics window
    pub tie_windows: Vec<TieWindow>,
    /// Global assortativity at round 0 and the end of every window
    pub assortativity: Vec<AssortPoint>,
    /// Fitness before and after, when trials are enabled
    pub fitness: Option<FitnessComparison>,
}

/// Keeps every record, or only the first and last `window` of them.
#[derive(Debug)]
struct CascadeLedger {
    window: Option<usize>,
    head: Vec<CascadeRecord>,
    tail: VecDeque<CascadeRecord>,
}

impl CascadeLedger {
    fn new(window: Option<usize>) -> Self {
        Self {
            window,
            head: Vec::new(),
            tail: VecDeque::new(),
        }
    }

    fn push(&mut self, record: CascadeRecord) {
        match self.window {
            None => self.head.push(record),
            Some(w) if self.head.len() < w => self.head.push(record),
            Some(w) => {
                if self.tail.len() == w {
                    self.tail.pop_front();
                }
                if w > 0 {
                    self.tail.push_back(record);
                }
            }
        }
    }

    fn into_records(self) -> Vec<CascadeRecord> {
        let mut records = self.head;
        records.extend(self.tail);
        records
    }
}

/// One simulation replicate.
pub struct Replicate {
    id: usize,
    seed: u64,
    config: Config,
    rng: ChaCha8Rng,
    population: Population,
    network: SocialNetwork,
    initial_network: SocialNetwork,
    initial_thresholds: Vec<f64>,
    policy: Box<dyn AdaptationPolicy>,
    round: usize,
    cascades: CascadeLedger,
    behavior: BehaviorLedger,
    window: TieWindow,
    tie_windows: Vec<TieWindow>,
    assortativity: Vec<AssortPoint>,
}

impl std::fmt::Debug for Replicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replicate")
            .field("id", &self.id)
            .field("seed", &self.seed)
            .field("round", &self.round)
            .field("policy", &self.policy.name())
            .finish_non_exhaustive()
    }
}

impl Replicate {
    /// Seed replicate `id` from `config`.
    ///
    /// Thresholds, then types, then the network are drawn from a
    /// `ChaCha8Rng` seeded by [`replicate_seed`].
    pub fn new(config: &Config, id: usize) -> Result<Self> {
        config.validate()?;
        let m = &config.model;
        let seed = replicate_seed(m.seed, id, m.gamma);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let population = Population::seed(m.n, m.threshold_low, m.threshold_high, &mut rng)?;
        let network = seed_social_network(
            m.n,
            config.network.k,
            config.network.topology,
            config.network.directed,
            &mut rng,
        )?;
        let policy = config.adaptation.build(m.threshold_low, m.threshold_high)?;

        let mut replicate = Self {
            id,
            seed,
            config: config.clone(),
            rng,
            initial_network: network.clone(),
            initial_thresholds: population.thresholds.clone(),
            behavior: BehaviorLedger::new(m.n),
            population,
            network,
            policy,
            round: 0,
            cascades: CascadeLedger::new(config.diagnostics.ledger_window),
            window: TieWindow {
                start: 0,
                end: 0,
                broken: 0,
                formed: 0,
            },
            tie_windows: Vec::new(),
            assortativity: Vec::new(),
        };
        if replicate.config.diagnostics.assort_interval > 0 {
            replicate.record_assortativity();
        }

        debug!(
            replicate = id,
            seed,
            gamma = m.gamma,
            ties = replicate.network.tie_count(),
            policy = replicate.policy.name(),
            "Replicate seeded"
        );
        Ok(replicate)
    }

    /// Replicate id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Rounds completed so far.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Current network.
    pub fn network(&self) -> &SocialNetwork {
        &self.network
    }

    /// Current thresholds and types.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Run one round: sample, cascade, evaluate, adapt.
    pub fn step(&mut self) -> Result<RoundReport> {
        let m = &self.config.model;
        let types = &self.population.types;

        let sampling = sample_stimulus(
            m.gamma,
            m.psi,
            m.stimulus_mean,
            types,
            &self.population.thresholds,
            &mut self.rng,
        )?;
        let outcome = propagate(
            &self.network,
            &sampling.state,
            &self.population.thresholds,
            &sampling.samplers,
        )?;
        let record = CascadeRecord::capture(self.round, &sampling, &outcome.state, types);
        let correct = evaluate_fitness_trial(
            &outcome.state,
            &self.population.thresholds,
            &sampling.stimulus,
            types,
            &mut self.behavior,
        )?;

        let adaptation = self
            .policy
            .adapt(
                AdaptationContext {
                    network: &mut self.network,
                    thresholds: &mut self.population.thresholds,
                    state: &outcome.state,
                    correct: &correct,
                },
                &mut self.rng,
            )
            .inspect_err(|e| {
                warn!(replicate = self.id, round = self.round, error = %e, "Adaptation failed");
            })?;

        trace!(
            round = self.round,
            active = record.total_active,
            iterations = outcome.iterations,
            ?adaptation,
            "Round complete"
        );

        self.cascades.push(record);
        self.window.broken += adaptation.ties_broken();
        self.window.formed += adaptation.ties_formed();
        self.round += 1;

        let interval = self.config.diagnostics.assort_interval;
        if interval > 0 && self.round % interval == 0 {
            self.close_window();
        }

        Ok(RoundReport {
            record,
            iterations: outcome.iterations,
            correct: correct.iter().filter(|c| **c).count(),
            outcome: adaptation,
        })
    }

    fn close_window(&mut self) {
        self.window.end = self.round;
        self.tie_windows.push(self.window);
        self.window = TieWindow {
            start: self.round,
            end: self.round,
            broken: 0,
            formed: 0,
        };
        self.record_assortativity();
    }

    fn record_assortativity(&mut self) {
        let global = match global_assortativity(&self.network, &self.population.types) {
            Ok(r) => Some(r),
            Err(e) => {
                debug!(round = self.round, error = %e, "Assortativity undefined");
                None
            }
        };
        self.assortativity.push(AssortPoint {
            round: self.round,
            global,
        });
    }

    /// Run the remaining rounds, then the fitness trials if enabled.
    pub fn run(mut self) -> Result<ReplicateOutput> {
        let timesteps = self.config.model.timesteps;
        info!(
            replicate = self.id,
            gamma = self.config.model.gamma,
            timesteps,
            "Starting replicate"
        );

        while self.round < timesteps {
            self.step()?;
        }

        let interval = self.config.diagnostics.assort_interval;
        if interval > 0 && self.window.start < self.round {
            self.close_window();
        }

        let fitness = self.assess()?;

        info!(
            replicate = self.id,
            initial_ties = self.initial_network.tie_count(),
            final_ties = self.network.tie_count(),
            "Replicate finished"
        );

        Ok(ReplicateOutput {
            replicate: self.id,
            gamma: self.config.model.gamma,
            seed: self.seed,
            timesteps: self.round,
            policy: self.policy.name().to_string(),
            initial_network: self.initial_network,
            final_network: self.network,
            initial_thresholds: self.initial_thresholds,
            final_thresholds: self.population.thresholds,
            types: self.population.types,
            cascades: self.cascades.into_records(),
            behavior: self.behavior,
            tie_windows: self.tie_windows,
            assortativity: self.assortativity,
            fitness,
        })
    }

    fn assess(&mut self) -> Result<Option<FitnessComparison>> {
        let fit = &self.config.fitness;
        if fit.trials == 0 {
            return Ok(None);
        }
        let settings = TrialSettings {
            gamma: fit.gamma.unwrap_or(self.config.model.gamma),
            psi: fit.psi.unwrap_or(self.config.model.psi),
            stimulus_mean: self.config.model.stimulus_mean,
            trials: fit.trials,
        };

        let initial = assess_fitness(
            &self.initial_network,
            &self.initial_thresholds,
            &self.population.types,
            &settings,
            &mut self.rng,
        )?;
        let last = assess_fitness(
            &self.network,
            &self.population.thresholds,
            &self.population.types,
            &settings,
            &mut self.rng,
        )?;
        Ok(Some(FitnessComparison { initial, last }))
    }
}
