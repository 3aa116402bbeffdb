//! # Infocascade - Information Cascades on Adaptive Social Networks
//!
//! Threshold-contagion model of how correlated information sources and
//! network restructuring produce ideological segregation.
//!
//! ## Features
//!
//! - **Correlated stimuli**: bivariate-normal source pairs squashed into `[0, 1]`
//! - **Threshold cascades**: synchronous propagation to a provable fixpoint
//! - **Behaviour evaluation**: per-agent ground truth and confusion ledgers
//! - **Adaptation policies**: paired, homophilous and probabilistic rewiring,
//!   or threshold reinforcement
//! - **Assortativity diagnostics**: global and PageRank-localised, for types
//!   and scalar traits
//! - **Reproducible sweeps**: explicit RNG handles and deterministic seeds
//!
//! ## Model Overview
//!
//! Each round a fraction `ψ` of agents observe a pair of source values
//! directly. Agents of type A attend to the first source, type B to the
//! second. An agent reacts when what it perceives exceeds its threshold.
//! Everyone else reacts only when the weighted fraction of active
//! neighbours exceeds their threshold.
//!
//! ### Round
//!
//! ```text
//!   Stimulus Generator
//!          │  (s1, s2)
//!          v
//!   Sampler selection ──> initial state
//!          │
//!          v
//!   Cascade Propagation ──> fixpoint state
//!          │
//!          v
//!   Behavior Evaluator ──> correct[n]
//!          │
//!          v
//!   Network Adaptation ──> network / thresholds mutated in place
//! ```
//!
//! Assortativity diagnostics run out of band, on snapshots.
//!
//! ### Adaptation Policies
//!
//! | Policy        | Break                         | Form                              |
//! |---------------|-------------------------------|-----------------------------------|
//! | `paired`      | incorrect active → active nbr | exactly one per break, random     |
//! | `homophilous` | as paired                     | one per break, like-minded first  |
//! | `probabilistic` | as paired                   | independently with probability p  |
//! | `threshold`   | none                          | none; thresholds move by phi/omega|
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use infocascade::{Config, Replicate};
//!
//! let mut config = Config::default();
//! config.model.n = 100;
//! config.model.gamma = 0.5;
//! config.model.timesteps = 10_000;
//!
//! let output = Replicate::new(&config, 0)?.run()?;
//! println!("Final ties: {}", output.final_network.tie_count());
//! ```
//!
//! ### Single Cascade
//!
//! ```rust
//! use infocascade::{propagate, SocialNetwork};
//!
//! let network = SocialNetwork::complete(3, false);
//! let outcome = propagate(&network, &[true, false, false], &[0.3, 0.4, 0.9], &[]).unwrap();
//! assert_eq!(outcome.state, vec![true, true, true]);
//! ```
//!
//! ## Modules
//!
//! - [`stimulus`]: Correlated source generation
//! - [`population`]: Thresholds and type labels
//! - [`network`]: Adjacency storage, generators, shortest paths
//! - [`cascade`]: Sampling, propagation, evaluation, ledgers
//! - [`adaptation`]: Rewiring and threshold policies
//! - [`assortativity`]: Global and local assortativity
//! - [`replicate`]: Replicate driver, fitness trials, sweeps
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod adaptation;
pub mod assortativity;
pub mod cascade;
pub mod config;
pub mod error;
pub mod network;
pub mod population;
pub mod replicate;
pub mod stimulus;

// Re-exports for convenience
pub use adaptation::{AdaptationConfig, AdaptationContext, AdaptationOutcome, AdaptationPolicy};
pub use assortativity::{
    global_assortativity, local_assortativity, local_assortativity_continuous,
    personalized_pagerank, threshold_differences, AssortativitySnapshot,
};
pub use cascade::{
    evaluate, propagate, sample_stimulus, BehaviorLedger, CascadeOutcome, CascadeRecord,
};
pub use config::Config;
pub use error::{CascadeError, Result};
pub use network::{seed_social_network, SocialNetwork, Topology};
pub use population::{AgentType, Population};
pub use replicate::{
    assess_fitness, replicate_seed, run_sweep, FitnessReport, Replicate, ReplicateOutput,
    SweepPlan,
};
pub use stimulus::{generate_stimulus, StimulusPair};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
