//! Information cascades: sampling, propagation and evaluation.
//!
//! # Round Anatomy
//!
//! ```text
//! sample_stimulus()          propagate()               evaluate()
//!  stimulus pair  ──────>  initial state  ──────>  fixpoint state  ──────>  correct[n]
//!  + samplers              (samplers only)         (samplers frozen)        (vs ground truth)
//! ```
//!
//! The cascade itself is a pure function of the network, thresholds and
//! initial state; only sampling consumes randomness.

mod engine;
mod evaluate;
mod sampling;
mod stats;

pub use engine::{propagate, propagate_trace, social_stimulus, CascadeOutcome};
pub use evaluate::{
    evaluate, evaluate_fitness_trial, ground_truth, BehaviorLedger, ConfusionCounts,
};
pub use sampling::{sample_stimulus, sampler_count, Sampling};
pub use stats::CascadeRecord;
