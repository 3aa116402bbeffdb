//! Replicate driver.
//!
//! A replicate seeds its population and network from a deterministic seed,
//! runs the configured number of rounds, and returns plain structures for
//! an external persistence layer.
//!
//! # Round
//!
//! ```text
//! sample_stimulus ─> propagate ─> evaluate ─> AdaptationPolicy::adapt
//!        │                │            │               │
//!        └── CascadeRecord ┘   BehaviorLedger    TieWindow counters
//! ```
//!
//! Replicates share no mutable state. [`run_sweep`] runs many of them on a
//! `rayon` pool and returns results ordered by `(γ, replicate)` no matter
//! how the pool scheduled them.

mod driver;
mod fitness;
mod sweep;

pub use driver::{
    AssortPoint, FitnessComparison, Replicate, ReplicateOutput, RoundReport, TieWindow,
};
pub use fitness::{assess_fitness, FitnessReport, TrialSettings};
pub use sweep::{run_sweep, SweepPlan};

/// Seed multiplier carried over from the reference experiments.
const LEGACY_SEED_SCALE: f64 = 323.0;

/// Deterministic seed for replicate `replicate` at correlation `gamma`.
///
/// Folds `⌊(replicate + 1 + γ) · 323⌋` into `base_seed` together with the
/// bits of `γ`, so `(1, 0.0)` and `(0, 1.0)` get different streams.
pub fn replicate_seed(base_seed: u64, replicate: usize, gamma: f64) -> u64 {
    let legacy = ((replicate as f64 + 1.0 + gamma) * LEGACY_SEED_SCALE).floor() as i64;
    splitmix64(base_seed.wrapping_add(legacy as u64) ^ splitmix64(gamma.to_bits()))
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
