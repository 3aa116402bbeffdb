//! Parallel parameter sweeps.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::driver::{Replicate, ReplicateOutput};
use crate::config::Config;
use crate::error::{CascadeError, Result};

/// Which `(γ, replicate)` pairs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Source correlations
    pub gammas: Vec<f64>,
    /// Replicates per correlation
    pub replicates: usize,
    /// Worker threads (`None` uses the global rayon pool)
    pub threads: Option<usize>,
}

impl SweepPlan {
    /// Every job in output order: sorted by `γ`, then replicate id.
    pub fn jobs(&self) -> Vec<(f64, usize)> {
        let mut gammas = self.gammas.clone();
        gammas.sort_by(f64::total_cmp);
        gammas.dedup();
        gammas
            .into_iter()
            .flat_map(|g| (0..self.replicates).map(move |r| (g, r)))
            .collect()
    }
}

/// Run every job of `plan` in parallel.
///
/// Each replicate owns its state and RNG, so results depend only on
/// `(config, γ, replicate)`, never on scheduling.
pub fn run_sweep(config: &Config, plan: &SweepPlan) -> Result<Vec<ReplicateOutput>> {
    let jobs = plan.jobs();
    for &(gamma, _) in &jobs {
        let mut job_config = config.clone();
        job_config.model.gamma = gamma;
        job_config.validate()?;
    }
    info!(jobs = jobs.len(), threads = ?plan.threads, "Starting sweep");

    let run = || {
        jobs.par_iter()
            .map(|&(gamma, replicate)| {
                let mut job_config = config.clone();
                job_config.model.gamma = gamma;
                Replicate::new(&job_config, replicate)?.run()
            })
            .collect::<Result<Vec<_>>>()
    };

    match plan.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads.max(1))
                .build()
                .map_err(|e| CascadeError::InvalidParameter(format!("thread pool: {e}")))?;
            pool.install(run)
        }
        None => run(),
    }
}
