//! Response thresholds.

use rand::Rng;

use crate::error::{CascadeError, Result};

/// Draw `n` thresholds uniformly on the open interval `(low, high)`.
///
/// `gen_range` is half-open, so a draw equal to `low` is redrawn. Downstream
/// comparisons are strict (`stimulus > threshold`) and a threshold sitting on
/// the boundary would make the agent unreachable or always-on.
pub fn seed_thresholds<R: Rng + ?Sized>(
    n: usize,
    low: f64,
    high: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    validate_bounds(low, high)?;

    let mut thresholds = Vec::with_capacity(n);
    for _ in 0..n {
        let mut value = rng.gen_range(low..high);
        while value <= low {
            value = rng.gen_range(low..high);
        }
        thresholds.push(value);
    }
    Ok(thresholds)
}

/// Clamp every threshold into `[low, high]`.
pub fn clamp_thresholds(thresholds: &mut [f64], low: f64, high: f64) {
    for value in thresholds.iter_mut() {
        *value = value.clamp(low, high);
    }
}

pub(crate) fn validate_bounds(low: f64, high: f64) -> Result<()> {
    if !low.is_finite() || !high.is_finite() || low >= high {
        return Err(CascadeError::InvalidParameter(format!(
            "threshold bounds must satisfy low < high, got [{low}, {high}]"
        )));
    }
    Ok(())
}
