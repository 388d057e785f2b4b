//! Unguarded fixed-point iteration `x_{k+1} = f(x_k)`.
//!
//! With the first-order Taylor map
//!
//! ```text
//! f(σ) = σ + (P_obs − V(σ)) / ν(σ)
//! ```
//!
//! this is Newton's method on `V(σ) − P_obs`. There is no bracket and no
//! monotonicity guarantee: a poor starting point or a flat price curve can
//! send the iterates anywhere. Use [`itp`](mod@super::itp) when a guaranteed
//! answer matters; this solver is kept as a baseline.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{self, ImpliedVolError};
use crate::solver::SolverResult;
use crate::validate::{validate_finite, validate_positive};

/// Default starting point.
pub const DEFAULT_INITIAL_GUESS: f64 = 0.1;

/// Default tolerance on `|x_{k+1} − x_k|`.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

/// Default iteration cap.
pub const DEFAULT_MAX_ITER: usize = 1000;

/// Smallest vega magnitude used as a Taylor-step denominator.
pub const VEGA_FLOOR: f64 = 1e-12;

/// Tuning of the fixed-point solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedPointConfig {
    /// Starting iterate `x₀`.
    pub initial_guess: f64,
    /// Success when two successive iterates differ by at most this.
    pub tolerance: f64,
    /// Maximum number of map evaluations.
    pub max_iter: usize,
    /// Wall-clock budget; exceeding it reports non-convergence.
    pub max_duration: Option<Duration>,
}

impl Default for FixedPointConfig {
    fn default() -> Self {
        Self {
            initial_guess: DEFAULT_INITIAL_GUESS,
            tolerance: DEFAULT_TOLERANCE,
            max_iter: DEFAULT_MAX_ITER,
            max_duration: None,
        }
    }
}

impl FixedPointConfig {
    /// Check parameter ranges.
    ///
    /// # Errors
    /// Returns [`ImpliedVolError::InvalidInput`] if the initial guess is not
    /// finite, the tolerance is not positive, or `max_iter` is zero.
    pub fn validate(&self) -> error::Result<()> {
        validate_finite(self.initial_guess, "fixed-point initial guess")?;
        validate_positive(self.tolerance, "fixed-point tolerance")?;
        if self.max_iter == 0 {
            return Err(ImpliedVolError::InvalidInput {
                message: "fixed-point max_iter must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// One iteration of [`fixed_point`], passed to the observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationStep {
    /// 1-based iteration number.
    pub iteration: usize,
    /// New iterate `x_k`.
    pub estimate: f64,
    /// `|x_k − x_{k−1}|`.
    pub step: f64,
}

/// First-order Taylor update `x + (target − price) / vega`.
///
/// `vega` is floored at [`VEGA_FLOOR`] in magnitude, keeping its sign, so a
/// flat price curve produces a huge step rather than a division by zero.
///
/// # Examples
/// ```
/// use ivlattice::solver::taylor_step;
///
/// // price 2.0 with vega 5.0 at σ = 0.3; target 2.5 moves σ up by 0.1
/// let next = taylor_step(2.0, 5.0, 2.5, 0.3);
/// assert!((next - 0.4).abs() < 1e-12);
/// ```
pub fn taylor_step(price: f64, vega: f64, target: f64, x: f64) -> f64 {
    let vega = if vega.abs() < VEGA_FLOOR {
        VEGA_FLOOR.copysign(vega)
    } else {
        vega
    };
    x + (target - price) / vega
}

/// Iterate `map` from `config.initial_guess` until successive iterates agree
/// within `config.tolerance`.
///
/// `observer` is called after every iteration.
///
/// # Errors
/// - [`ImpliedVolError::InvalidInput`] for an invalid `config`
/// - [`ImpliedVolError::NonConvergence`] if the iteration cap or time budget
///   is exhausted, or an iterate is NaN or infinite
/// - any error returned by `map`
pub fn fixed_point<F>(
    mut map: F,
    config: &FixedPointConfig,
    mut observer: Option<&mut dyn FnMut(&IterationStep)>,
) -> error::Result<SolverResult>
where
    F: FnMut(f64) -> error::Result<f64>,
{
    config.validate()?;

    let started = Instant::now();
    let mut x = config.initial_guess;

    for iteration in 1..=config.max_iter {
        if config.max_duration.is_some_and(|d| started.elapsed() > d) {
            return Err(ImpliedVolError::NonConvergence {
                solver: "fixed-point",
                iterations: iteration - 1,
                estimate: x,
            });
        }

        let next = map(x)?;
        if !next.is_finite() {
            return Err(ImpliedVolError::NonConvergence {
                solver: "fixed-point",
                iterations: iteration,
                estimate: x,
            });
        }

        let step = (next - x).abs();
        let record = IterationStep {
            iteration,
            estimate: next,
            step,
        };
        #[cfg(feature = "logging")]
        tracing::trace!(iteration, estimate = next, step, "fixed-point step");
        if let Some(observe) = observer.as_mut() {
            observe(&record);
        }

        x = next;
        if step <= config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                precision: step,
            });
        }
    }

    Err(ImpliedVolError::NonConvergence {
        solver: "fixed-point",
        iterations: config.max_iter,
        estimate: x,
    })
}
