//! ITP (Interpolation-Truncation-Projection) bracketing root finder.
//!
//! Each iteration on the bracket `[a, b]`:
//!
//! ```text
//! x_f = (g(b)·a − g(a)·b) / (g(b) − g(a))          regula falsi
//! δ   = k₁·(b − a)^k₂,  σ = sign(x_½ − x_f)
//! x_t = x_f + σ·δ   if δ ≤ |x_½ − x_f|,  else x_½   truncation
//! r   = ε·2^(n_max − k) − (b − a)/2
//! x   = x_t   if |x_t − x_½| ≤ r,  else x_½ − σ·r   projection
//! ```
//!
//! and the endpoint whose value shares the sign of `g(x)` moves to `x`.
//! The search stops once `b − a ≤ 2ε`, which takes at most
//! `n_max = n₀ + ⌈log₂((b₀ − a₀)/2ε)⌉` iterations: never more than
//! bisection plus `n₀`, and superlinear on smooth functions.
//!
//! # References
//! - Oliveira, I. & Takahashi, R. "An Enhancement of the Bisection Method
//!   Average Performance Preserving Minmax Optimality" (2020)

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{self, ImpliedVolError};
use crate::solver::{Bracket, SolverResult};
use crate::validate::validate_positive;

/// Default absolute tolerance `ε` on the root.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Default truncation scale `k₁`.
pub const DEFAULT_K1: f64 = 0.1;

/// Default truncation exponent `k₂`, about `0.98·(1 + φ)`.
pub const DEFAULT_K2: f64 = 2.565_673_3;

/// Upper bound (exclusive) on `k₂`: `1 + φ`.
const K2_LIMIT: f64 = 2.618_033_988_749_895;

/// Tuning of the ITP solver.
///
/// `k1` and `k2` trade worst-case against average-case behaviour; `n0` is
/// the slack allowed over pure bisection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItpConfig {
    /// Absolute tolerance `ε`; success when the bracket is no wider than `2ε`.
    pub tolerance: f64,
    /// Extra iterations `n₀` allowed beyond the bisection count.
    pub n0: usize,
    /// Truncation scale `k₁ > 0`.
    pub k1: f64,
    /// Truncation exponent `k₂ ∈ [1, 1 + φ)`.
    pub k2: f64,
    /// Wall-clock budget; exceeding it reports non-convergence.
    pub max_duration: Option<Duration>,
}

impl Default for ItpConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            n0: 0,
            k1: DEFAULT_K1,
            k2: DEFAULT_K2,
            max_duration: None,
        }
    }
}

impl ItpConfig {
    /// Default configuration with tolerance `ε`.
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    /// Returns [`ImpliedVolError::InvalidInput`] if `tolerance` or `k1` is not
    /// positive and finite, or `k2` is outside `[1, 1 + φ)`.
    pub fn validate(&self) -> error::Result<()> {
        validate_positive(self.tolerance, "ITP tolerance")?;
        validate_positive(self.k1, "ITP k1")?;
        if !(1.0..K2_LIMIT).contains(&self.k2) {
            return Err(ImpliedVolError::InvalidInput {
                message: format!("ITP k2 must be in [1, 1 + phi), got {}", self.k2),
            });
        }
        Ok(())
    }

    /// Iteration cap `n₀ + ⌈log₂(width / 2ε)⌉` for a bracket of `width`.
    pub fn max_iterations(&self, width: f64) -> usize {
        let n_half = (width / (2.0 * self.tolerance)).log2().ceil();
        let n_half = if n_half.is_finite() && n_half > 0.0 {
            n_half as usize
        } else {
            0
        };
        self.n0 + n_half
    }
}

/// Find a root of `g` inside `bracket`.
///
/// # Examples
/// ```
/// use ivlattice::solver::{Bracket, ItpConfig, itp};
///
/// let g = |x: f64| x * x - 2.0;
/// let bracket = Bracket::evaluate(g, 0.0, 2.0)?;
/// let config = ItpConfig::with_tolerance(1e-6);
/// let result = itp(g, &bracket, &config)?;
/// assert!((result.root - 2.0_f64.sqrt()).abs() < 1e-6);
/// assert!(result.iterations <= config.max_iterations(2.0));
/// # Ok::<(), ivlattice::ImpliedVolError>(())
/// ```
///
/// # Errors
/// See [`try_itp`].
pub fn itp<F>(mut g: F, bracket: &Bracket, config: &ItpConfig) -> error::Result<SolverResult>
where
    F: FnMut(f64) -> f64,
{
    try_itp(|x| Ok(g(x)), bracket, config)
}

/// Find a root of a fallible `g` inside `bracket`.
///
/// Works for increasing and decreasing `g`: the endpoint replaced at each
/// step is the one whose value has the same sign as the new evaluation.
///
/// # Errors
/// - [`ImpliedVolError::InvalidInput`] for an invalid `config`
/// - [`ImpliedVolError::NumericalError`] if `g` returns NaN or an infinity
/// - [`ImpliedVolError::NonConvergence`] if the iteration cap or the time
///   budget is exhausted, or the estimate falls outside the bracket
/// - any error returned by `g`
pub fn try_itp<F>(mut g: F, bracket: &Bracket, config: &ItpConfig) -> error::Result<SolverResult>
where
    F: FnMut(f64) -> error::Result<f64>,
{
    config.validate()?;

    if bracket.g_low() == 0.0 {
        return Ok(SolverResult {
            root: bracket.low(),
            iterations: 0,
            precision: 0.0,
        });
    }
    if bracket.g_high() == 0.0 {
        return Ok(SolverResult {
            root: bracket.high(),
            iterations: 0,
            precision: 0.0,
        });
    }

    let started = Instant::now();
    let eps = config.tolerance;
    let n_max = config.max_iterations(bracket.width());
    // once the projection radius reaches zero every step is a bisection, and
    // each rounded midpoint may leave the bracket up to half an ulp wider
    let scale = bracket.low().abs().max(bracket.high().abs());
    let target_width = 2.0 * eps + (n_max as f64 + 1.0) * f64::EPSILON * scale;

    let (mut a, mut b) = (bracket.low(), bracket.high());
    let (mut ya, mut yb) = (bracket.g_low(), bracket.g_high());
    let mut k = 0usize;

    while b - a > target_width {
        if k >= n_max || config.max_duration.is_some_and(|d| started.elapsed() > d) {
            return Err(ImpliedVolError::NonConvergence {
                solver: "ITP",
                iterations: k,
                estimate: 0.5 * (a + b),
            });
        }

        let width = b - a;
        let x_half = 0.5 * (a + b);

        // interpolation
        let denom = yb - ya;
        let x_f = if denom.abs() > f64::MIN_POSITIVE {
            (yb * a - ya * b) / denom
        } else {
            x_half
        };
        let x_f = if x_f.is_finite() { x_f } else { x_half };

        // truncation
        let sigma = if x_half > x_f {
            1.0
        } else if x_half < x_f {
            -1.0
        } else {
            0.0
        };
        let delta = config.k1 * width.powf(config.k2);
        let x_t = if delta <= (x_half - x_f).abs() {
            x_f + sigma * delta
        } else {
            x_half
        };

        // projection
        let exponent = (n_max - k).min(i32::MAX as usize) as i32;
        let r = eps * 2.0_f64.powi(exponent) - 0.5 * width;
        let x = if (x_t - x_half).abs() <= r {
            x_t
        } else {
            x_half - sigma * r
        };

        let y = g(x)?;
        if !y.is_finite() {
            return Err(ImpliedVolError::NumericalError {
                message: format!("target function returned {y} at {x}"),
            });
        }

        if y == 0.0 {
            a = x;
            b = x;
        } else if y.signum() == ya.signum() {
            a = x;
            ya = y;
        } else {
            b = x;
            yb = y;
        }
        k += 1;

        #[cfg(feature = "logging")]
        tracing::trace!(iteration = k, a, b, x, y, "ITP step");
    }

    let root = 0.5 * (a + b);
    if !bracket.contains(root) {
        return Err(ImpliedVolError::NonConvergence {
            solver: "ITP",
            iterations: k,
            estimate: root,
        });
    }

    Ok(SolverResult {
        root,
        iterations: k,
        precision: b - a,
    })
}
