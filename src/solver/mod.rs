//! One-dimensional root finders.
//!
//! - [`itp`](mod@itp) — Interpolation-Truncation-Projection bracketing
//!   solver with bisection's worst-case iteration bound
//! - [`fixed_point`](mod@fixed_point) — unguarded first-order fixed-point
//!   (Newton-style) iteration, kept as a baseline
//!
//! Both report failure through [`ImpliedVolError`]; a returned
//! [`SolverResult`] is always a converged estimate.

pub mod fixed_point;
pub mod itp;

pub use fixed_point::{FixedPointConfig, IterationStep, fixed_point, taylor_step};
pub use itp::{ItpConfig, itp, try_itp};

use serde::{Deserialize, Serialize};

use crate::error::{self, ImpliedVolError};
use crate::validate::validate_finite;

/// Converged output of a root finder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    /// Root estimate.
    pub root: f64,
    /// Iterations used (function evaluations after the bracket endpoints).
    pub iterations: usize,
    /// Final bracket width (ITP) or last step size (fixed-point).
    pub precision: f64,
}

/// Interval `[low, high]` known to contain a root of `g`.
///
/// Construction checks that `g(low)` and `g(high)` do not share a sign (an
/// exact zero at either end is accepted).
///
/// # Examples
/// ```
/// use ivlattice::solver::Bracket;
///
/// let b = Bracket::evaluate(|x| x * x - 2.0, 0.0, 2.0)?;
/// assert_eq!(b.g_low(), -2.0);
/// assert_eq!(b.g_high(), 2.0);
///
/// assert!(Bracket::evaluate(|x| x * x + 1.0, 0.0, 2.0).is_err());
/// # Ok::<(), ivlattice::ImpliedVolError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    low: f64,
    high: f64,
    g_low: f64,
    g_high: f64,
}

impl Bracket {
    /// Bracket from endpoints and the function values already computed there.
    ///
    /// # Errors
    /// - [`ImpliedVolError::InvalidInput`] if an endpoint is not finite or
    ///   `low > high`
    /// - [`ImpliedVolError::NumericalError`] if a function value is NaN or infinite
    /// - [`ImpliedVolError::InvalidBracket`] if the values share a sign
    pub fn new(low: f64, high: f64, g_low: f64, g_high: f64) -> error::Result<Self> {
        validate_finite(low, "bracket low")?;
        validate_finite(high, "bracket high")?;
        if low > high {
            return Err(ImpliedVolError::InvalidInput {
                message: format!("bracket low ({low}) must not exceed high ({high})"),
            });
        }
        if !g_low.is_finite() || !g_high.is_finite() {
            return Err(ImpliedVolError::NumericalError {
                message: format!("target function not finite at bracket: g({low}) = {g_low}, g({high}) = {g_high}"),
            });
        }
        let straddles = (g_low <= 0.0 && g_high >= 0.0) || (g_low >= 0.0 && g_high <= 0.0);
        if !straddles {
            return Err(ImpliedVolError::InvalidBracket {
                low,
                high,
                g_low,
                g_high,
            });
        }
        Ok(Self {
            low,
            high,
            g_low,
            g_high,
        })
    }

    /// Evaluate `g` at both endpoints and validate the bracket.
    ///
    /// # Errors
    /// Same as [`Bracket::new`].
    pub fn evaluate<F>(mut g: F, low: f64, high: f64) -> error::Result<Self>
    where
        F: FnMut(f64) -> f64,
    {
        Self::try_evaluate(|x| Ok(g(x)), low, high)
    }

    /// Like [`evaluate`](Bracket::evaluate) for a fallible `g`.
    ///
    /// # Errors
    /// Propagates errors from `g`; otherwise as [`Bracket::new`].
    pub fn try_evaluate<F>(mut g: F, low: f64, high: f64) -> error::Result<Self>
    where
        F: FnMut(f64) -> error::Result<f64>,
    {
        validate_finite(low, "bracket low")?;
        validate_finite(high, "bracket high")?;
        let g_low = g(low)?;
        let g_high = g(high)?;
        Self::new(low, high, g_low, g_high)
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn g_low(&self) -> f64 {
        self.g_low
    }

    pub fn g_high(&self) -> f64 {
        self.g_high
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Whether `x` lies in `[low, high]`.
    pub fn contains(&self, x: f64) -> bool {
        (self.low..=self.high).contains(&x)
    }
}
