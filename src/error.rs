//! Error types for the ivlattice library.
//!
//! All fallible operations return `Result<T, ImpliedVolError>` rather than
//! panicking. Numerical degeneracies inside the pricers (`u ≈ d`, vanishing
//! vega) are absorbed by flooring and never surface here; what does surface
//! is bad input, a bracket that does not straddle a root, or a solver that
//! ran out of iterations.

use serde::Serialize;
use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, ImpliedVolError>;

/// Errors that can occur while pricing or inverting an option price.
///
/// Serializable so batch outcomes can be reported; not deserializable.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[non_exhaustive]
pub enum ImpliedVolError {
    /// Input data is invalid (e.g., NaN rate, zero strike, zero steps).
    ///
    /// A dividend or rate lookup that failed upstream arrives as a missing
    /// (NaN) or negative field and is reported through this variant.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The initial bracket does not straddle a root.
    #[error("invalid bracket [{low}, {high}]: g(low) = {g_low}, g(high) = {g_high} have the same sign")]
    InvalidBracket {
        low: f64,
        high: f64,
        g_low: f64,
        g_high: f64,
    },

    /// The solver exhausted its iteration or time budget.
    #[error("{solver} did not converge after {iterations} iterations (last estimate {estimate})")]
    NonConvergence {
        /// Solver that failed (e.g., "ITP", "fixed-point").
        solver: &'static str,
        iterations: usize,
        /// Last iterate, for diagnostics only. Not a usable root.
        estimate: f64,
    },

    /// A target function produced NaN or an infinity.
    #[error("numerical error: {message}")]
    NumericalError { message: String },
}

impl ImpliedVolError {
    /// Whether this error is a convergence failure (as opposed to bad input).
    pub fn is_non_convergence(&self) -> bool {
        matches!(self, Self::NonConvergence { .. })
    }
}
