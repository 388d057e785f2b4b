//! Implied volatility: invert a [`Pricer`] against an observed price.
//!
//! The pricer is wrapped as `g(σ) = price(σ) − observed` and handed to one
//! of two strategies:
//!
//! - [`SolverStrategy::Itp`] — bracketing ITP search on `[low, high]`;
//!   always terminates with an answer inside the bracket or an error
//! - [`SolverStrategy::Legacy`] — Newton-style fixed-point iteration from a
//!   single starting guess, kept for comparison
//!
//! ```
//! use ivlattice::{ContractSpec, Dividend, Expiry, ImpliedVolSolver, OptionType};
//!
//! let spec = ContractSpec::new(
//!     10.0,
//!     12.0,
//!     Dividend::none(),
//!     0.05,
//!     Expiry::TradingDays(504.0),
//!     OptionType::Call,
//! )?;
//!
//! let solver = ImpliedVolSolver::builder().build()?;
//! let vol = solver.implied_vol(&spec, 1.9174)?;
//! assert!((vol.0 - 0.40).abs() < 0.01);
//! # Ok::<(), ivlattice::ImpliedVolError>(())
//! ```

pub mod batch;

pub use batch::{BatchConfig, BatchReport, ContractOutcome, Quote, solve_batch};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{self, ImpliedVolError};
use crate::pricing::{Pricer, PricingModel};
use crate::solver::{
    Bracket, FixedPointConfig, ItpConfig, SolverResult, fixed_point, taylor_step, try_itp,
};
use crate::types::{ContractSpec, Vol};
use crate::validate::validate_positive;

/// Default lower end of the volatility bracket.
pub const DEFAULT_VOL_LOW: f64 = 0.01;

/// Default upper end of the volatility bracket.
pub const DEFAULT_VOL_HIGH: f64 = 3.0;

/// Root-finding strategy used by [`ImpliedVolSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SolverStrategy {
    /// ITP search on the volatility bracket `[low, high]`.
    Itp {
        low: f64,
        high: f64,
        config: ItpConfig,
    },
    /// Fixed-point Taylor iteration; no bracket, no convergence guarantee.
    Legacy(FixedPointConfig),
}

impl Default for SolverStrategy {
    fn default() -> Self {
        SolverStrategy::Itp {
            low: DEFAULT_VOL_LOW,
            high: DEFAULT_VOL_HIGH,
            config: ItpConfig::default(),
        }
    }
}

impl SolverStrategy {
    /// Default legacy strategy.
    pub fn legacy() -> Self {
        SolverStrategy::Legacy(FixedPointConfig::default())
    }

    /// Check the strategy's parameters.
    ///
    /// # Errors
    /// Returns [`ImpliedVolError::InvalidInput`] for a bracket that is not
    /// `0 < low < high` or an invalid solver config.
    pub fn validate(&self) -> error::Result<()> {
        match self {
            SolverStrategy::Itp { low, high, config } => {
                validate_positive(*low, "volatility bracket low")?;
                validate_positive(*high, "volatility bracket high")?;
                if low >= high {
                    return Err(ImpliedVolError::InvalidInput {
                        message: format!(
                            "volatility bracket low ({low}) must be below high ({high})"
                        ),
                    });
                }
                config.validate()
            }
            SolverStrategy::Legacy(config) => config.validate(),
        }
    }

    fn with_tolerance(self, tolerance: f64) -> Self {
        match self {
            SolverStrategy::Itp { low, high, config } => SolverStrategy::Itp {
                low,
                high,
                config: ItpConfig {
                    tolerance,
                    ..config
                },
            },
            SolverStrategy::Legacy(config) => SolverStrategy::Legacy(FixedPointConfig {
                tolerance,
                ..config
            }),
        }
    }
}

/// A pricing model bound to a root-finding strategy.
///
/// Immutable once built and `Send + Sync`, so one solver can serve every
/// worker of a batch.
pub struct ImpliedVolSolver {
    model: PricingModel,
    strategy: SolverStrategy,
    pricer: Box<dyn Pricer>,
}

impl fmt::Debug for ImpliedVolSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImpliedVolSolver")
            .field("model", &self.model)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl ImpliedVolSolver {
    /// Start configuring a solver.
    pub fn builder() -> ImpliedVolBuilder {
        ImpliedVolBuilder::new()
    }

    /// Solver for `model` with `strategy`.
    ///
    /// # Errors
    /// Returns [`ImpliedVolError::InvalidInput`] if the model or the strategy
    /// is misconfigured.
    pub fn new(model: PricingModel, strategy: SolverStrategy) -> error::Result<Self> {
        strategy.validate()?;
        let pricer = model.pricer()?;
        Ok(Self {
            model,
            strategy,
            pricer,
        })
    }

    pub fn model(&self) -> PricingModel {
        self.model
    }

    pub fn strategy(&self) -> SolverStrategy {
        self.strategy
    }

    /// Find the volatility at which the model reproduces `observed_price`.
    ///
    /// # Errors
    /// - [`ImpliedVolError::InvalidInput`] if `observed_price` is not
    ///   positive and finite
    /// - [`ImpliedVolError::InvalidBracket`] if the price is not attainable
    ///   inside the ITP bracket (checked before iterating)
    /// - [`ImpliedVolError::NonConvergence`] if the solver gives up
    /// - [`ImpliedVolError::NumericalError`] if the pricer produces NaN
    pub fn solve(&self, spec: &ContractSpec, observed_price: f64) -> error::Result<SolverResult> {
        validate_positive(observed_price, "observed price")?;

        #[cfg(feature = "logging")]
        tracing::debug!(
            model = self.pricer.name(),
            strike = spec.strike(),
            observed_price,
            "implied vol solve start"
        );

        let pricer = self.pricer.as_ref();
        let target =
            |vol: f64| -> error::Result<f64> { Ok(pricer.price(spec, vol)? - observed_price) };

        let result = match self.strategy {
            SolverStrategy::Itp { low, high, config } => Bracket::try_evaluate(target, low, high)
                .and_then(|bracket| try_itp(target, &bracket, &config)),
            SolverStrategy::Legacy(config) => {
                let taylor = |vol: f64| -> error::Result<f64> {
                    // iterate left the volatility domain; reported as non-convergence
                    if vol <= 0.0 {
                        return Ok(f64::NAN);
                    }
                    let price = pricer.price(spec, vol)?;
                    let vega = pricer.vega(spec, vol)?;
                    Ok(taylor_step(price, vega, observed_price, vol))
                };
                fixed_point(taylor, &config, None)
            }
        };

        #[cfg(feature = "logging")]
        {
            match &result {
                Ok(r) => tracing::debug!(
                    vol = r.root,
                    iterations = r.iterations,
                    "implied vol solve converged"
                ),
                Err(e) => tracing::debug!(error = %e, "implied vol solve failed"),
            }
        }

        result
    }

    /// Like [`solve`](Self::solve), returning only the volatility.
    ///
    /// # Errors
    /// Same as [`solve`](Self::solve).
    pub fn implied_vol(&self, spec: &ContractSpec, observed_price: f64) -> error::Result<Vol> {
        self.solve(spec, observed_price).map(|r| Vol(r.root))
    }
}

/// Builder for [`ImpliedVolSolver`].
///
/// # Examples
///
/// ```
/// use ivlattice::implied::{ImpliedVolSolver, SolverStrategy};
/// use ivlattice::pricing::PricingModel;
///
/// let solver = ImpliedVolSolver::builder()
///     .model(PricingModel::Crr { steps: 100, american: true })
///     .bracket(0.05, 2.0)
///     .tolerance(1e-6)
///     .build()?;
/// assert!(matches!(solver.strategy(), SolverStrategy::Itp { low, .. } if low == 0.05));
///
/// let legacy = ImpliedVolSolver::builder()
///     .model(PricingModel::BlackScholes)
///     .strategy(SolverStrategy::legacy())
///     .build()?;
/// # let _ = legacy;
/// # Ok::<(), ivlattice::ImpliedVolError>(())
/// ```
#[derive(Debug, Default)]
pub struct ImpliedVolBuilder {
    model: PricingModel,
    strategy: SolverStrategy,
    bracket: Option<(f64, f64)>,
    tolerance: Option<f64>,
}

impl ImpliedVolBuilder {
    /// Builder with the defaults: 10-step American CRR, ITP on `[0.01, 3.0]`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pricing model.
    pub fn model(mut self, model: PricingModel) -> Self {
        self.model = model;
        self
    }

    /// Set the root-finding strategy.
    pub fn strategy(mut self, strategy: SolverStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the ITP volatility bracket. Rejected at build time for the legacy
    /// strategy.
    pub fn bracket(mut self, low: f64, high: f64) -> Self {
        self.bracket = Some((low, high));
        self
    }

    /// Set the solver tolerance, overriding the strategy's own.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Validate the configuration and build the solver.
    ///
    /// # Errors
    /// Returns [`ImpliedVolError::InvalidInput`] for an out-of-range lattice
    /// step count, an invalid bracket or tolerance, or a bracket given with
    /// the legacy strategy.
    pub fn build(self) -> error::Result<ImpliedVolSolver> {
        let mut strategy = self.strategy;
        if let Some((low, high)) = self.bracket {
            strategy = match strategy {
                SolverStrategy::Itp { config, .. } => SolverStrategy::Itp { low, high, config },
                SolverStrategy::Legacy(_) => {
                    return Err(ImpliedVolError::InvalidInput {
                        message: "a volatility bracket requires the ITP strategy".into(),
                    });
                }
            };
        }
        if let Some(tolerance) = self.tolerance {
            strategy = strategy.with_tolerance(tolerance);
        }
        ImpliedVolSolver::new(self.model, strategy)
    }
}
