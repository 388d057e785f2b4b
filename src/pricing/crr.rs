//! Cox-Ross-Rubinstein binomial pricer with early exercise.
//!
//! Per period of length `dt = T/n`:
//!
//! ```text
//! u = exp(σ·√dt),  d = 1/u
//! r̂ = (1 + r)^dt                    one-period compounded rate
//! p = (r̂·e^(−q·dt) − d) / (u − d)    risk-neutral up probability
//! ```
//!
//! Backward induction starts from the payoff at expiry and, at each earlier
//! level, takes the larger of immediate exercise and the discounted
//! risk-neutral expectation of the two children. Levels are evaluated
//! bottom-up in one working vector, so a price costs O(n²) time and O(n)
//! working memory.
//!
//! # Cash dividends
//! A cash dividend `D` per quarter enters through the exercise value only:
//! the node price `S` is replaced by `S·(1 − D/S)^m`, where `m` counts the
//! whole dividend periods (62.5 trading days) between the node and expiry.
//! This is an approximation, not a discrete-dividend tree. It leaves terminal
//! payoffs untouched and reduces to the identity when `D = 0`.
//!
//! # References
//! - Cox, J., Ross, S. & Rubinstein, M. "Option Pricing: A Simplified Approach" (1979)

use serde::{Deserialize, Serialize};

use crate::conventions;
use crate::error;
use crate::pricing::Pricer;
use crate::pricing::lattice::{Lattice, LatticeFactors};
use crate::types::{ContractSpec, Dividend};
use crate::validate::{validate_positive, validate_steps};

/// Largest accepted step count. A lattice holds `(n + 1)(n + 2) / 2` nodes
/// and is rebuilt on every price call.
pub const MAX_STEPS: usize = 10_000;

/// Per-period parameters of a CRR lattice, derived for one pricing call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrrParams {
    /// Period length in years.
    pub dt: f64,
    pub factors: LatticeFactors,
    /// One-period growth factor `r̂` used for discounting.
    pub discount: f64,
    /// Risk-neutral up probability, clamped to `[0, 1]`.
    pub p: f64,
}

impl CrrParams {
    /// Derive lattice parameters for `steps` periods at volatility `vol`.
    pub fn new(vol: f64, steps: usize, spec: &ContractSpec) -> Self {
        let dt = spec.years() / steps as f64;
        let factors = LatticeFactors::crr(vol, dt);
        let discount = conventions::period_growth(spec.rate(), dt);
        let growth = match spec.dividend() {
            Dividend::Yield(q) => discount * (-q * dt).exp(),
            Dividend::Cash(_) => discount,
        };
        let p = ((growth - factors.down()) / factors.spread()).clamp(0.0, 1.0);
        Self {
            dt,
            factors,
            discount,
            p,
        }
    }
}

/// Binomial lattice pricer.
///
/// # Examples
/// ```
/// use ivlattice::pricing::{CrrPricer, Pricer};
/// use ivlattice::types::{ContractSpec, Dividend, Expiry, OptionType};
///
/// let spec = ContractSpec::new(
///     10.0, 12.0, Dividend::none(), 0.05, Expiry::TradingDays(504.0), OptionType::Call,
/// )?;
/// let price = CrrPricer::new(10)?.price(&spec, 0.4)?;
/// assert!(price > 1.9 && price < 2.0);
/// # Ok::<(), ivlattice::ImpliedVolError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CrrPricerRaw", into = "CrrPricerRaw")]
pub struct CrrPricer {
    steps: usize,
    american: bool,
}

#[derive(Serialize, Deserialize)]
struct CrrPricerRaw {
    steps: usize,
    american: bool,
}

impl TryFrom<CrrPricerRaw> for CrrPricer {
    type Error = crate::error::ImpliedVolError;
    fn try_from(raw: CrrPricerRaw) -> Result<Self, Self::Error> {
        if raw.american {
            Self::new(raw.steps)
        } else {
            Self::european(raw.steps)
        }
    }
}

impl From<CrrPricer> for CrrPricerRaw {
    fn from(p: CrrPricer) -> Self {
        Self {
            steps: p.steps,
            american: p.american,
        }
    }
}

impl CrrPricer {
    /// American-style pricer with `steps` periods.
    ///
    /// # Errors
    /// Returns [`ImpliedVolError::InvalidInput`](crate::ImpliedVolError::InvalidInput)
    /// if `steps` is zero or exceeds [`MAX_STEPS`].
    pub fn new(steps: usize) -> error::Result<Self> {
        validate_steps(steps)?;
        Ok(Self {
            steps,
            american: true,
        })
    }

    /// European-style pricer (no early exercise) with `steps` periods.
    ///
    /// # Errors
    /// Returns [`ImpliedVolError::InvalidInput`](crate::ImpliedVolError::InvalidInput)
    /// if `steps` is zero or exceeds [`MAX_STEPS`].
    pub fn european(steps: usize) -> error::Result<Self> {
        validate_steps(steps)?;
        Ok(Self {
            steps,
            american: false,
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Whether early exercise is allowed.
    pub fn is_american(&self) -> bool {
        self.american
    }
}

impl Pricer for CrrPricer {
    fn price(&self, spec: &ContractSpec, vol: f64) -> error::Result<f64> {
        validate_positive(vol, "vol")?;
        let params = CrrParams::new(vol, self.steps, spec);
        let lattice = Lattice::build(spec.spot(), params.factors, self.steps);
        Ok(backward_induction(&lattice, spec, &params, self.american))
    }

    fn name(&self) -> &'static str {
        "CRR"
    }
}

/// Value the option at the root of `lattice`.
///
/// `values[j]` holds the option value at node `(level + 1, j)` when level
/// `level` is processed; node `(level, j)` has children `j` (down) and
/// `j + 1` (up), so walking `j` upwards overwrites each slot after its last
/// read.
pub fn backward_induction(
    lattice: &Lattice,
    spec: &ContractSpec,
    params: &CrrParams,
    american: bool,
) -> f64 {
    let n = lattice.steps();
    let strike = spec.strike();
    let option_type = spec.option_type();
    let cash = match spec.dividend() {
        Dividend::Cash(amount) if amount > 0.0 => Some(amount),
        _ => None,
    };
    let total_days = spec.trading_days();
    let exercise = |s: f64, level: usize| -> f64 {
        let underlying = match cash {
            Some(amount) => {
                let remaining = total_days * (n - level) as f64 / n.max(1) as f64;
                dividend_adjusted(s, amount, conventions::dividend_periods(remaining))
            }
            None => s,
        };
        option_type.exercise_value(underlying, strike)
    };

    let mut values: Vec<f64> = match lattice.level(n) {
        Some(terminal) => terminal.iter().map(|&s| exercise(s, n).max(0.0)).collect(),
        None => return 0.0,
    };

    let p = params.p;
    let one_minus_p = 1.0 - p;
    let disc = params.discount;
    for level in (0..n).rev() {
        let Some(nodes) = lattice.level(level) else {
            continue;
        };
        for (j, &s) in nodes.iter().enumerate() {
            let continuation = (p * values[j + 1] + one_minus_p * values[j]) / disc;
            values[j] = if american {
                continuation.max(exercise(s, level))
            } else {
                continuation
            };
        }
    }

    values[0]
}

/// Node price net of the cash dividends left before expiry:
/// `S · max(0, 1 − D/S)^periods`.
pub fn dividend_adjusted(spot: f64, amount: f64, periods: i32) -> f64 {
    if periods == 0 || amount == 0.0 {
        return spot;
    }
    spot * (1.0 - amount / spot).max(0.0).powi(periods)
}
