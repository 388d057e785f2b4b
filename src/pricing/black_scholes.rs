//! Black-Scholes closed-form price and vega for European exercise.
//!
//! ```text
//! d₁ = [ln(S/K) + (r − q + σ²/2)·T] / (σ√T),   d₂ = d₁ − σ√T
//! C  = S·e^(−qT)·N(d₁) − K·e^(−rT)·N(d₂)
//! P  = K·e^(−rT)·N(−d₂) − S·e^(−qT)·N(−d₁)
//! ν  = S·e^(−qT)·φ(d₁)·√T
//! ```
//!
//! The formulas are undefined at `σ = 0` or `T = 0`; [`BlackScholesPricer`]
//! rejects a non-positive volatility so such points never enter a bracket.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use statrs::function::erf::erf;

use crate::conventions;
use crate::error;
use crate::pricing::Pricer;
use crate::types::{ContractSpec, Dividend, OptionType};
use crate::validate::validate_positive;

/// Standard normal cumulative distribution, `N(x) = (1 + erf(x/√2)) / 2`.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x * FRAC_1_SQRT_2))
}

/// Standard normal density `φ(x)`.
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

fn d1(spot: f64, strike: f64, vol: f64, rate: f64, dividend_yield: f64, expiry: f64) -> f64 {
    ((spot / strike).ln() + (rate - dividend_yield + 0.5 * vol * vol) * expiry)
        / (vol * expiry.sqrt())
}

/// Black-Scholes price of a European option.
///
/// `rate` and `dividend_yield` are continuously compounded; `expiry` is in
/// years.
///
/// # Examples
/// ```
/// use ivlattice::pricing::black_scholes::black_scholes_price;
/// use ivlattice::OptionType;
///
/// let call = black_scholes_price(10.0, 12.0, 0.4, 0.05, 0.0, 2.0, OptionType::Call);
/// assert!((call - 1.9174).abs() < 1e-4);
/// ```
pub fn black_scholes_price(
    spot: f64,
    strike: f64,
    vol: f64,
    rate: f64,
    dividend_yield: f64,
    expiry: f64,
    option_type: OptionType,
) -> f64 {
    let d1 = d1(spot, strike, vol, rate, dividend_yield, expiry);
    let d2 = d1 - vol * expiry.sqrt();
    let fwd_spot = spot * (-dividend_yield * expiry).exp();
    let pv_strike = strike * (-rate * expiry).exp();
    match option_type {
        OptionType::Call => fwd_spot * norm_cdf(d1) - pv_strike * norm_cdf(d2),
        OptionType::Put => pv_strike * norm_cdf(-d2) - fwd_spot * norm_cdf(-d1),
    }
}

/// Black-Scholes vega `∂V/∂σ`, identical for calls and puts.
pub fn black_scholes_vega(
    spot: f64,
    strike: f64,
    vol: f64,
    rate: f64,
    dividend_yield: f64,
    expiry: f64,
) -> f64 {
    let d1 = d1(spot, strike, vol, rate, dividend_yield, expiry);
    spot * (-dividend_yield * expiry).exp() * norm_pdf(d1) * expiry.sqrt()
}

/// Closed-form European pricer.
///
/// A cash dividend is converted to the annual yield
/// `(1 + D/S)⁴ − 1` of four quarterly payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlackScholesPricer;

impl BlackScholesPricer {
    fn dividend_yield(spec: &ContractSpec) -> f64 {
        match spec.dividend() {
            Dividend::Yield(q) => q,
            Dividend::Cash(amount) => conventions::cash_dividend_yield(amount, spec.spot()),
        }
    }
}

impl Pricer for BlackScholesPricer {
    fn price(&self, spec: &ContractSpec, vol: f64) -> error::Result<f64> {
        validate_positive(vol, "vol")?;
        Ok(black_scholes_price(
            spec.spot(),
            spec.strike(),
            vol,
            spec.rate(),
            Self::dividend_yield(spec),
            spec.years(),
            spec.option_type(),
        ))
    }

    fn vega(&self, spec: &ContractSpec, vol: f64) -> error::Result<f64> {
        validate_positive(vol, "vol")?;
        Ok(black_scholes_vega(
            spec.spot(),
            spec.strike(),
            vol,
            spec.rate(),
            Self::dividend_yield(spec),
            spec.years(),
        ))
    }

    fn name(&self) -> &'static str {
        "Black-Scholes"
    }
}
