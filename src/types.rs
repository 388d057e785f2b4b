//! Core domain types: option right, volatility, dividends, expiry and the
//! contract specification consumed by every pricer.
//!
//! # Newtype Strategy
//!
//! **Outputs use newtypes.** [`Vol`] wraps the solved volatility so it can't
//! be confused with a price or a rate.
//!
//! **Inputs use bare `f64`.** Contract fields are validated once, in
//! [`ContractSpec::new`], and are plain floats after that.

use serde::{Deserialize, Serialize};

use crate::conventions;
use crate::error::{self, ImpliedVolError};
use crate::validate::{validate_finite, validate_non_negative, validate_positive};

/// Implied volatility `σ`, measured as annualized standard deviation.
///
/// # Examples
/// ```
/// use ivlattice::types::Vol;
/// let vol = Vol(0.40);
/// assert_eq!(vol.0, 0.40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

/// Option type: call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Right to buy at strike price.
    Call,
    /// Right to sell at strike price.
    Put,
}

impl OptionType {
    /// Exercise value of the option against an underlying price.
    ///
    /// May be negative; callers floor at zero where the payoff requires it.
    pub fn exercise_value(self, underlying: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => underlying - strike,
            OptionType::Put => strike - underlying,
        }
    }
}

/// Dividend paid by the underlying.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Dividend {
    /// Cash amount per share, paid once per quarterly dividend period.
    Cash(f64),
    /// Continuous annual dividend yield.
    Yield(f64),
}

impl Dividend {
    /// No dividend.
    pub fn none() -> Self {
        Dividend::Cash(0.0)
    }

    /// Whether this dividend has no effect on prices.
    pub fn is_zero(&self) -> bool {
        match *self {
            Dividend::Cash(amount) => amount == 0.0,
            Dividend::Yield(q) => q == 0.0,
        }
    }

    fn validate(&self) -> error::Result<()> {
        match *self {
            Dividend::Cash(amount) => validate_non_negative(amount, "cash dividend")?,
            Dividend::Yield(q) => validate_finite(q, "dividend yield")?,
        };
        Ok(())
    }
}

impl Default for Dividend {
    fn default() -> Self {
        Self::none()
    }
}

/// Time to expiry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Expiry {
    /// Annualized time to expiry.
    Years(f64),
    /// Trading days to expiry (252 per year).
    TradingDays(f64),
}

impl Expiry {
    /// Time to expiry in years.
    pub fn years(&self) -> f64 {
        match *self {
            Expiry::Years(t) => t,
            Expiry::TradingDays(days) => conventions::days_to_years(days),
        }
    }

    /// Time to expiry in trading days.
    pub fn trading_days(&self) -> f64 {
        match *self {
            Expiry::Years(t) => conventions::years_to_days(t),
            Expiry::TradingDays(days) => days,
        }
    }
}

/// Terms of a single option contract, already resolved to numbers.
///
/// The rate is a decimal (0.05 = 5%). The lattice pricer compounds it once
/// per period; Black-Scholes treats it as continuously compounded.
///
/// # Examples
/// ```
/// use ivlattice::types::{ContractSpec, Dividend, Expiry, OptionType};
///
/// let spec = ContractSpec::new(
///     10.0,
///     12.0,
///     Dividend::none(),
///     0.05,
///     Expiry::TradingDays(504.0),
///     OptionType::Call,
/// )?;
/// assert_eq!(spec.years(), 2.0);
/// # Ok::<(), ivlattice::ImpliedVolError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContractSpecRaw", into = "ContractSpecRaw")]
pub struct ContractSpec {
    spot: f64,
    strike: f64,
    dividend: Dividend,
    rate: f64,
    expiry: Expiry,
    option_type: OptionType,
}

#[derive(Serialize, Deserialize)]
struct ContractSpecRaw {
    spot: f64,
    strike: f64,
    #[serde(default)]
    dividend: Dividend,
    rate: f64,
    expiry: Expiry,
    option_type: OptionType,
}

impl TryFrom<ContractSpecRaw> for ContractSpec {
    type Error = ImpliedVolError;
    fn try_from(raw: ContractSpecRaw) -> Result<Self, Self::Error> {
        Self::new(
            raw.spot,
            raw.strike,
            raw.dividend,
            raw.rate,
            raw.expiry,
            raw.option_type,
        )
    }
}

impl From<ContractSpec> for ContractSpecRaw {
    fn from(s: ContractSpec) -> Self {
        Self {
            spot: s.spot,
            strike: s.strike,
            dividend: s.dividend,
            rate: s.rate,
            expiry: s.expiry,
            option_type: s.option_type,
        }
    }
}

impl ContractSpec {
    /// Create a validated contract specification.
    ///
    /// # Errors
    /// Returns [`ImpliedVolError::InvalidInput`] if spot, strike or expiry is
    /// not positive and finite, the rate is not finite, a cash dividend is
    /// negative, or any field is NaN (e.g., a failed upstream lookup).
    pub fn new(
        spot: f64,
        strike: f64,
        dividend: Dividend,
        rate: f64,
        expiry: Expiry,
        option_type: OptionType,
    ) -> error::Result<Self> {
        validate_positive(spot, "spot")?;
        validate_positive(strike, "strike")?;
        validate_finite(rate, "rate")?;
        if rate <= -1.0 {
            return Err(ImpliedVolError::InvalidInput {
                message: format!("rate must be greater than -1, got {rate}"),
            });
        }
        dividend.validate()?;
        validate_positive(expiry.years(), "expiry")?;

        Ok(Self {
            spot,
            strike,
            dividend,
            rate,
            expiry,
            option_type,
        })
    }

    /// Spot price of the underlying.
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Strike price.
    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn dividend(&self) -> Dividend {
        self.dividend
    }

    /// Risk-free rate as a decimal.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn expiry(&self) -> Expiry {
        self.expiry
    }

    /// Time to expiry in years.
    pub fn years(&self) -> f64 {
        self.expiry.years()
    }

    /// Time to expiry in trading days.
    pub fn trading_days(&self) -> f64 {
        self.expiry.trading_days()
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Same contract with the other option right.
    pub fn with_option_type(mut self, option_type: OptionType) -> Self {
        self.option_type = option_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContractSpec {
        ContractSpec::new(
            10.0,
            12.0,
            Dividend::none(),
            0.05,
            Expiry::TradingDays(504.0),
            OptionType::Call,
        )
        .unwrap()
    }

    // --- Construction ---

    #[test]
    fn new_valid_spec() {
        let s = sample();
        assert_eq!(s.spot(), 10.0);
        assert_eq!(s.strike(), 12.0);
        assert_eq!(s.rate(), 0.05);
        assert_eq!(s.years(), 2.0);
        assert_eq!(s.trading_days(), 504.0);
        assert_eq!(s.option_type(), OptionType::Call);
        assert!(s.dividend().is_zero());
    }

    #[test]
    fn negative_rate_is_allowed() {
        let s = ContractSpec::new(
            100.0,
            100.0,
            Dividend::none(),
            -0.005,
            Expiry::Years(1.0),
            OptionType::Put,
        );
        assert!(s.is_ok());
    }

    #[test]
    fn rejects_missing_rate_lookup() {
        let r = ContractSpec::new(
            10.0,
            12.0,
            Dividend::none(),
            f64::NAN,
            Expiry::Years(2.0),
            OptionType::Call,
        );
        assert!(matches!(r, Err(ImpliedVolError::InvalidInput { .. })));
    }

    #[test]
    fn rejects_missing_dividend_lookup() {
        let r = ContractSpec::new(
            10.0,
            12.0,
            Dividend::Cash(f64::NAN),
            0.05,
            Expiry::Years(2.0),
            OptionType::Call,
        );
        assert!(matches!(r, Err(ImpliedVolError::InvalidInput { .. })));
    }

    #[test]
    fn rejects_negative_cash_dividend() {
        let r = ContractSpec::new(
            10.0,
            12.0,
            Dividend::Cash(-0.1),
            0.05,
            Expiry::Years(2.0),
            OptionType::Call,
        );
        assert!(r.is_err());
    }

    #[test]
    fn rejects_zero_expiry_and_bad_prices() {
        for (spot, strike, expiry) in [
            (10.0, 12.0, Expiry::TradingDays(0.0)),
            (0.0, 12.0, Expiry::Years(1.0)),
            (10.0, -1.0, Expiry::Years(1.0)),
            (f64::INFINITY, 12.0, Expiry::Years(1.0)),
        ] {
            let r = ContractSpec::new(
                spot,
                strike,
                Dividend::none(),
                0.05,
                expiry,
                OptionType::Call,
            );
            assert!(r.is_err(), "expected rejection for {spot} {strike} {expiry:?}");
        }
    }

    #[test]
    fn rejects_rate_at_minus_one() {
        let r = ContractSpec::new(
            10.0,
            12.0,
            Dividend::none(),
            -1.0,
            Expiry::Years(1.0),
            OptionType::Call,
        );
        assert!(r.is_err());
    }

    // --- Helpers ---

    #[test]
    fn exercise_value_is_signed() {
        assert_eq!(OptionType::Call.exercise_value(12.0, 10.0), 2.0);
        assert_eq!(OptionType::Put.exercise_value(12.0, 10.0), -2.0);
    }

    #[test]
    fn expiry_conversions_agree() {
        assert_eq!(Expiry::Years(0.5).trading_days(), 126.0);
        assert_eq!(Expiry::TradingDays(126.0).years(), 0.5);
    }

    #[test]
    fn with_option_type_flips_right() {
        let put = sample().with_option_type(OptionType::Put);
        assert_eq!(put.option_type(), OptionType::Put);
        assert_eq!(put.strike(), 12.0);
    }

    // --- Serde ---

    #[test]
    fn serde_round_trip() {
        let s = sample();
        let json = serde_json::to_string(&s).unwrap();
        let s2: ContractSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(s, s2);
    }

    #[test]
    fn serde_missing_dividend_defaults_to_none() {
        let json = r#"{"spot":10.0,"strike":12.0,"rate":0.05,"expiry":{"Years":2.0},"option_type":"Call"}"#;
        let s: ContractSpec = serde_json::from_str(json).unwrap();
        assert!(s.dividend().is_zero());
    }

    #[test]
    fn serde_rejects_invalid_spec() {
        let json = r#"{"spot":-10.0,"strike":12.0,"rate":0.05,"expiry":{"Years":2.0},"option_type":"Call"}"#;
        let r: Result<ContractSpec, _> = serde_json::from_str(json);
        assert!(r.is_err());
    }
}
