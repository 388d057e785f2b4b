//! Option pricers used as implied-volatility target functions.
//!
//! ## Models
//!
//! - [`CrrPricer`] — Cox-Ross-Rubinstein binomial lattice, American or European
//! - [`BlackScholesPricer`] — closed-form European price and vega
//!
//! Both implement [`Pricer`]. [`PricingModel`] is the serializable selector
//! used in configuration.

pub mod black_scholes;
pub mod crr;
pub mod lattice;

pub use black_scholes::{BlackScholesPricer, black_scholes_price, black_scholes_vega};
pub use crr::{CrrParams, CrrPricer};
pub use lattice::{Lattice, LatticeFactors};

use serde::{Deserialize, Serialize};

use crate::error;
use crate::types::ContractSpec;
use crate::validate::validate_positive;

/// Volatility bump for finite-difference vega.
pub const VEGA_BUMP: f64 = 1e-4;

/// A pricing model viewed as a function of volatility.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; a single pricer is shared across
/// the workers of a batch.
pub trait Pricer: Send + Sync {
    /// Option price at volatility `vol`.
    fn price(&self, spec: &ContractSpec, vol: f64) -> error::Result<f64>;

    /// Sensitivity of the price to volatility.
    ///
    /// Default implementation is a central difference with step
    /// [`VEGA_BUMP`], shrunk to `vol / 2` for very small volatilities so the
    /// lower bump stays positive.
    fn vega(&self, spec: &ContractSpec, vol: f64) -> error::Result<f64> {
        validate_positive(vol, "vol")?;
        let h = VEGA_BUMP.min(0.5 * vol);
        let up = self.price(spec, vol + h)?;
        let down = self.price(spec, vol - h)?;
        Ok((up - down) / (2.0 * h))
    }

    /// Short model name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Pricing model selector.
///
/// # Examples
///
/// ```
/// use ivlattice::pricing::PricingModel;
///
/// let lattice = PricingModel::Crr { steps: 10, american: true };
/// let closed_form = PricingModel::BlackScholes;
/// assert_eq!(PricingModel::default(), lattice);
/// # let _ = closed_form;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingModel {
    /// Binomial lattice with `steps` periods.
    Crr {
        steps: usize,
        /// Allow early exercise.
        american: bool,
    },
    /// Closed-form European pricer.
    BlackScholes,
}

impl Default for PricingModel {
    fn default() -> Self {
        PricingModel::Crr {
            steps: 10,
            american: true,
        }
    }
}

impl PricingModel {
    /// Build the concrete pricer.
    ///
    /// # Errors
    /// Returns [`ImpliedVolError::InvalidInput`](crate::ImpliedVolError::InvalidInput)
    /// for a lattice with zero steps or more than
    /// [`MAX_STEPS`](crate::pricing::crr::MAX_STEPS).
    pub fn pricer(&self) -> error::Result<Box<dyn Pricer>> {
        Ok(match *self {
            PricingModel::Crr {
                steps,
                american: true,
            } => Box::new(CrrPricer::new(steps)?),
            PricingModel::Crr {
                steps,
                american: false,
            } => Box::new(CrrPricer::european(steps)?),
            PricingModel::BlackScholes => Box::new(BlackScholesPricer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dividend, Expiry, OptionType};
    use approx::assert_abs_diff_eq;

    fn spec() -> ContractSpec {
        ContractSpec::new(
            10.0,
            12.0,
            Dividend::none(),
            0.05,
            Expiry::Years(2.0),
            OptionType::Call,
        )
        .unwrap()
    }

    #[test]
    fn default_vega_close_to_analytic() {
        struct Numeric;
        impl Pricer for Numeric {
            fn price(&self, spec: &ContractSpec, vol: f64) -> error::Result<f64> {
                BlackScholesPricer.price(spec, vol)
            }
            fn name(&self) -> &'static str {
                "numeric"
            }
        }
        let fd = Numeric.vega(&spec(), 0.4).unwrap();
        let analytic = BlackScholesPricer.vega(&spec(), 0.4).unwrap();
        assert_abs_diff_eq!(fd, analytic, epsilon = 1e-6);
    }

    #[test]
    fn crr_vega_positive() {
        let v = CrrPricer::new(50).unwrap().vega(&spec(), 0.3).unwrap();
        assert!(v > 0.0);
    }

    #[test]
    fn model_builds_named_pricers() {
        let crr = PricingModel::default().pricer().unwrap();
        assert_eq!(crr.name(), "CRR");
        let bs = PricingModel::BlackScholes.pricer().unwrap();
        assert_eq!(bs.name(), "Black-Scholes");
    }

    #[test]
    fn model_rejects_zero_steps() {
        let r = PricingModel::Crr {
            steps: 0,
            american: false,
        }
        .pricer();
        assert!(r.is_err());
    }

    #[test]
    fn model_rejects_oversized_lattice() {
        let model: PricingModel =
            serde_json::from_str(r#"{"Crr":{"steps":18446744073709551615,"american":true}}"#)
                .unwrap();
        assert!(matches!(
            model.pricer(),
            Err(crate::error::ImpliedVolError::InvalidInput { .. })
        ));
    }

    #[test]
    fn serde_round_trip() {
        for model in [
            PricingModel::default(),
            PricingModel::BlackScholes,
            PricingModel::Crr {
                steps: 200,
                american: false,
            },
        ] {
            let json = serde_json::to_string(&model).unwrap();
            let back: PricingModel = serde_json::from_str(&json).unwrap();
            assert_eq!(model, back);
        }
    }
}
