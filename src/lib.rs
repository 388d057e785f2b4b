//! # ivlattice
//!
//! Implied volatility from option prices, on a binomial lattice or in closed
//! form.
//!
//! Given contract terms and an observed price, the library finds the
//! volatility at which a pricing model reproduces that price: raw quote →
//! [`ContractSpec`] → [`Pricer`] wrapped as `g(σ) = price(σ) − observed` →
//! root finder → [`Vol`].
//!
//! ## Architecture
//!
//! - **`pricing`** — Cox-Ross-Rubinstein lattice (American or European, with
//!   a discrete cash-dividend adjustment) and Black-Scholes price and vega
//! - **`solver`** — ITP bracketing root finder and a bounded fixed-point
//!   (Newton-style) iteration
//! - **`implied`** — [`ImpliedVolSolver`] binding a model to a strategy, and
//!   a parallel batch driver
//!
//! ## Design
//!
//! - **Explicit failure.** Every fallible operation returns [`Result`]; a
//!   failed solve is an error, never a sentinel volatility. Library code
//!   never calls `unwrap()` or `expect()`.
//! - **Degeneracies absorbed locally.** `u ≈ d`, vanishing vega and
//!   out-of-range probabilities are floored or clamped, not raised.
//! - **Thread-safe.** [`Pricer`] requires `Send + Sync`; one solver serves
//!   all workers of a batch.
//! - **Serializable.** Contract specs, model and solver configuration derive
//!   Serde `Serialize` / `Deserialize`, validating on deserialization.
//!
//! ## Features
//!
//! - `logging` (default) — `tracing` events per solve, batch and iteration
//! - `parallel` (default) — rayon worker pool in [`implied::solve_batch`]

pub mod conventions;
pub mod error;
pub mod implied;
pub mod pricing;
pub mod solver;
pub mod types;
mod validate;

#[doc(inline)]
pub use error::{ImpliedVolError, Result};
#[doc(inline)]
pub use implied::{ImpliedVolSolver, SolverStrategy};
#[doc(inline)]
pub use pricing::{Pricer, PricingModel};
#[doc(inline)]
pub use types::{ContractSpec, Dividend, Expiry, OptionType, Vol};
