//! Extract implied volatility from option prices.
//!
//! Shows how to:
//!   - Price a contract on the CRR lattice and in closed form
//!   - Invert an observed price with ITP and with the legacy iteration
//!   - Run a batch with a few bad quotes mixed in
//!
//! Run with: `cargo run --example implied_vol`

use ivlattice::implied::{BatchConfig, Quote, solve_batch};
use ivlattice::{
    ContractSpec, Dividend, Expiry, ImpliedVolSolver, OptionType, PricingModel, SolverStrategy,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 2 years to expiry, no dividend, 5% rate
    let spec = ContractSpec::new(
        10.0,
        12.0,
        Dividend::none(),
        0.05,
        Expiry::TradingDays(504.0),
        OptionType::Call,
    )?;
    let observed = 1.9174;

    // ---------------------------------------------------------------
    // 1. Price at a known volatility
    // ---------------------------------------------------------------

    let crr = PricingModel::default().pricer()?;
    let bs = PricingModel::BlackScholes.pricer()?;
    println!("Pricing at 40% vol");
    println!("  {:<14} {:.6}", crr.name(), crr.price(&spec, 0.40)?);
    println!("  {:<14} {:.6}", bs.name(), bs.price(&spec, 0.40)?);

    // ---------------------------------------------------------------
    // 2. Invert the observed price
    // ---------------------------------------------------------------

    println!("\nImplied vol from price {observed}");
    let itp = ImpliedVolSolver::builder().tolerance(1e-6).build()?;
    let r = itp.solve(&spec, observed)?;
    println!(
        "  CRR(10) + ITP:          {:.6} ({} iterations)",
        r.root, r.iterations
    );

    let legacy = ImpliedVolSolver::builder()
        .model(PricingModel::BlackScholes)
        .strategy(SolverStrategy::legacy())
        .build()?;
    let r = legacy.solve(&spec, observed)?;
    println!(
        "  Black-Scholes + legacy: {:.6} ({} iterations)",
        r.root, r.iterations
    );

    // ---------------------------------------------------------------
    // 3. Batch with bad apples
    // ---------------------------------------------------------------

    let quotes = vec![
        Quote::new("C12", spec, observed),
        Quote::new("P12", spec.with_option_type(OptionType::Put), 2.95),
        Quote::new("C12 above spot", spec, 15.0),
        Quote::new("C12 zero", spec, 0.0),
    ];
    let report = solve_batch(&itp, &quotes, &BatchConfig::default())?;

    println!(
        "\nBatch: {} converged, {} failed",
        report.converged, report.failed
    );
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(r) => println!("  {:<16} vol {:.6}", outcome.id, r.root),
            Err(e) => println!("  {:<16} {e}", outcome.id),
        }
    }

    Ok(())
}
