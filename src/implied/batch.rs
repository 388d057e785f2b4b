//! Batch implied-volatility solves.
//!
//! Every quote is an independent unit of work. With the `parallel` feature
//! the quotes are spread over a fixed-size rayon pool; without it they run
//! in order on the calling thread. A failed contract is recorded in its
//! [`ContractOutcome`] and counted, never aborting the rest of the batch.

use serde::{Deserialize, Serialize};

use crate::error::{self, ImpliedVolError};
use crate::implied::ImpliedVolSolver;
use crate::solver::SolverResult;
use crate::types::ContractSpec;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One contract to invert, tagged with a caller-chosen id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote<I> {
    pub id: I,
    pub spec: ContractSpec,
    pub observed_price: f64,
}

impl<I> Quote<I> {
    pub fn new(id: I, spec: ContractSpec, observed_price: f64) -> Self {
        Self {
            id,
            spec,
            observed_price,
        }
    }
}

/// Result of solving one [`Quote`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractOutcome<I> {
    pub id: I,
    pub result: Result<SolverResult, ImpliedVolError>,
}

impl<I> ContractOutcome<I> {
    /// Whether the solve produced a volatility.
    pub fn is_converged(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a batch, in submission order, with success and failure
/// counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport<I> {
    pub outcomes: Vec<ContractOutcome<I>>,
    pub converged: usize,
    pub failed: usize,
}

impl<I> BatchReport<I> {
    fn from_outcomes(outcomes: Vec<ContractOutcome<I>>) -> Self {
        let converged = outcomes.iter().filter(|o| o.is_converged()).count();
        let failed = outcomes.len() - converged;
        Self {
            outcomes,
            converged,
            failed,
        }
    }

    /// Number of contracts processed.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome for the contract with `id`, if it was in the batch.
    pub fn get(&self, id: &I) -> Option<&ContractOutcome<I>>
    where
        I: PartialEq,
    {
        self.outcomes.iter().find(|o| &o.id == id)
    }

    /// Failed contracts and their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&I, &ImpliedVolError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.id, e)))
    }
}

/// Worker-pool sizing for [`solve_batch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads; `None` uses rayon's default (one per core). Ignored
    /// without the `parallel` feature.
    pub workers: Option<usize>,
}

impl BatchConfig {
    /// Config with a fixed number of workers.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: Some(workers),
        }
    }

    /// Check the worker count.
    ///
    /// # Errors
    /// Returns [`ImpliedVolError::InvalidInput`] for zero workers.
    pub fn validate(&self) -> error::Result<()> {
        if self.workers == Some(0) {
            return Err(ImpliedVolError::InvalidInput {
                message: "batch needs at least one worker".into(),
            });
        }
        Ok(())
    }
}

/// Solve every quote with `solver`.
///
/// Outcomes come back in the order of `quotes`, each carrying its quote's id.
///
/// # Examples
///
/// ```
/// use ivlattice::implied::{BatchConfig, ImpliedVolSolver, Quote, solve_batch};
/// use ivlattice::{ContractSpec, Dividend, Expiry, OptionType};
///
/// let spec = ContractSpec::new(10.0, 12.0, Dividend::none(), 0.05, Expiry::Years(2.0), OptionType::Call)?;
/// let quotes = vec![
///     Quote::new("good", spec, 1.9174),
///     Quote::new("too rich", spec, 50.0),
/// ];
///
/// let solver = ImpliedVolSolver::builder().build()?;
/// let report = solve_batch(&solver, &quotes, &BatchConfig::default())?;
/// assert_eq!((report.converged, report.failed), (1, 1));
/// assert!(report.get(&"good").is_some_and(|o| o.is_converged()));
/// # Ok::<(), ivlattice::ImpliedVolError>(())
/// ```
///
/// # Errors
/// Returns [`ImpliedVolError::InvalidInput`] if `config` is invalid or the
/// worker pool cannot be started. Per-contract failures are reported in the
/// [`BatchReport`], not here.
pub fn solve_batch<I>(
    solver: &ImpliedVolSolver,
    quotes: &[Quote<I>],
    config: &BatchConfig,
) -> error::Result<BatchReport<I>>
where
    I: Clone + Send + Sync,
{
    config.validate()?;

    #[cfg(feature = "logging")]
    tracing::debug!(
        n_quotes = quotes.len(),
        workers = ?config.workers,
        "batch solve start"
    );

    let solve_one = |quote: &Quote<I>| ContractOutcome {
        id: quote.id.clone(),
        result: solver.solve(&quote.spec, quote.observed_price),
    };

    #[cfg(feature = "parallel")]
    let outcomes: Vec<ContractOutcome<I>> = {
        let mut pool = rayon::ThreadPoolBuilder::new();
        if let Some(workers) = config.workers {
            pool = pool.num_threads(workers);
        }
        let pool = pool.build().map_err(|e| ImpliedVolError::InvalidInput {
            message: format!("cannot start batch worker pool: {e}"),
        })?;
        pool.install(|| quotes.par_iter().map(solve_one).collect())
    };
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<ContractOutcome<I>> = quotes.iter().map(solve_one).collect();

    let report = BatchReport::from_outcomes(outcomes);

    #[cfg(feature = "logging")]
    tracing::debug!(
        converged = report.converged,
        failed = report.failed,
        "batch solve complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingModel;
    use crate::types::{Dividend, Expiry, OptionType};
    use approx::assert_abs_diff_eq;

    fn spec(strike: f64) -> ContractSpec {
        ContractSpec::new(
            10.0,
            strike,
            Dividend::none(),
            0.05,
            Expiry::Years(2.0),
            OptionType::Call,
        )
        .unwrap()
    }

    fn solver() -> ImpliedVolSolver {
        ImpliedVolSolver::builder()
            .model(PricingModel::BlackScholes)
            .tolerance(1e-8)
            .build()
            .unwrap()
    }

    #[test]
    fn outcomes_keep_ids_and_order() {
        let bs = PricingModel::BlackScholes.pricer().unwrap();
        let quotes: Vec<Quote<usize>> = (0..20)
            .map(|i| {
                let s = spec(8.0 + 0.25 * i as f64);
                let vol = 0.2 + 0.01 * i as f64;
                Quote::new(i, s, bs.price(&s, vol).unwrap())
            })
            .collect();

        let report = solve_batch(&solver(), &quotes, &BatchConfig::with_workers(4)).unwrap();
        assert_eq!(report.len(), 20);
        assert_eq!((report.converged, report.failed), (20, 0));
        for (i, outcome) in report.outcomes.iter().enumerate() {
            assert_eq!(outcome.id, i);
            let root = outcome.result.as_ref().unwrap().root;
            assert_abs_diff_eq!(root, 0.2 + 0.01 * i as f64, epsilon = 1e-6);
        }
    }

    #[test]
    fn bad_apples_are_tallied_not_fatal() {
        let quotes = vec![
            Quote::new("ok", spec(12.0), 1.9174),
            Quote::new("above spot", spec(12.0), 20.0),
            Quote::new("zero price", spec(12.0), 0.0),
            Quote::new("ok too", spec(11.0), 2.2),
        ];
        let report = solve_batch(&solver(), &quotes, &BatchConfig::default()).unwrap();
        assert_eq!(report.converged, 2);
        assert_eq!(report.failed, 2);
        assert!(matches!(
            report.get(&"above spot").map(|o| &o.result),
            Some(Err(ImpliedVolError::InvalidBracket { .. }))
        ));
        assert!(matches!(
            report.get(&"zero price").map(|o| &o.result),
            Some(Err(ImpliedVolError::InvalidInput { .. }))
        ));
        let failed: Vec<&str> = report.failures().map(|(id, _)| *id).collect();
        assert_eq!(failed, vec!["above spot", "zero price"]);
    }

    #[test]
    fn empty_batch() {
        let report = solve_batch::<u32>(&solver(), &[], &BatchConfig::default()).unwrap();
        assert!(report.is_empty());
        assert_eq!((report.converged, report.failed), (0, 0));
    }

    #[test]
    fn zero_workers_rejected() {
        let r = solve_batch::<u32>(&solver(), &[], &BatchConfig::with_workers(0));
        assert!(matches!(r, Err(ImpliedVolError::InvalidInput { .. })));
    }

    #[test]
    fn report_serializes() {
        let quotes = vec![Quote::new(7u32, spec(12.0), 1.9174)];
        let report = solve_batch(&solver(), &quotes, &BatchConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["converged"], 1);
        assert_eq!(json["outcomes"][0]["id"], 7);
        assert!(json["outcomes"][0]["result"]["Ok"]["root"].is_number());
    }

    #[test]
    fn quote_deserializes() {
        let quote = Quote::new("AAPL-C12".to_string(), spec(12.0), 1.9174);
        let json = serde_json::to_string(&quote).unwrap();
        let back: Quote<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, quote);
    }
}
