use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use ivlattice::implied::{BatchConfig, Quote, solve_batch};
use ivlattice::{
    ContractSpec, Dividend, Expiry, ImpliedVolSolver, OptionType, PricingModel, SolverStrategy,
};

fn spec(strike: f64) -> ContractSpec {
    ContractSpec::new(
        10.0,
        strike,
        Dividend::none(),
        0.05,
        Expiry::Years(2.0),
        OptionType::Call,
    )
    .expect("benchmark contract should be valid")
}

fn single_solve_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("implied_vol");
    let contract = spec(12.0);

    let crr_itp = ImpliedVolSolver::builder()
        .build()
        .expect("default solver should build");
    group.bench_function("crr10_itp", |b| {
        b.iter(|| crr_itp.solve(black_box(&contract), black_box(1.9174)))
    });

    let crr_fine = ImpliedVolSolver::builder()
        .model(PricingModel::Crr {
            steps: 200,
            american: true,
        })
        .tolerance(1e-6)
        .build()
        .expect("200-step solver should build");
    group.bench_function("crr200_itp", |b| {
        b.iter(|| crr_fine.solve(black_box(&contract), black_box(1.9174)))
    });

    let bs_itp = ImpliedVolSolver::builder()
        .model(PricingModel::BlackScholes)
        .tolerance(1e-8)
        .build()
        .expect("Black-Scholes solver should build");
    group.bench_function("black_scholes_itp", |b| {
        b.iter(|| bs_itp.solve(black_box(&contract), black_box(1.9174)))
    });

    let bs_legacy = ImpliedVolSolver::builder()
        .model(PricingModel::BlackScholes)
        .strategy(SolverStrategy::legacy())
        .build()
        .expect("legacy solver should build");
    group.bench_function("black_scholes_legacy", |b| {
        b.iter(|| bs_legacy.solve(black_box(&contract), black_box(1.9174)))
    });

    group.finish();
}

fn batch_benchmarks(c: &mut Criterion) {
    let solver = ImpliedVolSolver::builder()
        .model(PricingModel::Crr {
            steps: 50,
            american: true,
        })
        .build()
        .expect("batch solver should build");
    let quotes: Vec<Quote<usize>> = (0..256)
        .map(|i| Quote::new(i, spec(8.0 + 0.02 * i as f64), 2.0))
        .collect();

    c.bench_function("batch_256_crr50", |b| {
        b.iter(|| solve_batch(&solver, black_box(&quotes), &BatchConfig::default()))
    });
}

criterion_group!(benches, single_solve_benchmarks, batch_benchmarks);
criterion_main!(benches);
