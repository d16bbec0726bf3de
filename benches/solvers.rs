use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use ivsolve::chain::calibrate_chain;
use ivsolve::market::{ChainQuote, RateCurve};
use ivsolve::pricing::evaluate;
use ivsolve::solver::{BisectionSolver, CalibratedSolver, ImpliedVolSolver, NewtonSolver};
use ivsolve::{MarketParameters, MarketQuote, call_price};

/// Generate a synthetic chain of quotes priced off a smile centred at the money.
fn generate_chain(
    spot: f64,
    rates: &RateCurve,
    n_expiries: usize,
    n_strikes: usize,
) -> Vec<ChainQuote> {
    (1..=n_expiries)
        .flat_map(|i| {
            let t = i as f64 * 0.25;
            let rate = rates.rate_for(t);
            (0..n_strikes).map(move |j| {
                let k = spot * (0.8 + 0.4 * j as f64 / (n_strikes - 1) as f64);
                let vol = 0.2 + 0.3 * (spot / k).ln().powi(2);
                let params = MarketParameters::new(spot, k, rate, vol, t, 0.0)
                    .expect("benchmark params should be valid");
                let price = call_price(&params).expect("benchmark price should succeed").0;
                ChainQuote::new(k, t, price, spot)
            })
        })
        .collect()
}

fn pricing_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pricing");

    let params = MarketParameters::new(100.0, 105.0, 0.05, 0.25, 1.0, 0.0)
        .expect("benchmark params should be valid");
    group.bench_function("call_price", |b| {
        b.iter(|| call_price(black_box(&params)).unwrap());
    });
    group.bench_function("evaluate", |b| {
        b.iter(|| evaluate(black_box(&params)).unwrap());
    });

    group.finish();
}

fn solver_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("solvers");

    // Near-the-money quote, 25% vol, 6 months
    let params = MarketParameters::new(100.0, 105.0, 0.03, 0.25, 0.5, 0.0)
        .expect("benchmark params should be valid");
    let price = call_price(&params).expect("benchmark price should succeed").0;
    let quote = MarketQuote::new(100.0, 105.0, 0.03, 0.5, price);

    let bisection = BisectionSolver::default();
    group.bench_function("bisection", |b| {
        b.iter(|| bisection.solve(black_box(&quote)).unwrap());
    });

    let newton = NewtonSolver::default();
    group.bench_function("newton", |b| {
        b.iter(|| newton.solve(black_box(&quote)).unwrap());
    });

    let calibrated = CalibratedSolver::new(0.2);
    group.bench_function("calibrated", |b| {
        b.iter(|| calibrated.estimate(black_box(&quote)));
    });

    group.finish();
}

fn chain_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");

    let rates = RateCurve::new(0.045, 0.04).expect("benchmark rates should be valid");
    // 8 expiries x 25 strikes
    let quotes = generate_chain(100.0, &rates, 8, 25);
    group.bench_function("calibrate_chain_200", |b| {
        b.iter(|| calibrate_chain(black_box(&quotes), black_box(&rates), black_box(0.25), 100));
    });

    group.finish();
}

criterion_group!(benches, pricing_benchmarks, solver_benchmarks, chain_benchmarks);
criterion_main!(benches);
