//! Extract implied volatility from a call premium.
//!
//! Shows how to:
//!   - Price a call with Black-Scholes
//!   - Recover the vol with bisection, damped Newton and calibrated Newton
//!   - Check the residual of a best-effort result
//!   - Watch solver iterations through `tracing`
//!
//! Run with: `RUST_LOG=debug cargo run --example implied_vol`

use ivsolve::pricing::{evaluate, loss};
use ivsolve::solver::{
    BisectionSolver, BracketingConfig, CalibratedSolver, GradientConfig, ImpliedVolSolver,
    NewtonSolver, SolverConfig,
};
use ivsolve::{IvError, MarketParameters, MarketQuote};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let spot = 100.0;
    let strike = 105.0;
    let rate = 0.03;
    let expiry = 0.5; // 6 months
    let vol = 0.25; // 25% vol

    // ---------------------------------------------------------------
    // 1. Price the call
    // ---------------------------------------------------------------

    let params = MarketParameters::new(spot, strike, rate, vol, expiry, 0.0)?;
    let valuation = evaluate(&params)?;

    println!("Black-Scholes call");
    println!("  Spot:   {spot}");
    println!("  Strike: {strike}");
    println!("  Rate:   {:.1}%", rate * 100.0);
    println!("  Expiry: {expiry}y");
    println!("  Vol:    {:.0}%", vol * 100.0);
    println!();
    println!("  d1:    {:.6}", valuation.d1);
    println!("  d2:    {:.6}", valuation.d2);
    println!("  Price: {:.6}", valuation.price);
    println!("  Vega:  {:.6}", valuation.vega);

    // ---------------------------------------------------------------
    // 2. Recover the vol with each solver
    // ---------------------------------------------------------------

    let quote = MarketQuote::new(spot, strike, rate, expiry, valuation.price);
    // Bisection stops at a 1e-6 bracket, so it cannot reach a 1e-6 residual here.
    let coarse = SolverConfig::default().with_tolerance(1e-4).with_verbose(true);
    let fine = SolverConfig::default().with_tolerance(1e-8).with_verbose(true);
    let solvers: Vec<(&str, Box<dyn ImpliedVolSolver>)> = vec![
        (
            "bisection",
            Box::new(BisectionSolver::new(BracketingConfig::default().with_base(coarse))),
        ),
        (
            "newton",
            Box::new(NewtonSolver::new(GradientConfig::default().with_base(fine))),
        ),
        ("calibrated", Box::new(CalibratedSolver::new(0.2))),
    ];

    println!("\n{:>12} {:>14} {:>14}", "Solver", "Implied vol", "Residual");
    println!("{}", "-".repeat(42));
    for (name, solver) in &solvers {
        let iv = solver.solve(&quote)?;
        let residual = loss(&quote.params(iv.0), quote.market_price)?;
        println!("{name:>12} {:>14.10} {residual:>14.2e}", iv.0);
    }

    // ---------------------------------------------------------------
    // 3. Failure contracts
    // ---------------------------------------------------------------

    // No vol makes a call worth more than the underlying.
    let impossible = MarketQuote::new(spot, strike, rate, expiry, spot + 1.0);

    println!("\nUnreachable premium {:.2}", impossible.market_price);
    match BisectionSolver::default().solve(&impossible) {
        Err(e @ IvError::BracketNotFound { .. }) => println!("  bisection:  {e}"),
        other => println!("  bisection:  unexpected {other:?}"),
    }
    let clamped = CalibratedSolver::new(0.2).solve(&impossible)?;
    let residual = loss(&impossible.params(clamped.0), impossible.market_price)?;
    println!("  calibrated: {:.4} (residual {residual:.4})", clamped.0);

    Ok(())
}
