//! # ivsolve
//!
//! Black-Scholes call pricing and implied volatility extraction.
//!
//! Takes one option quote at a time: spot, strike, rate, expiry and an
//! observed premium in, a volatility (or a typed failure) out.
//!
//! ## Architecture
//!
//! - **`pricing`**: Closed-form call price, `d1`/`d2`, vega and the residual
//! - **`solver`**: Root-finders that invert the price in `σ`:
//!   bisection, damped Newton, and a best-effort calibrated Newton
//! - **`market`**: Chain quotes, rate selection by tenor, historical vol
//! - **`chain`**: Per-quote calibration of a whole chain
//!
//! ## Design
//!
//! - **Two solver contracts.** [`solver::BisectionSolver`] fails on every
//!   non-convergence path. [`solver::NewtonSolver`] fails on a vanishing vega
//!   or on a step that overshoots to `σ ≤ 0`, and otherwise returns its last
//!   iterate. [`solver::CalibratedSolver`]
//!   never fails and always returns a clamped estimate. The asymmetry is
//!   intentional: check the residual yourself when using the best-effort paths.
//! - **No panics.** Every fallible operation returns [`Result`]. Library code
//!   never calls `unwrap()` or `expect()`.
//! - **No shared state.** Every call is independent; solvers hold only
//!   configuration and are `Send + Sync`.
//! - **Opt-in diagnostics.** With the `logging` feature, solvers configured
//!   with `verbose` emit `tracing` debug events per iteration. Errors are
//!   returned, never logged.

pub mod chain;
pub mod conventions;
pub mod error;
pub mod market;
pub mod pricing;
pub mod solver;
pub mod types;
mod validate;

#[doc(inline)]
pub use error::{IvError, Result};
#[doc(inline)]
pub use pricing::{call_price, vega, Valuation};
#[doc(inline)]
pub use solver::{
    solve_implied_volatility_bracketing, solve_implied_volatility_calibrated,
    solve_implied_volatility_newton, ImpliedVolSolver,
};
#[doc(inline)]
pub use types::{MarketParameters, MarketQuote, OptionPrice, Vol};
