//! Implied volatility root-finders.
//!
//! Three solvers invert [`crate::pricing::loss`] in `σ`:
//!
//! - [`BisectionSolver`]: bracketing bisection, derivative-free, hard-fails
//!   on every non-convergence path
//! - [`NewtonSolver`]: damped Newton-Raphson on vega; hard-fails on a
//!   vanishing derivative or an iterate that leaves `σ > 0`, and otherwise
//!   returns its last iterate
//! - [`CalibratedSolver`]: Newton with a moneyness warm start, step capping
//!   and clamping; never fails
//!
//! The strict and best-effort contracts are deliberately different. A caller
//! who needs a guaranteed residual should use the bisection solver or check
//! the residual of a Newton result itself.

pub mod bisection;
pub mod calibrated;
pub mod newton;

pub use bisection::{
    solve_implied_volatility_bracketing, BisectionSolver, BracketingConfig, MAX_VOL,
};
pub use calibrated::{solve_implied_volatility_calibrated, CalibratedConfig, CalibratedSolver};
pub use newton::{solve_implied_volatility_newton, GradientConfig, NewtonSolver};

use serde::{Deserialize, Serialize};

use crate::error;
use crate::types::{MarketQuote, Vol};
use crate::validate::{validate_iterations, validate_positive};

/// Settings shared by the strict solvers.
///
/// # Examples
/// ```
/// use ivsolve::solver::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_max_iterations(500)
///     .with_tolerance(1e-6);
/// assert_eq!(config.max_iterations, 500);
/// assert!(!config.verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Upper bound on loop iterations.
    pub max_iterations: usize,
    /// Absolute tolerance on the price residual.
    pub tolerance: f64,
    /// Emit per-iteration `tracing` debug events.
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            tolerance: 1e-3,
            verbose: false,
        }
    }
}

impl SolverConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// # Errors
    /// Returns [`IvError::DomainInvalid`](crate::IvError::DomainInvalid) for a
    /// zero iteration budget or a non-positive tolerance.
    pub fn validate(&self) -> error::Result<()> {
        validate_iterations(self.max_iterations)?;
        validate_positive(self.tolerance, "tolerance")?;
        Ok(())
    }
}

/// Anything that can turn an observed premium into a volatility.
///
/// # Thread Safety
/// Solvers hold only configuration, so all implementations are `Send + Sync`
/// and one instance can serve many threads.
pub trait ImpliedVolSolver: Send + Sync {
    /// Implied volatility of `quote`.
    fn solve(&self, quote: &MarketQuote) -> error::Result<Vol>;
}
