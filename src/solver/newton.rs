//! Damped Newton-Raphson for implied volatility.
//!
//! Uses the closed-form vega as the derivative of the residual in `σ` and
//! takes a fraction (`learning_rate`) of the full Newton step each iteration.
//!
//! Unlike [`BisectionSolver`](crate::solver::BisectionSolver), running out of
//! iterations is not an error here: the last iterate is returned as a
//! best-effort estimate. Callers that need a guaranteed fit must check the
//! residual themselves.

use serde::{Deserialize, Serialize};

use crate::error::{self, IvError};
use crate::pricing::evaluate;
use crate::solver::{ImpliedVolSolver, SolverConfig};
use crate::types::{MarketQuote, Vol};
use crate::validate::{validate_non_negative, validate_positive};

/// Settings for [`NewtonSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    #[serde(flatten)]
    pub base: SolverConfig,
    /// Starting point `σ₀`.
    pub initial_vol: f64,
    /// Fraction of the full Newton step taken each iteration.
    pub learning_rate: f64,
    /// Smallest |vega| trusted for a step.
    pub min_vega: f64,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            base: SolverConfig::default(),
            initial_vol: 0.5,
            learning_rate: 0.5,
            min_vega: 1e-8,
        }
    }
}

impl GradientConfig {
    pub fn with_initial_vol(mut self, initial_vol: f64) -> Self {
        self.initial_vol = initial_vol;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_base(mut self, base: SolverConfig) -> Self {
        self.base = base;
        self
    }

    /// # Errors
    /// Returns [`IvError::DomainInvalid`] for invalid base settings, a
    /// non-positive starting vol or learning rate, or a negative vega floor.
    pub fn validate(&self) -> error::Result<()> {
        self.base.validate()?;
        validate_positive(self.initial_vol, "initial vol")?;
        validate_positive(self.learning_rate, "learning rate")?;
        validate_non_negative(self.min_vega, "minimum vega")?;
        Ok(())
    }
}

/// Implied volatility by damped Newton-Raphson.
///
/// # Examples
/// ```
/// use ivsolve::solver::{ImpliedVolSolver, NewtonSolver};
/// use ivsolve::types::MarketQuote;
///
/// let quote = MarketQuote::new(100.0, 100.0, 0.05, 1.0, 10.450_583_572_185_565);
/// let vol = NewtonSolver::default().solve(&quote)?;
/// assert!((vol.0 - 0.2).abs() < 1e-3);
/// # Ok::<(), ivsolve::IvError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NewtonSolver {
    config: GradientConfig,
}

impl NewtonSolver {
    pub fn new(config: GradientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GradientConfig {
        &self.config
    }
}

impl ImpliedVolSolver for NewtonSolver {
    fn solve(&self, quote: &MarketQuote) -> error::Result<Vol> {
        self.config.validate()?;
        quote.validate()?;

        let GradientConfig {
            base,
            initial_vol,
            learning_rate,
            min_vega,
        } = self.config;
        let mut vol = initial_vol;

        for iteration in 0..base.max_iterations {
            let valuation = evaluate(&quote.params(vol))?;
            let diff = valuation.price - quote.market_price;

            #[cfg(feature = "logging")]
            if base.verbose {
                tracing::debug!(
                    iteration,
                    vol,
                    residual = diff,
                    vega = valuation.vega,
                    "newton step"
                );
            }

            if diff.abs() < base.tolerance {
                return Ok(Vol(vol));
            }

            if valuation.vega.abs() < min_vega {
                return Err(IvError::DerivativeTooSmall {
                    vol,
                    vega: valuation.vega,
                });
            }

            vol -= learning_rate * diff / valuation.vega;

            // The step can overshoot through zero where vega is small.
            if !vol.is_finite() || vol <= 0.0 {
                return Err(IvError::NumericalError {
                    message: format!(
                        "newton iterate left σ > 0 at iteration {iteration}: vol = {vol}"
                    ),
                });
            }
        }

        #[cfg(feature = "logging")]
        if base.verbose {
            tracing::warn!(
                iterations = base.max_iterations,
                vol, "newton did not converge, returning last iterate"
            );
        }
        Ok(Vol(vol))
    }
}

/// Implied volatility by damped Newton-Raphson from `vol_initial_guess`.
///
/// Returns the last iterate if `max_steps` runs out before the residual drops
/// below `tolerance`.
///
/// # Errors
/// [`IvError::DerivativeTooSmall`] when vega vanishes,
/// [`IvError::NumericalError`] when an iterate leaves `σ > 0`, and
/// [`IvError::DomainInvalid`] for bad inputs.
#[allow(clippy::too_many_arguments)]
pub fn solve_implied_volatility_newton(
    spot: f64,
    strike: f64,
    rate: f64,
    vol_initial_guess: f64,
    expiry: f64,
    valuation_time: f64,
    market_price: f64,
    max_steps: usize,
    tolerance: f64,
) -> error::Result<Vol> {
    let config = GradientConfig::default()
        .with_initial_vol(vol_initial_guess)
        .with_base(
            SolverConfig::default()
                .with_max_iterations(max_steps)
                .with_tolerance(tolerance),
        );
    let quote =
        MarketQuote::new(spot, strike, rate, expiry, market_price).valued_at(valuation_time);
    NewtonSolver::new(config).solve(&quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::call_price;
    use crate::types::MarketParameters;

    fn price_of(s: f64, k: f64, r: f64, vol: f64, t_exp: f64, t_val: f64) -> f64 {
        call_price(&MarketParameters::new(s, k, r, vol, t_exp, t_val).unwrap())
            .unwrap()
            .0
    }

    #[test]
    fn recovers_itm_vol() {
        let price = price_of(120.0, 100.0, 0.05, 0.2, 1.0, 0.0);
        let vol = solve_implied_volatility_newton(
            120.0, 100.0, 0.05, 0.5, 1.0, 0.0, price, 2000, 1e-3,
        )
        .unwrap();
        assert!((vol.0 - 0.2).abs() < 1e-3, "got {}", vol.0);
    }

    #[test]
    fn recovers_vol_with_valuation_time() {
        let price = price_of(80.0, 90.0, 0.05, 0.88, 1.0, 0.33);
        let vol = solve_implied_volatility_newton(
            80.0, 90.0, 0.05, 0.5, 1.0, 0.33, price, 2000, 1e-3,
        )
        .unwrap();
        assert!((vol.0 - 0.88).abs() < 1e-3, "got {}", vol.0);
    }

    #[test]
    fn tight_tolerance_converges() {
        let price = price_of(100.0, 150.0, 0.05, 0.38, 1.0, 0.0);
        let vol = solve_implied_volatility_newton(
            100.0, 150.0, 0.05, 0.5, 1.0, 0.0, price, 2000, 1e-10,
        )
        .unwrap();
        assert!((vol.0 - 0.38).abs() < 1e-9, "got {}", vol.0);
    }

    #[test]
    fn flat_vega_is_an_error() {
        // Deep OTM with a week of life left: vega underflows.
        let result = solve_implied_volatility_newton(
            50.0, 250.0, 0.05, 0.45, 1.0, 0.99, 1.0, 2000, 1e-3,
        );
        match result {
            Err(IvError::DerivativeTooSmall { vol, vega }) => {
                assert_eq!(vol, 0.45);
                assert!(vega.abs() < 1e-8);
            }
            other => panic!("expected DerivativeTooSmall, got {other:?}"),
        }
    }

    #[test]
    fn exhausted_budget_returns_last_iterate() {
        let price = price_of(100.0, 100.0, 0.05, 0.2, 1.0, 0.0);
        let vol = solve_implied_volatility_newton(
            100.0, 100.0, 0.05, 0.5, 1.0, 0.0, price, 1, 1e-3,
        )
        .unwrap();
        // One damped step moves toward 0.2 without reaching it.
        assert!(vol.0 < 0.5);
        assert!(vol.0 > 0.2 + 1e-3);
    }

    #[test]
    fn overshoot_through_zero_is_reported() {
        // Starting at σ = 8 vega is tiny but above the floor, so the step is huge.
        let price = price_of(100.0, 100.0, 0.05, 0.2, 1.0, 0.0);
        let result = solve_implied_volatility_newton(
            100.0, 100.0, 0.05, 8.0, 1.0, 0.0, price, 2000, 1e-3,
        );
        assert!(matches!(result, Err(IvError::NumericalError { .. })));
    }

    #[test]
    fn rejects_zero_time_to_expiry() {
        let result = solve_implied_volatility_newton(
            100.0, 100.0, 0.05, 0.5, 1.0, 1.0, 5.0, 2000, 1e-3,
        );
        assert!(matches!(result, Err(IvError::DomainInvalid { .. })));
    }

    #[test]
    fn full_step_learning_rate() {
        let price = price_of(100.0, 100.0, 0.05, 0.25, 0.5, 0.0);
        let config = GradientConfig::default()
            .with_learning_rate(1.0)
            .with_base(SolverConfig::default().with_tolerance(1e-8).with_verbose(true));
        let quote = MarketQuote::new(100.0, 100.0, 0.05, 0.5, price);
        let vol = NewtonSolver::new(config).solve(&quote).unwrap();
        assert!((vol.0 - 0.25).abs() < 1e-6);
    }

    #[test]
    fn config_from_json() {
        let config: GradientConfig =
            serde_json::from_str(r#"{"initial_vol": 0.3, "tolerance": 1e-6}"#).unwrap();
        assert_eq!(config.initial_vol, 0.3);
        assert_eq!(config.learning_rate, 0.5);
        assert_eq!(config.base.tolerance, 1e-6);
    }
}
