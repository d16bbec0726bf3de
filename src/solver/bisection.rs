//! Bracketing bisection for implied volatility.
//!
//! Bisection never diverges once a sign change is bracketed. When the initial
//! bracket does not contain one, the solver widens it (left bound halved
//! toward zero, right bound moved halfway to [`MAX_VOL`]) and retries. Once
//! neither bound can move any further (right bound at the ceiling, left bound
//! below the minimum bracket width) it gives up with
//! [`IvError::BracketNotFound`].

use serde::{Deserialize, Serialize};

use crate::error::{self, IvError};
use crate::pricing::loss;
use crate::solver::{ImpliedVolSolver, SolverConfig};
use crate::types::{MarketQuote, Vol};
use crate::validate::{validate_finite, validate_positive};

/// Hard ceiling on volatility when widening a bracket.
pub const MAX_VOL: f64 = 20.0;

/// Bracket width below which bisection stops without a root.
pub const MIN_BRACKET_WIDTH: f64 = 1e-6;

/// Settings for [`BisectionSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketingConfig {
    #[serde(flatten)]
    pub base: SolverConfig,
    /// Initial left bound on `σ`, must be positive.
    pub vol_left: f64,
    /// Initial right bound on `σ`.
    pub vol_right: f64,
    pub min_width: f64,
}

impl Default for BracketingConfig {
    fn default() -> Self {
        Self {
            base: SolverConfig::default(),
            vol_left: 1e-6,
            vol_right: MAX_VOL,
            min_width: MIN_BRACKET_WIDTH,
        }
    }
}

impl BracketingConfig {
    /// Set the initial bracket `[vol_left, vol_right]`.
    pub fn with_bracket(mut self, vol_left: f64, vol_right: f64) -> Self {
        self.vol_left = vol_left;
        self.vol_right = vol_right;
        self
    }

    pub fn with_base(mut self, base: SolverConfig) -> Self {
        self.base = base;
        self
    }

    /// # Errors
    /// Returns [`IvError::DomainInvalid`] if the base settings are invalid,
    /// the left bound is not positive, or the bracket is empty.
    pub fn validate(&self) -> error::Result<()> {
        self.base.validate()?;
        validate_positive(self.vol_left, "left vol bound")?;
        validate_finite(self.vol_right, "right vol bound")?;
        validate_positive(self.min_width, "minimum bracket width")?;
        if self.vol_right <= self.vol_left {
            return Err(IvError::DomainInvalid {
                message: format!(
                    "bracket must satisfy left < right, got [{}, {}]",
                    self.vol_left, self.vol_right
                ),
            });
        }
        Ok(())
    }
}

/// Derivative-free implied volatility by bracket narrowing.
///
/// Every way of not converging is an error: no bracket below
/// [`MAX_VOL`], a bracket that collapses, or an exhausted iteration budget.
///
/// # Examples
/// ```
/// use ivsolve::solver::{BisectionSolver, ImpliedVolSolver};
/// use ivsolve::types::MarketQuote;
///
/// let quote = MarketQuote::new(120.0, 100.0, 0.05, 1.0, 26.169_043_946_847_296);
/// let vol = BisectionSolver::default().solve(&quote)?;
/// assert!((vol.0 - 0.2).abs() < 1e-3);
/// # Ok::<(), ivsolve::IvError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BisectionSolver {
    config: BracketingConfig,
}

impl BisectionSolver {
    pub fn new(config: BracketingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BracketingConfig {
        &self.config
    }
}

impl ImpliedVolSolver for BisectionSolver {
    #[cfg_attr(not(feature = "logging"), allow(unused_variables))]
    fn solve(&self, quote: &MarketQuote) -> error::Result<Vol> {
        self.config.validate()?;
        quote.validate()?;

        let BracketingConfig {
            base,
            mut vol_left,
            mut vol_right,
            min_width,
        } = self.config;
        let target = quote.market_price;
        let mut residual = f64::NAN;

        for iteration in 0..base.max_iterations {
            let f_left = loss(&quote.params(vol_left), target)?;
            let f_right = loss(&quote.params(vol_right), target)?;

            if f_left == 0.0 {
                return Ok(Vol(vol_left));
            }
            if f_right == 0.0 {
                return Ok(Vol(vol_right));
            }

            if f_left * f_right > 0.0 {
                residual = if f_left.abs() < f_right.abs() {
                    f_left
                } else {
                    f_right
                };
                let right_at_ceiling = vol_right >= MAX_VOL - min_width;
                if right_at_ceiling && vol_left < min_width {
                    return Err(IvError::BracketNotFound {
                        vol_left,
                        vol_right,
                        max_vol: MAX_VOL,
                    });
                }
                vol_left -= vol_left / 2.0;
                if !right_at_ceiling {
                    vol_right += (MAX_VOL - vol_right) / 2.0;
                }
                #[cfg(feature = "logging")]
                if base.verbose {
                    tracing::debug!(
                        iteration,
                        vol_left,
                        vol_right,
                        "no sign change, widening bracket"
                    );
                }
                continue;
            }

            let vol_mid = 0.5 * (vol_left + vol_right);
            let f_mid = loss(&quote.params(vol_mid), target)?;
            residual = f_mid;

            #[cfg(feature = "logging")]
            if base.verbose {
                tracing::debug!(iteration, vol_mid, residual = f_mid, "bisection step");
            }

            if f_mid.abs() < base.tolerance {
                return Ok(Vol(vol_mid));
            }

            if f_left * f_mid < 0.0 {
                vol_right = vol_mid;
            } else {
                vol_left = vol_mid;
            }

            if (vol_right - vol_left).abs() < min_width {
                return Err(IvError::IntervalTooSmall {
                    vol_left,
                    vol_right,
                    residual,
                });
            }
        }

        Err(IvError::NonConvergence {
            iterations: base.max_iterations,
            residual,
        })
    }
}

/// Implied volatility by bisection, starting from `[vol_left, vol_right]`.
///
/// # Errors
/// [`IvError::BracketNotFound`], [`IvError::IntervalTooSmall`],
/// [`IvError::NonConvergence`], or [`IvError::DomainInvalid`] for bad inputs.
#[allow(clippy::too_many_arguments)]
pub fn solve_implied_volatility_bracketing(
    spot: f64,
    strike: f64,
    rate: f64,
    vol_left: f64,
    vol_right: f64,
    expiry: f64,
    valuation_time: f64,
    market_price: f64,
    max_steps: usize,
    tolerance: f64,
) -> error::Result<Vol> {
    let config = BracketingConfig::default()
        .with_bracket(vol_left, vol_right)
        .with_base(
            SolverConfig::default()
                .with_max_iterations(max_steps)
                .with_tolerance(tolerance),
        );
    let quote =
        MarketQuote::new(spot, strike, rate, expiry, market_price).valued_at(valuation_time);
    BisectionSolver::new(config).solve(&quote)
}
