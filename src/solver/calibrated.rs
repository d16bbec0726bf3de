//! Best-effort Newton calibration for unattended use on live quotes.
//!
//! Differences from [`NewtonSolver`](crate::solver::NewtonSolver):
//!
//! - the starting point is a historical volatility nudged by moneyness
//!   (down for deep in-the-money calls, up for out-of-the-money ones)
//! - each step is capped at [`MAX_STEP`] volatility units
//! - every iterate is clamped into `[MIN_CALIBRATED_VOL, MAX_CALIBRATED_VOL]`
//! - a small residual, a flat vega, or an unpriceable point all just stop
//!   the loop; the solver always returns a volatility in range
//!
//! The moneyness scale factors are tunable defaults, not model outputs.

use serde::{Deserialize, Serialize};

use crate::conventions::MoneynessBucket;
use crate::error;
use crate::pricing::evaluate;
use crate::solver::ImpliedVolSolver;
use crate::types::{MarketQuote, Vol};

/// Residual below which calibration stops.
pub const CALIBRATED_TOLERANCE: f64 = 1e-6;

/// Lower clamp on every iterate.
pub const MIN_CALIBRATED_VOL: f64 = 1e-8;

/// Upper clamp on every iterate.
pub const MAX_CALIBRATED_VOL: f64 = 2.0;

/// Largest change in volatility allowed per iteration.
pub const MAX_STEP: f64 = 0.5;

const MIN_VEGA: f64 = 1e-8;

/// Settings for [`CalibratedSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibratedConfig {
    /// Historical volatility the warm start is derived from.
    pub historical_vol: f64,
    pub max_iterations: usize,
    /// Warm-start multiplier for `S/K > 1.1`.
    pub itm_scale: f64,
    /// Warm-start multiplier for `S/K < 0.9`.
    pub otm_scale: f64,
    pub verbose: bool,
}

impl Default for CalibratedConfig {
    fn default() -> Self {
        Self {
            historical_vol: 0.2,
            max_iterations: 100,
            itm_scale: 0.8,
            otm_scale: 1.2,
            verbose: false,
        }
    }
}

/// Clamp into the admissible range. `NaN` maps to the lower bound.
fn clamp_vol(vol: f64) -> f64 {
    vol.max(MIN_CALIBRATED_VOL).min(MAX_CALIBRATED_VOL)
}

/// Newton calibration that never fails.
///
/// # Examples
/// ```
/// use ivsolve::solver::CalibratedSolver;
/// use ivsolve::types::MarketQuote;
///
/// let quote = MarketQuote::new(100.0, 100.0, 0.05, 1.0, 10.450_583_572_185_565);
/// let vol = CalibratedSolver::new(0.3).estimate(&quote);
/// assert!((vol.0 - 0.2).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CalibratedSolver {
    config: CalibratedConfig,
}

impl CalibratedSolver {
    /// Solver with default settings and the given historical volatility.
    pub fn new(historical_vol: f64) -> Self {
        Self::with_config(CalibratedConfig {
            historical_vol,
            ..CalibratedConfig::default()
        })
    }

    pub fn with_config(config: CalibratedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalibratedConfig {
        &self.config
    }

    /// Starting volatility for a call struck at `strike` with spot `spot`.
    ///
    /// Not clamped; [`estimate`](Self::estimate) clamps it before use.
    pub fn warm_start(&self, spot: f64, strike: f64) -> f64 {
        let hist = self.config.historical_vol;
        match MoneynessBucket::classify(spot, strike) {
            MoneynessBucket::DeepInTheMoney => hist * self.config.itm_scale,
            MoneynessBucket::OutOfTheMoney => hist * self.config.otm_scale,
            MoneynessBucket::NearTheMoney => hist,
        }
    }

    /// Best estimate of the implied volatility of `quote`.
    ///
    /// Always lies in `[MIN_CALIBRATED_VOL, MAX_CALIBRATED_VOL]`.
    #[cfg_attr(not(feature = "logging"), allow(unused_variables))]
    pub fn estimate(&self, quote: &MarketQuote) -> Vol {
        let verbose = self.config.verbose;
        let mut vol = clamp_vol(self.warm_start(quote.spot, quote.strike));

        for iteration in 0..self.config.max_iterations {
            let valuation = match evaluate(&quote.params(vol)) {
                Ok(v) => v,
                Err(e) => {
                    #[cfg(feature = "logging")]
                    if verbose {
                        tracing::debug!(iteration, vol, error = %e, "cannot price, stopping");
                    }
                    break;
                }
            };
            let diff = valuation.price - quote.market_price;

            #[cfg(feature = "logging")]
            if verbose {
                tracing::debug!(
                    iteration,
                    vol,
                    residual = diff,
                    vega = valuation.vega,
                    "calibration step"
                );
            }

            if diff.abs() < CALIBRATED_TOLERANCE || !diff.is_finite() {
                break;
            }
            if valuation.vega.is_nan() || valuation.vega < MIN_VEGA {
                break;
            }

            let update = diff / valuation.vega;
            let damping = if update.abs() > 0.0 {
                (MAX_STEP / update.abs()).min(1.0)
            } else {
                1.0
            };
            vol = clamp_vol(vol - update * damping);
        }

        Vol(clamp_vol(vol))
    }
}

impl ImpliedVolSolver for CalibratedSolver {
    /// Never returns `Err`.
    fn solve(&self, quote: &MarketQuote) -> error::Result<Vol> {
        Ok(self.estimate(quote))
    }
}

/// Best-effort implied volatility valued today, warm-started from
/// `historical_vol`. Never fails.
pub fn solve_implied_volatility_calibrated(
    spot: f64,
    strike: f64,
    rate: f64,
    historical_vol: f64,
    expiry: f64,
    market_price: f64,
    max_steps: usize,
) -> Vol {
    let solver = CalibratedSolver::with_config(CalibratedConfig {
        historical_vol,
        max_iterations: max_steps,
        ..CalibratedConfig::default()
    });
    solver.estimate(&MarketQuote::new(spot, strike, rate, expiry, market_price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::call_price;
    use crate::types::MarketParameters;

    fn price_of(s: f64, k: f64, r: f64, vol: f64, t: f64) -> f64 {
        call_price(&MarketParameters::new(s, k, r, vol, t, 0.0).unwrap())
            .unwrap()
            .0
    }

    fn in_range(vol: Vol) -> bool {
        (MIN_CALIBRATED_VOL..=MAX_CALIBRATED_VOL).contains(&vol.0)
    }

    // --- Warm start ---

    #[test]
    fn warm_start_by_moneyness() {
        let s = CalibratedSolver::new(0.5);
        assert!((s.warm_start(120.0, 100.0) - 0.4).abs() < 1e-12);
        assert!((s.warm_start(80.0, 100.0) - 0.6).abs() < 1e-12);
        assert_eq!(s.warm_start(100.0, 100.0), 0.5);
    }

    #[test]
    fn warm_start_scales_are_tunable() {
        let s = CalibratedSolver::with_config(CalibratedConfig {
            historical_vol: 0.5,
            itm_scale: 1.0,
            otm_scale: 2.0,
            ..CalibratedConfig::default()
        });
        assert_eq!(s.warm_start(120.0, 100.0), 0.5);
        assert_eq!(s.warm_start(80.0, 100.0), 1.0);
    }

    // --- Convergence ---

    #[test]
    fn recovers_vol_in_each_bucket() {
        for (spot, strike, vol) in [(120.0, 100.0, 0.2), (100.0, 100.0, 0.35), (80.0, 100.0, 0.6)] {
            let price = price_of(spot, strike, 0.05, vol, 1.0);
            let got = solve_implied_volatility_calibrated(spot, strike, 0.05, 0.3, 1.0, price, 100);
            assert!((got.0 - vol).abs() < 1e-5, "S={spot} K={strike}: got {}", got.0);
        }
    }

    #[test]
    fn step_is_capped() {
        // Warm start 0.1, true vol 1.5: a single step may move at most 0.5.
        let price = price_of(100.0, 100.0, 0.0, 1.5, 1.0);
        let got = solve_implied_volatility_calibrated(100.0, 100.0, 0.0, 0.1, 1.0, price, 1);
        assert!((got.0 - 0.6).abs() < 1e-12, "got {}", got.0);
    }

    #[test]
    fn vol_above_ceiling_is_clamped() {
        let price = price_of(100.0, 100.0, 0.05, 3.0, 1.0);
        let got = solve_implied_volatility_calibrated(100.0, 100.0, 0.05, 0.3, 1.0, price, 100);
        assert_eq!(got.0, MAX_CALIBRATED_VOL);
    }

    // --- Never fails ---

    #[test]
    fn zero_expiry_returns_warm_start() {
        let got = solve_implied_volatility_calibrated(100.0, 100.0, 0.05, 0.3, 0.0, 5.0, 100);
        assert_eq!(got.0, 0.3);
    }

    #[test]
    fn garbage_inputs_stay_in_range() {
        let cases = [
            (f64::NAN, 100.0, 0.05, 0.3, 1.0, 10.0),
            (100.0, 100.0, 0.05, f64::NAN, 1.0, 10.0),
            (100.0, 100.0, 0.05, 50.0, 1.0, 10.0),
            (100.0, 100.0, 0.05, -1.0, 1.0, 10.0),
            (100.0, 100.0, 0.05, 0.3, 1.0, f64::INFINITY),
            (100.0, 100.0, 0.05, 0.3, 1.0, 500.0),
            (100.0, -100.0, 0.05, 0.3, 1.0, 10.0),
        ];
        for (s, k, r, h, t, p) in cases {
            let got = solve_implied_volatility_calibrated(s, k, r, h, t, p, 100);
            assert!(in_range(got), "({s}, {k}, {r}, {h}, {t}, {p}) -> {}", got.0);
        }
    }

    #[test]
    fn zero_budget_returns_clamped_warm_start() {
        let got = solve_implied_volatility_calibrated(80.0, 100.0, 0.05, 5.0, 1.0, 10.0, 0);
        assert_eq!(got.0, MAX_CALIBRATED_VOL);
    }

    #[test]
    fn trait_solve_is_always_ok() {
        let quote = MarketQuote::new(100.0, 100.0, 0.05, 0.0, 5.0);
        assert!(CalibratedSolver::new(0.3).solve(&quote).is_ok());
    }
}
