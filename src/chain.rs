//! Implied volatility points for a whole option chain.
//!
//! Each quote is calibrated on its own with the
//! [`CalibratedSolver`](crate::solver::CalibratedSolver), so a bad quote
//! never affects its neighbours. Malformed quotes (NaN, zero strike, zero
//! expiry) are dropped rather than reported.
//!
//! ```
//! use ivsolve::chain::calibrate_chain;
//! use ivsolve::market::{ChainQuote, RateCurve};
//!
//! let quotes = vec![
//!     ChainQuote::new(95.0, 0.5, 9.5, 100.0),
//!     ChainQuote::new(105.0, 0.5, 4.0, 100.0),
//!     ChainQuote::new(f64::NAN, 0.5, 4.0, 100.0),
//! ];
//! let rates = RateCurve::flat(0.04)?;
//! let points = calibrate_chain(&quotes, &rates, 0.25, 100);
//! assert_eq!(points.len(), 2);
//! # Ok::<(), ivsolve::IvError>(())
//! ```

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::conventions::moneyness;
use crate::market::{ChainQuote, RateCurve};
use crate::solver::calibrated::{CalibratedConfig, CalibratedSolver};
use crate::types::MarketQuote;

/// One calibrated point: where the quote sits and the vol it implies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolPoint {
    /// `S / K`.
    pub moneyness: f64,
    /// Years to expiry.
    pub time_to_expiry: f64,
    pub implied_vol: f64,
}

/// Calibrate every well-formed quote in `quotes`.
///
/// The rate for each quote comes from `rates` by its expiry, and every quote
/// is warm-started from `historical_vol`. Output order follows input order
/// with malformed quotes skipped.
pub fn calibrate_chain(
    quotes: &[ChainQuote],
    rates: &RateCurve,
    historical_vol: f64,
    max_steps: usize,
) -> Vec<VolPoint> {
    let solver = CalibratedSolver::with_config(CalibratedConfig {
        historical_vol,
        max_iterations: max_steps,
        ..CalibratedConfig::default()
    });

    let calibrate_quote = |quote: &ChainQuote| -> Option<VolPoint> {
        if !quote.is_well_formed() {
            return None;
        }
        let market = MarketQuote::new(
            quote.spot,
            quote.strike,
            rates.rate_for(quote.expiry),
            quote.expiry,
            quote.last_price,
        );
        Some(VolPoint {
            moneyness: moneyness(quote.spot, quote.strike),
            time_to_expiry: quote.expiry,
            implied_vol: solver.estimate(&market).0,
        })
    };

    #[cfg(feature = "parallel")]
    let points: Vec<VolPoint> = quotes.par_iter().filter_map(calibrate_quote).collect();
    #[cfg(not(feature = "parallel"))]
    let points: Vec<VolPoint> = quotes.iter().filter_map(calibrate_quote).collect();

    #[cfg(feature = "logging")]
    tracing::debug!(
        n_quotes = quotes.len(),
        n_points = points.len(),
        "chain calibration complete"
    );

    points
}
