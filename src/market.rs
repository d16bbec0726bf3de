//! Inputs supplied by market-data collaborators.
//!
//! Fetching quotes, rates and price histories is left to the caller; this
//! module holds the value types those collaborators hand over and the two
//! small estimators applied to them before calibration: rate selection by
//! tenor and historical volatility from closing prices.

use serde::{Deserialize, Serialize};

use crate::conventions::{year_fraction, TRADING_DAYS_PER_YEAR};
use crate::error::{self, IvError};
use crate::validate::{validate_finite, validate_non_negative, validate_positive};

/// One call from an option chain as reported by a market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainQuote {
    pub strike: f64,
    /// Time to expiry in years.
    pub expiry: f64,
    /// Last traded premium.
    pub last_price: f64,
    /// Spot of the underlying when the chain was fetched.
    pub spot: f64,
}

impl ChainQuote {
    pub fn new(strike: f64, expiry: f64, last_price: f64, spot: f64) -> Self {
        Self {
            strike,
            expiry,
            last_price,
            spot,
        }
    }

    /// Build a quote from calendar days to expiration.
    pub fn from_days(strike: f64, days_to_expiration: f64, last_price: f64, spot: f64) -> Self {
        Self::new(strike, year_fraction(days_to_expiration), last_price, spot)
    }

    /// All fields finite, strike, expiry and spot positive, premium non-negative.
    pub fn is_well_formed(&self) -> bool {
        validate_positive(self.strike, "strike").is_ok()
            && validate_positive(self.expiry, "expiry").is_ok()
            && validate_positive(self.spot, "spot").is_ok()
            && validate_non_negative(self.last_price, "last price").is_ok()
    }
}

/// Two-bucket risk-free rate: one rate up to a cutoff tenor, another beyond.
///
/// The default cutoff of 0.2548 years is roughly three months
/// (3 × 31 / 365).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateCurve {
    /// Rate for expiries at or below `cutoff`.
    pub short_rate: f64,
    /// Rate for expiries above `cutoff`.
    pub long_rate: f64,
    /// Boundary tenor in years.
    pub cutoff: f64,
}

impl RateCurve {
    /// Default boundary between the short and long buckets, in years.
    pub const THREE_MONTHS: f64 = 0.2548;

    /// # Errors
    /// Returns [`IvError::DomainInvalid`] if either rate is not finite.
    pub fn new(short_rate: f64, long_rate: f64) -> error::Result<Self> {
        validate_finite(short_rate, "short rate")?;
        validate_finite(long_rate, "long rate")?;
        Ok(Self {
            short_rate,
            long_rate,
            cutoff: Self::THREE_MONTHS,
        })
    }

    /// Same rate for every tenor.
    ///
    /// # Errors
    /// Returns [`IvError::DomainInvalid`] if the rate is not finite.
    pub fn flat(rate: f64) -> error::Result<Self> {
        Self::new(rate, rate)
    }

    /// Rate applicable to an option expiring in `expiry` years.
    pub fn rate_for(&self, expiry: f64) -> f64 {
        if expiry > self.cutoff {
            self.long_rate
        } else {
            self.short_rate
        }
    }
}

/// Sample standard deviation of daily log returns of `closes`.
///
/// Returns the per-period (daily) volatility; use [`annualize`] to scale it.
///
/// # Errors
/// Returns [`IvError::DomainInvalid`] if fewer than three closes are given or
/// any close is not positive and finite.
///
/// # Examples
/// ```
/// use ivsolve::market::{annualize, historical_volatility};
///
/// let closes = [100.0, 101.0, 99.5, 100.5, 102.0];
/// let daily = historical_volatility(&closes)?;
/// let yearly = annualize(daily, 252.0);
/// assert!(yearly > daily);
/// # Ok::<(), ivsolve::IvError>(())
/// ```
pub fn historical_volatility(closes: &[f64]) -> error::Result<f64> {
    if closes.len() < 3 {
        return Err(IvError::DomainInvalid {
            message: format!("need at least 3 closes, got {}", closes.len()),
        });
    }
    for &close in closes {
        validate_positive(close, "close")?;
    }

    let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Ok(variance.sqrt())
}

/// Scale a per-period volatility to annual: `vol · √periods_per_year`.
pub fn annualize(vol: f64, periods_per_year: f64) -> f64 {
    vol * periods_per_year.sqrt()
}

/// Annualized historical volatility over trading days.
///
/// # Errors
/// See [`historical_volatility`].
pub fn annualized_historical_volatility(closes: &[f64]) -> error::Result<f64> {
    historical_volatility(closes).map(|v| annualize(v, TRADING_DAYS_PER_YEAR))
}
