//! Market conventions: moneyness, forwards and day counts.

use serde::{Deserialize, Serialize};

/// Calendar days per year used to turn days-to-expiration into years.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Trading days per year used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Call moneyness `S / K`.
///
/// Above 1 the call is in the money, below 1 out of the money.
pub fn moneyness(spot: f64, strike: f64) -> f64 {
    spot / strike
}

/// Log-moneyness `ln(S / K)`.
pub fn log_moneyness(spot: f64, strike: f64) -> f64 {
    (spot / strike).ln()
}

/// Compute forward price from spot: F = S · exp(r · T).
pub fn forward_price(spot: f64, rate: f64, expiry: f64) -> f64 {
    spot * (rate * expiry).exp()
}

/// Convert whole days to expiration into a year fraction.
pub fn year_fraction(days: f64) -> f64 {
    days / DAYS_PER_YEAR
}

/// Coarse moneyness classification for a call.
///
/// Thresholds are 10% either side of at-the-money in `S / K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoneynessBucket {
    /// `S / K > 1.1`.
    DeepInTheMoney,
    /// `0.9 ≤ S / K ≤ 1.1`.
    NearTheMoney,
    /// `S / K < 0.9`.
    OutOfTheMoney,
}

impl MoneynessBucket {
    /// Upper edge of the near-the-money band.
    pub const ITM_THRESHOLD: f64 = 1.1;
    /// Lower edge of the near-the-money band.
    pub const OTM_THRESHOLD: f64 = 0.9;

    /// Classify a call by its moneyness `S / K`.
    pub fn classify(spot: f64, strike: f64) -> Self {
        let m = moneyness(spot, strike);
        if m > Self::ITM_THRESHOLD {
            Self::DeepInTheMoney
        } else if m < Self::OTM_THRESHOLD {
            Self::OutOfTheMoney
        } else {
            Self::NearTheMoney
        }
    }
}
