//! Core domain types for pricing and implied volatility.
//!
//! # Newtype Strategy
//!
//! **Outputs use newtypes**: [`Vol`] and [`OptionPrice`] wrap return values
//! so a solved volatility cannot be passed where a premium is expected.
//!
//! **Inputs use bare `f64`** or plain value structs ([`MarketParameters`],
//! [`MarketQuote`]) whose fields are named after what they hold.
//!
//! # Why no `Eq` or `Ord`?
//! These types wrap `f64`, which does not implement `Eq` or `Ord` because `NaN`
//! breaks total ordering. We derive `PartialEq` and `PartialOrd` only.

use serde::{Deserialize, Serialize};

use crate::error;
use crate::validate::{
    validate_finite, validate_non_negative, validate_positive, validate_valuation_time,
};

/// Implied volatility `σ`, measured as annualized standard deviation.
///
/// # Examples
/// ```
/// use ivsolve::types::Vol;
/// let vol = Vol(0.20);
/// assert_eq!(vol.0, 0.20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

/// Premium of a European call, theoretical or observed.
///
/// # Examples
/// ```
/// use ivsolve::types::OptionPrice;
/// let premium = OptionPrice(10.45);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct OptionPrice(pub f64);

/// Inputs to the closed-form call price.
///
/// Times are in years. `expiry` is the expiry date `T` and `valuation_time`
/// the date `t` at which the option is valued, so time to expiry is `T − t`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketParameters {
    /// Spot price `S`.
    pub spot: f64,
    /// Strike `K`.
    pub strike: f64,
    /// Continuously compounded risk-free rate `r`.
    pub rate: f64,
    /// Volatility `σ`.
    pub vol: f64,
    /// Expiry `T`.
    pub expiry: f64,
    /// Valuation time `t`, `0 ≤ t ≤ T`.
    pub valuation_time: f64,
}

impl MarketParameters {
    /// Build validated parameters.
    ///
    /// Accepts `T = t` and `σ = 0`; the pricing formula rejects those
    /// degenerate points itself.
    ///
    /// # Errors
    /// Returns [`IvError::DomainInvalid`](crate::IvError::DomainInvalid) if
    /// spot or strike are not positive, rate is not finite, vol or expiry are
    /// negative, or valuation time falls outside `[0, T]`.
    pub fn new(
        spot: f64,
        strike: f64,
        rate: f64,
        vol: f64,
        expiry: f64,
        valuation_time: f64,
    ) -> error::Result<Self> {
        validate_positive(spot, "spot")?;
        validate_positive(strike, "strike")?;
        validate_finite(rate, "rate")?;
        validate_non_negative(vol, "vol")?;
        validate_non_negative(expiry, "expiry")?;
        validate_valuation_time(valuation_time, expiry)?;
        Ok(Self {
            spot,
            strike,
            rate,
            vol,
            expiry,
            valuation_time,
        })
    }

    /// Time to expiry `T − t` in years.
    pub fn time_to_expiry(&self) -> f64 {
        self.expiry - self.valuation_time
    }

    /// Copy of these parameters with a different volatility.
    pub fn with_vol(self, vol: f64) -> Self {
        Self { vol, ..self }
    }
}

/// An observed call premium together with everything except the volatility.
///
/// This is what every solver inverts: find `σ` such that the model price
/// of these parameters matches `market_price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub spot: f64,
    pub strike: f64,
    pub rate: f64,
    pub expiry: f64,
    pub valuation_time: f64,
    /// Observed call premium.
    pub market_price: f64,
}

impl MarketQuote {
    /// Create a quote valued today (`t = 0`).
    pub fn new(spot: f64, strike: f64, rate: f64, expiry: f64, market_price: f64) -> Self {
        Self {
            spot,
            strike,
            rate,
            expiry,
            valuation_time: 0.0,
            market_price,
        }
    }

    /// Set the valuation time `t`.
    pub fn valued_at(mut self, valuation_time: f64) -> Self {
        self.valuation_time = valuation_time;
        self
    }

    /// Pricing inputs for this quote at volatility `vol`.
    ///
    /// No validation happens here; the pricing formula checks its own domain
    /// on every evaluation.
    pub fn params(&self, vol: f64) -> MarketParameters {
        MarketParameters {
            spot: self.spot,
            strike: self.strike,
            rate: self.rate,
            vol,
            expiry: self.expiry,
            valuation_time: self.valuation_time,
        }
    }

    /// Reject quotes no solver could make sense of.
    pub(crate) fn validate(&self) -> error::Result<()> {
        MarketParameters::new(
            self.spot,
            self.strike,
            self.rate,
            0.0,
            self.expiry,
            self.valuation_time,
        )?;
        validate_non_negative(self.market_price, "market price")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_valid_params() {
        let p = MarketParameters::new(120.0, 100.0, 0.05, 0.2, 1.0, 0.25).unwrap();
        assert_eq!(p.spot, 120.0);
        assert_eq!(p.time_to_expiry(), 0.75);
    }

    #[test]
    fn new_accepts_degenerate_expiry_and_zero_vol() {
        assert!(MarketParameters::new(100.0, 100.0, 0.05, 0.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn new_rejects_valuation_after_expiry() {
        assert!(MarketParameters::new(100.0, 100.0, 0.05, 0.2, 1.0, 1.5).is_err());
    }

    #[test]
    fn new_rejects_bad_spot_and_strike() {
        assert!(MarketParameters::new(0.0, 100.0, 0.05, 0.2, 1.0, 0.0).is_err());
        assert!(MarketParameters::new(100.0, -5.0, 0.05, 0.2, 1.0, 0.0).is_err());
        assert!(MarketParameters::new(100.0, 100.0, f64::NAN, 0.2, 1.0, 0.0).is_err());
    }

    #[test]
    fn with_vol_replaces_only_vol() {
        let p = MarketParameters::new(80.0, 90.0, 0.05, 0.2, 1.0, 0.33).unwrap();
        let q = p.with_vol(0.88);
        assert_eq!(q.vol, 0.88);
        assert_eq!(q.strike, 90.0);
        assert_eq!(q.valuation_time, 0.33);
    }

    #[test]
    fn quote_params_carry_fields() {
        let q = MarketQuote::new(80.0, 90.0, 0.05, 1.0, 20.0).valued_at(0.33);
        let p = q.params(0.4);
        assert_eq!(p.vol, 0.4);
        assert_eq!(p.valuation_time, 0.33);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn quote_rejects_negative_price() {
        let q = MarketQuote::new(80.0, 90.0, 0.05, 1.0, -1.0);
        assert!(q.validate().is_err());
    }

    #[test]
    fn serde_round_trip_parameters() {
        let p = MarketParameters::new(120.0, 100.0, 0.05, 0.2, 1.0, 0.0).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        let back: MarketParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
