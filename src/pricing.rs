//! Closed-form European call price under lognormal diffusion.
//!
//! # Formula
//! ```text
//! d1 = [ln(S/K) + (r + σ²/2)(T−t)] / (σ√(T−t))
//! d2 = d1 − σ√(T−t)
//! C  = S·Φ(d1) − K·e^(−r(T−t))·Φ(d2)
//! ν  = S·√(T−t)·φ(d1)
//! ```
//!
//! Every solver in [`crate::solver`] inverts [`loss`], the gap between this
//! price and an observed premium, whose derivative in `σ` is [`vega`].

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use crate::error::{self, IvError};
use crate::types::{MarketParameters, OptionPrice};
use crate::validate::{validate_finite, validate_positive, validate_time_to_expiry};

/// Price, vega and the two standardized distances, evaluated together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub d1: f64,
    pub d2: f64,
    /// Theoretical call premium.
    pub price: f64,
    /// ∂price/∂σ.
    pub vega: f64,
}

fn standard_normal() -> error::Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| IvError::NumericalError {
        message: format!("cannot build standard normal: {e}"),
    })
}

/// Evaluate the formula once and return every intermediate.
///
/// # Errors
/// Returns [`IvError::DomainInvalid`] if `T − t ≤ 0`, `σ ≤ 0`, spot or strike
/// are not positive, or the rate is not finite. Returns
/// [`IvError::NumericalError`] if the result is not finite.
pub fn evaluate(params: &MarketParameters) -> error::Result<Valuation> {
    validate_positive(params.spot, "spot")?;
    validate_positive(params.strike, "strike")?;
    validate_finite(params.rate, "rate")?;
    validate_positive(params.vol, "vol")?;

    let tau = validate_time_to_expiry(params.expiry, params.valuation_time)?;

    let sqrt_tau = tau.sqrt();
    let sigma_sqrt_tau = params.vol * sqrt_tau;
    let d1 = ((params.spot / params.strike).ln()
        + (params.rate + 0.5 * params.vol * params.vol) * tau)
        / sigma_sqrt_tau;
    let d2 = d1 - sigma_sqrt_tau;

    let n = standard_normal()?;
    let discount = (-params.rate * tau).exp();
    let price = params.spot * n.cdf(d1) - params.strike * discount * n.cdf(d2);
    let vega = params.spot * sqrt_tau * n.pdf(d1);

    if !price.is_finite() || !vega.is_finite() {
        return Err(IvError::NumericalError {
            message: format!("non-finite valuation: price={price}, vega={vega}"),
        });
    }

    Ok(Valuation {
        d1,
        d2,
        price,
        vega,
    })
}

/// Standardized distance `d1`.
pub fn d1(params: &MarketParameters) -> error::Result<f64> {
    evaluate(params).map(|v| v.d1)
}

/// Standardized distance `d2 = d1 − σ√(T−t)`.
pub fn d2(params: &MarketParameters) -> error::Result<f64> {
    evaluate(params).map(|v| v.d2)
}

/// Theoretical European call premium.
///
/// # Examples
/// ```
/// use ivsolve::pricing::call_price;
/// use ivsolve::types::MarketParameters;
///
/// let params = MarketParameters::new(100.0, 100.0, 0.05, 0.2, 1.0, 0.0)?;
/// let premium = call_price(&params)?;
/// assert!((premium.0 - 10.4506).abs() < 1e-4);
/// # Ok::<(), ivsolve::IvError>(())
/// ```
///
/// # Errors
/// See [`evaluate`].
pub fn call_price(params: &MarketParameters) -> error::Result<OptionPrice> {
    evaluate(params).map(|v| OptionPrice(v.price))
}

/// Sensitivity of the call premium to volatility, `S·√(T−t)·φ(d1)`.
pub fn vega(params: &MarketParameters) -> error::Result<f64> {
    evaluate(params).map(|v| v.vega)
}

/// Residual `price(params) − market_price`, the function whose root in `σ`
/// is the implied volatility.
pub fn loss(params: &MarketParameters, market_price: f64) -> error::Result<f64> {
    evaluate(params).map(|v| v.price - market_price)
}
