//! Domain checks shared by the pricing inputs and the solver configs.
//!
//! Every check rejects NaN and ±Inf before comparing, and every failure is
//! an [`IvError::DomainInvalid`] naming the offending field.

use crate::error::{self, IvError};

fn domain_invalid(message: String) -> IvError {
    IvError::DomainInvalid { message }
}

/// `value > 0` and finite.
pub(crate) fn validate_positive(value: f64, name: &str) -> error::Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(domain_invalid(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

/// `value ≥ 0` and finite.
pub(crate) fn validate_non_negative(value: f64, name: &str) -> error::Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(domain_invalid(format!(
            "{name} must be non-negative and finite, got {value}"
        )))
    }
}

/// Any finite value; rates may be zero or negative.
pub(crate) fn validate_finite(value: f64, name: &str) -> error::Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(domain_invalid(format!("{name} must be finite, got {value}")))
    }
}

/// Valuation time must lie in `[0, T]`.
pub(crate) fn validate_valuation_time(valuation_time: f64, expiry: f64) -> error::Result<()> {
    validate_non_negative(valuation_time, "valuation time")?;
    if valuation_time > expiry {
        return Err(domain_invalid(format!(
            "valuation time must not exceed expiry, got t={valuation_time} > T={expiry}"
        )));
    }
    Ok(())
}

/// Time to expiry `T − t`, which the closed form needs strictly positive.
pub(crate) fn validate_time_to_expiry(expiry: f64, valuation_time: f64) -> error::Result<f64> {
    let tau = expiry - valuation_time;
    if tau.is_finite() && tau > 0.0 {
        Ok(tau)
    } else {
        Err(domain_invalid(format!(
            "time to expiry must be positive, got T - t = {expiry} - {valuation_time} = {tau}"
        )))
    }
}

/// Iteration budgets of strict solvers must allow at least one step.
pub(crate) fn validate_iterations(max_iterations: usize) -> error::Result<usize> {
    if max_iterations == 0 {
        return Err(domain_invalid(
            "max iterations must be at least 1".to_string(),
        ));
    }
    Ok(max_iterations)
}
