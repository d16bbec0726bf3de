//! Error types for the ivsolve library.
//!
//! Pricing and the strict solvers return `Result<T, IvError>` rather than
//! panicking. Each variant carries the numbers a caller needs to decide what
//! to do next (widen a bracket, switch solver, drop the quote).

use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, IvError>;

/// Errors raised by the pricing formula and the strict root-finders.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IvError {
    /// Inputs outside the formula's domain (e.g., zero time to expiry, non-positive spot).
    #[error("invalid input: {message}")]
    DomainInvalid { message: String },

    /// No sign change of the residual could be found below the volatility ceiling.
    #[error(
        "no root bracketed in [{vol_left}, {vol_right}] after widening toward max vol {max_vol}"
    )]
    BracketNotFound {
        vol_left: f64,
        vol_right: f64,
        /// Hard ceiling on the right bound.
        max_vol: f64,
    },

    /// The bracket collapsed below its minimum width before the residual met tolerance.
    #[error("bracket [{vol_left}, {vol_right}] collapsed with residual {residual}")]
    IntervalTooSmall {
        vol_left: f64,
        vol_right: f64,
        /// Residual at the last midpoint evaluated.
        residual: f64,
    },

    /// Iteration budget exhausted without meeting tolerance.
    #[error("no convergence after {iterations} iterations (residual {residual})")]
    NonConvergence { iterations: usize, residual: f64 },

    /// Vega too small to trust a Newton step.
    #[error("vega {vega} too small at vol {vol}")]
    DerivativeTooSmall { vol: f64, vega: f64 },

    /// Numerical computation failed (e.g., NaN price).
    #[error("numerical error: {message}")]
    NumericalError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_not_found_fields_accessible() {
        let err = IvError::BracketNotFound {
            vol_left: 1e-6,
            vol_right: 20.0,
            max_vol: 20.0,
        };
        match &err {
            IvError::BracketNotFound {
                vol_left,
                vol_right,
                max_vol,
            } => {
                assert_eq!(*vol_left, 1e-6);
                assert_eq!(*vol_right, 20.0);
                assert_eq!(*max_vol, 20.0);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn error_display_includes_context() {
        let err = IvError::DomainInvalid {
            message: "time to expiry must be positive".into(),
        };
        assert!(format!("{err}").contains("time to expiry"));

        let err = IvError::NonConvergence {
            iterations: 2000,
            residual: 0.5,
        };
        assert!(format!("{err}").contains("2000"));

        let err = IvError::DerivativeTooSmall {
            vol: 0.01,
            vega: 1e-12,
        };
        assert!(format!("{err}").contains("vega"));

        let err = IvError::IntervalTooSmall {
            vol_left: 0.2,
            vol_right: 0.2000001,
            residual: 0.01,
        };
        assert!(format!("{err}").contains("collapsed"));

        let err = IvError::NumericalError {
            message: "NaN price".into(),
        };
        assert!(format!("{err}").contains("NaN price"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IvError>();
    }
}
