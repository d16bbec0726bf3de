//! Calibrate implied vols across an option chain.
//!
//! Shows how to:
//!   - Estimate a historical vol from daily closes
//!   - Pick a rate per expiry from a two-bucket curve
//!   - Turn chain quotes (days to expiration) into vol points
//!
//! Run with: `cargo run --example chain_calibration`

use ivsolve::chain::calibrate_chain;
use ivsolve::conventions::{year_fraction, MoneynessBucket};
use ivsolve::market::{annualized_historical_volatility, ChainQuote, RateCurve};
use ivsolve::{call_price, MarketParameters};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ---------------------------------------------------------------
    // 1. Historical vol from a month of closes
    // ---------------------------------------------------------------

    let closes = [
        412.3, 415.1, 409.8, 411.0, 418.4, 420.2, 417.5, 423.9, 421.1, 426.0, 424.3, 419.7, 422.8,
        428.5, 431.2, 427.9, 433.4, 430.1, 436.8, 434.0, 438.2,
    ];
    let hist = annualized_historical_volatility(&closes)?;
    println!("Historical vol ({} closes): {:.2}%", closes.len(), hist * 100.0);

    // ---------------------------------------------------------------
    // 2. Build a synthetic chain from a known smile
    // ---------------------------------------------------------------

    let spot = *closes.last().unwrap_or(&430.0);
    let rates = RateCurve::new(0.052, 0.047)?;
    let smile = |k: f64| 0.18 + 0.6 * (spot / k).ln().powi(2);

    let mut quotes = Vec::new();
    for days in [14.0, 45.0, 120.0, 365.0] {
        let t = year_fraction(days);
        for k in [360.0, 400.0, 420.0, 440.0, 460.0, 500.0] {
            let params = MarketParameters::new(spot, k, rates.rate_for(t), smile(k), t, 0.0)?;
            let price = call_price(&params)?.0;
            quotes.push(ChainQuote::from_days(k, days, price, spot));
        }
    }
    // A stale quote with no premium reported.
    quotes.push(ChainQuote::from_days(450.0, 30.0, f64::NAN, spot));

    // ---------------------------------------------------------------
    // 3. Calibrate
    // ---------------------------------------------------------------

    let points = calibrate_chain(&quotes, &rates, hist, 100);
    println!(
        "\nCalibrated {} of {} quotes\n",
        points.len(),
        quotes.len()
    );
    println!(
        "{:>8} {:>10} {:>8} {:>10} {:>10} {:>16}",
        "Expiry", "Moneyness", "Rate", "IV", "True vol", "Bucket"
    );
    println!("{}", "-".repeat(68));
    for p in &points {
        let strike = spot / p.moneyness;
        let bucket = MoneynessBucket::classify(spot, strike);
        println!(
            "{:>7.3}y {:>10.4} {:>7.2}% {:>9.4}% {:>9.4}% {:>16}",
            p.time_to_expiry,
            p.moneyness,
            rates.rate_for(p.time_to_expiry) * 100.0,
            p.implied_vol * 100.0,
            smile(strike) * 100.0,
            format!("{bucket:?}")
        );
    }

    Ok(())
}
