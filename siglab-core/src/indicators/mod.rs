//! Indicator engine.
//!
//! Indicators are pure functions of the close column: undefined-aware input
//! in, one value per row out. `compute_indicators` runs all of them in a fixed
//! order and appends the results to the series:
//!
//! sma20, sma50, sma200, boll_low, boll_high, daily_return, monthly_return,
//! annual_return, rsi
//!
//! Warm-up rows and rows whose inputs are undefined stay `None`. A series
//! shorter than a window simply yields an all-undefined column.

pub mod bollinger;
pub mod returns;
pub mod rsi;
pub mod sma;

pub use bollinger::{bollinger_bands, population_std, Bands};
pub use returns::PctChange;
pub use rsi::DoubleDiffRsi;
pub use sma::{rolling_mean, Sma};

use crate::domain::{columns, Series, SeriesError};

pub const SMA_SHORT: usize = 20;
pub const SMA_MEDIUM: usize = 50;
pub const SMA_LONG: usize = 200;
pub const DAILY_LAG: usize = 1;
pub const MONTHLY_LAG: usize = 20;
pub const ANNUAL_LAG: usize = 240;
pub const RSI_PERIOD: usize = 14;

/// A single-input indicator over the close column.
///
/// # Look-ahead guard
/// Output at row t may only depend on inputs at rows <= t. Computing over a
/// truncated prefix must reproduce the same prefix of the full output.
pub trait Indicator: Send + Sync {
    /// Column name the output is stored under.
    fn name(&self) -> &str;

    /// Number of leading rows that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator; output has the same length as `closes`.
    fn compute(&self, closes: &[Option<f64>]) -> Vec<Option<f64>>;
}

/// Append every derived indicator column to `series`.
///
/// Fails only if one of the columns already exists.
pub fn compute_indicators(mut series: Series) -> Result<Series, SeriesError> {
    let closes = series.closes();

    let sma20 = Sma::new(SMA_SHORT, columns::SMA20).compute(&closes);
    let sma50 = Sma::new(SMA_MEDIUM, columns::SMA50).compute(&closes);
    let sma200 = Sma::new(SMA_LONG, columns::SMA200).compute(&closes);
    let bands = bollinger_bands(&sma50, &sma200);

    series.insert_numeric(columns::SMA20, sma20)?;
    series.insert_numeric(columns::SMA50, sma50)?;
    series.insert_numeric(columns::SMA200, sma200)?;
    series.insert_numeric(columns::BOLL_LOW, bands.lower)?;
    series.insert_numeric(columns::BOLL_HIGH, bands.upper)?;

    let tail: Vec<Box<dyn Indicator>> = vec![
        Box::new(PctChange::new(DAILY_LAG, columns::DAILY_RETURN)),
        Box::new(PctChange::new(MONTHLY_LAG, columns::MONTHLY_RETURN)),
        Box::new(PctChange::new(ANNUAL_LAG, columns::ANNUAL_RETURN)),
        Box::new(DoubleDiffRsi::new(RSI_PERIOD, columns::RSI)),
    ];
    for indicator in tail {
        let values = indicator.compute(&closes);
        series.insert_numeric(indicator.name(), values)?;
    }

    Ok(series)
}

/// Wrap plain closes as fully defined input.
#[cfg(test)]
pub fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
