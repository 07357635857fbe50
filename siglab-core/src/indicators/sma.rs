//! Simple Moving Average (SMA) and the trailing-mean primitive shared with RSI.
//!
//! Row i is defined iff i >= period - 1 and every input in the window is
//! defined. Lookback: period - 1.

use super::Indicator;

/// Trailing arithmetic mean over `period` rows.
///
/// Each window is summed directly rather than with a running sum so that a
/// window of exact zeros yields exactly zero.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];
    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        let sum: Option<f64> = window.iter().copied().sum();
        result[i] = sum.map(|s| s / period as f64);
    }

    result
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize, name: impl Into<String>) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: name.into(),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[Option<f64>]) -> Vec<Option<f64>> {
        rolling_mean(closes, self.period)
    }
}
