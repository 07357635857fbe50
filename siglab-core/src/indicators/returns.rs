//! Percent change over a fixed row lag.
//!
//! r[i] = close[i] / close[i - lag] - 1. Undefined for the first `lag` rows,
//! when either close is undefined, or when the base close is zero.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct PctChange {
    lag: usize,
    name: String,
}

impl PctChange {
    pub fn new(lag: usize, name: impl Into<String>) -> Self {
        assert!(lag >= 1, "percent-change lag must be >= 1");
        Self {
            lag,
            name: name.into(),
        }
    }
}

impl Indicator for PctChange {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.lag
    }

    fn compute(&self, closes: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut result = vec![None; closes.len()];
        for i in self.lag..closes.len() {
            result[i] = match (closes[i], closes[i - self.lag]) {
                (Some(cur), Some(base)) if base != 0.0 => Some(cur / base - 1.0),
                _ => None,
            };
        }
        result
    }
}
