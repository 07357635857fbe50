//! Relative Strength Index over the second difference of close.
//!
//! delta[i] = (close[i] - close[i-1]) - (close[i-1] - close[i-2]), defined
//! from row 2. Gains and losses of `delta` are averaged with a plain trailing
//! mean (not Wilder smoothing) over `period` rows of the delta sequence.
//!
//! RSI = 100 - 100 / (1 + mean_up / mean_down)
//! Lookback: period + 1 (first value at row 15 for period 14).
//! Edge case: mean_down == 0 → undefined, never 100 or NaN.

use super::sma::rolling_mean;
use super::Indicator;

#[derive(Debug, Clone)]
pub struct DoubleDiffRsi {
    period: usize,
    name: String,
}

impl DoubleDiffRsi {
    pub fn new(period: usize, name: impl Into<String>) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: name.into(),
        }
    }
}

/// First difference; row 0 undefined.
fn diff(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    for i in 1..values.len() {
        out[i] = match (values[i], values[i - 1]) {
            (Some(cur), Some(prev)) => Some(cur - prev),
            _ => None,
        };
    }
    out
}

impl Indicator for DoubleDiffRsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, closes: &[Option<f64>]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];
        if n < 2 {
            return result;
        }

        // Drop the two leading rows that can never carry a second difference,
        // so the trailing window only ever spans real delta rows.
        let delta = diff(&diff(closes)).split_off(2);
        let up: Vec<Option<f64>> = delta.iter().map(|d| d.map(|v| v.max(0.0))).collect();
        let down: Vec<Option<f64>> = delta.iter().map(|d| d.map(|v| v.min(0.0).abs())).collect();

        let mean_up = rolling_mean(&up, self.period);
        let mean_down = rolling_mean(&down, self.period);

        for (j, (gain, loss)) in mean_up.into_iter().zip(mean_down).enumerate() {
            result[j + 2] = match (gain, loss) {
                (Some(gain), Some(loss)) if loss > 0.0 => Some(100.0 - 100.0 / (1.0 + gain / loss)),
                _ => None,
            };
        }

        result
    }
}
