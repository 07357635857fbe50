//! PriceBar: one dated OHLCV observation for a single instrument.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar.
///
/// Missing provider fields are carried as `f64::NAN`; the indicator engine
/// turns a NaN close into an undefined value, never into zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// The close as a defined value, or `None` if the provider left it empty.
    pub fn close_value(&self) -> Option<f64> {
        if self.close.is_finite() {
            Some(self.close)
        } else {
            None
        }
    }

    /// Returns true if any OHLCV field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }
}

/// Returns true if `bars` is strictly ascending by date (which also rules out duplicates).
pub fn is_strictly_ascending(bars: &[PriceBar]) -> bool {
    bars.windows(2).all(|w| w[0].date < w[1].date)
}
