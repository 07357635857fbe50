//! RSI threshold: buy under 30, sell over 70.

use crate::domain::{columns, Series};

use super::{gt, lt, SignalStrategy};

pub const OVERSOLD: f64 = 30.0;
pub const OVERBOUGHT: f64 = 70.0;

/// # Indicator dependencies
/// `rsi`
#[derive(Debug, Clone, Copy, Default)]
pub struct RsiThreshold;

impl SignalStrategy for RsiThreshold {
    fn name(&self) -> &str {
        "rsi_threshold"
    }

    fn column(&self) -> &'static str {
        columns::SIGNAL_RSI
    }

    fn buy_condition(&self, series: &Series, index: usize) -> bool {
        lt(series.value(columns::RSI, index), Some(OVERSOLD))
    }

    fn sell_condition(&self, series: &Series, index: usize) -> bool {
        gt(series.value(columns::RSI, index), Some(OVERBOUGHT))
    }
}
