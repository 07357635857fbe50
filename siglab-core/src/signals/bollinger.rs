//! Bollinger breakout: buy when close drops under the lower band, sell when
//! it rises above the upper band.

use crate::domain::{columns, Series};

use super::{gt, lt, SignalStrategy};

/// # Indicator dependencies
/// `boll_low`, `boll_high`, plus the bar close.
#[derive(Debug, Clone, Copy, Default)]
pub struct BollingerBreakout;

impl SignalStrategy for BollingerBreakout {
    fn name(&self) -> &str {
        "bollinger_breakout"
    }

    fn column(&self) -> &'static str {
        columns::SIGNAL_BO
    }

    fn buy_condition(&self, series: &Series, index: usize) -> bool {
        let close = series.bars().get(index).and_then(|b| b.close_value());
        gt(series.value(columns::BOLL_LOW, index), close)
    }

    fn sell_condition(&self, series: &Series, index: usize) -> bool {
        let close = series.bars().get(index).and_then(|b| b.close_value());
        lt(series.value(columns::BOLL_HIGH, index), close)
    }
}
